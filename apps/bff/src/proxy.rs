//! # プロキシ変換
//!
//! ブラウザから届いたボディの解釈と、上流レスポンスからブラウザ向けレスポンスへの変換。
//!
//! ## 応答モード
//!
//! - デコード（[`respond_decoded`]）: 上流の 401 は 401、それ以外の失敗は 500。
//!   成功時は 200 でデコード済みのボディを返す
//! - 生転送（[`respond_raw`]）: 上流のステータスをそのまま返す。
//!   401 のみボディを `{"error":"Unauthorized"}` に置き換える

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use jobcopilot_shared::ErrorResponse;
use serde_json::Value;

use crate::{
    client::{UpstreamError, UpstreamPayload, UpstreamResponse},
    error::{ProxyError, log_upstream_error},
};

/// リクエストボディを JSON として解釈する
///
/// - 空（空白のみを含む）または `null`: ボディなし
/// - JSON 文字列: 中身をもう一度 JSON としてパースする（文字列化済みボディ対策）
/// - パースできない: 400 `Invalid JSON body`
pub fn parse_json_body(body: &Bytes) -> Result<Option<Value>, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| invalid_json())?;
    match value {
        Value::Null => Ok(None),
        Value::String(inner) => {
            let inner: Value = serde_json::from_str(&inner).map_err(|_| invalid_json())?;
            Ok((!inner.is_null()).then_some(inner))
        }
        other => Ok(Some(other)),
    }
}

fn invalid_json() -> ProxyError {
    ProxyError::Validation("Invalid JSON body".to_string())
}

/// 必須のパスパラメータを取り出す
///
/// 欠落または空文字列の場合は 400 `<name> is required`。
pub fn required_path_param<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ProxyError> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ProxyError::Validation(ErrorResponse::required(name).error))
}

/// デコード済みの上流結果をレスポンスに変換する
pub fn respond_decoded(context: &str, result: Result<UpstreamPayload, UpstreamError>) -> Response {
    match result {
        Ok(UpstreamPayload::Json(value)) => (StatusCode::OK, Json(value)).into_response(),
        Ok(UpstreamPayload::Text(text)) => (StatusCode::OK, Json(Value::String(text))).into_response(),
        Err(err) => log_upstream_error(context, err).into_response(),
    }
}

/// 上流の生レスポンスをステータスごと転送する
///
/// - 401: `{"error":"Unauthorized"}`
/// - その他の非 2xx: JSON ならそのまま、そうでなければ `{"error": <本文>}`
/// - 2xx: JSON ならそのまま、テキストは本文と Content-Type をそのまま、空ならボディなし
///
/// `forward_set_cookie` が真の場合、上流の `set-cookie` をすべて付け直す。
pub fn respond_raw(context: &str, upstream: UpstreamResponse, forward_set_cookie: bool) -> Response {
    let mut response = raw_body_response(context, &upstream);

    if forward_set_cookie {
        let headers = response.headers_mut();
        for cookie in upstream.set_cookies() {
            headers.append(header::SET_COOKIE, cookie.clone());
        }
    }

    response
}

fn raw_body_response(context: &str, upstream: &UpstreamResponse) -> Response {
    let status = upstream.status;

    if status == StatusCode::UNAUTHORIZED {
        return ProxyError::Unauthorized.into_response();
    }

    if !status.is_success() {
        let body = upstream
            .is_json()
            .then(|| serde_json::from_slice::<Value>(&upstream.body).ok())
            .flatten()
            .unwrap_or_else(|| serde_json::json!({ "error": upstream.text_body() }));
        tracing::debug!(
            upstream.status = status.as_u16(),
            "{}で上流のエラーを転送します",
            context
        );
        return ProxyError::Upstream { status, body }.into_response();
    }

    if upstream.body.is_empty() {
        return status.into_response();
    }

    if upstream.is_json() {
        return match serde_json::from_slice::<Value>(&upstream.body) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => log_upstream_error(
                context,
                UpstreamError::Unexpected(format!("invalid JSON from upstream: {e}")),
            )
            .into_response(),
        };
    }

    let content_type = upstream
        .headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
    (
        status,
        [(header::CONTENT_TYPE, content_type)],
        upstream.body.clone(),
    )
        .into_response()
}
