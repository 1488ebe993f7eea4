//! 上流レスポンスの保持とデコード

use bytes::Bytes;
use http::{
    HeaderMap,
    HeaderValue,
    StatusCode,
    header::{CONTENT_TYPE, SET_COOKIE},
};
use serde_json::Value;

use super::error::UpstreamError;

/// デコード済みの上流レスポンス
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    /// Content-Type が `application/json` のとき
    Json(Value),
    /// それ以外（`/healthz` のようなプレーンテキスト等）
    Text(String),
}

/// 上流の生レスポンス
///
/// ステータス・ヘッダー・ボディを解釈せずにそのまま保持する。
/// ステータスの分岐や `set-cookie` の転送は呼び出し側の責務。
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status:  StatusCode,
    pub headers: HeaderMap,
    pub body:    Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// JSON ボディのレスポンスを作る
    pub fn json(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(status, headers, body.to_string())
    }

    /// プレーンテキストのレスポンスを作る
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self::new(status, headers, body.into())
    }

    /// reqwest のレスポンスからボディを読み切って作る
    pub(super) async fn read(response: reqwest::Response) -> Result<Self, UpstreamError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self::new(status, headers, body))
    }

    /// Content-Type ヘッダー（無い場合は空文字列）
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Content-Type が `application/json` を含むか
    pub fn is_json(&self) -> bool {
        self.content_type().contains("application/json")
    }

    /// ボディを文字列として読む（不正な UTF-8 は置換する）
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `set-cookie` ヘッダーをすべて返す
    pub fn set_cookies(&self) -> impl Iterator<Item = &HeaderValue> {
        self.headers.get_all(SET_COOKIE).iter()
    }

    /// ステータスを検査し、ボディをデコードする
    ///
    /// - 401: [`UpstreamError::Unauthorized`]
    /// - その他の非 2xx: [`UpstreamError::UpstreamFailure`]（ステータスとボディ文字列）
    /// - 2xx かつ JSON: [`UpstreamPayload::Json`]
    /// - 2xx かつ JSON 以外: [`UpstreamPayload::Text`]
    pub fn into_payload(self) -> Result<UpstreamPayload, UpstreamError> {
        if !self.status.is_success() {
            if self.status == StatusCode::UNAUTHORIZED {
                return Err(UpstreamError::Unauthorized);
            }
            return Err(UpstreamError::UpstreamFailure {
                status: self.status,
                body:   self.text_body(),
            });
        }

        if self.is_json() {
            return serde_json::from_slice(&self.body)
                .map(UpstreamPayload::Json)
                .map_err(|e| UpstreamError::Unexpected(format!("invalid JSON from upstream: {e}")));
        }

        Ok(UpstreamPayload::Text(self.text_body()))
    }
}
