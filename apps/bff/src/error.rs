//! # BFF エラーハンドリング
//!
//! ルートハンドラ境界のエラー型と、axum レスポンスへの変換。
//!
//! ボディは常に `{"error": "..."}` 形式（[`ErrorResponse`]）。
//! 上流が JSON でエラーを返した場合は [`ProxyError::Upstream`] でそのまま転送する。

use axum::{
    Json,
    extract::rejection::{BytesRejection, PathRejection},
    http::{HeaderValue, Method, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use jobcopilot_shared::ErrorResponse;
use serde_json::Value;

use crate::client::UpstreamError;

/// ルートハンドラのエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    /// ルートが受け付けないメソッド
    #[error("method not allowed (allowed: {allowed})")]
    MethodNotAllowed { allowed: Method },

    /// 入力不備（パスパラメータ欠落、不正な JSON、フォーム項目欠落）
    #[error("{0}")]
    Validation(String),

    /// axum の extractor が拒否した（不正なパスパラメータ、ボディサイズ超過など）
    ///
    /// ステータスは extractor のものを保ち、ボディだけ `{"error": ...}` 形式に揃える。
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// 上流が 401 を返した
    #[error("unauthorized")]
    Unauthorized,

    /// 上流の非 2xx レスポンスをステータスとボディごと転送する
    #[error("upstream responded with {status}")]
    Upstream { status: StatusCode, body: Value },

    /// 上流との通信失敗、想定外のレスポンス
    #[error("{0}")]
    Unexpected(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Rejected { status, .. } => *status,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ProxyError::MethodNotAllowed { allowed } => {
                let allow = HeaderValue::from_str(allowed.as_str())
                    .unwrap_or_else(|_| HeaderValue::from_static(""));
                (
                    status,
                    [(ALLOW, allow)],
                    Json(ErrorResponse::method_not_allowed()),
                )
                    .into_response()
            }
            ProxyError::Validation(message) => {
                (status, Json(ErrorResponse::new(message))).into_response()
            }
            ProxyError::Rejected { message, .. } => {
                (status, Json(ErrorResponse::new(message))).into_response()
            }
            ProxyError::Unauthorized => (status, Json(ErrorResponse::unauthorized())).into_response(),
            ProxyError::Upstream { body, .. } => (status, Json(body)).into_response(),
            ProxyError::Unexpected(message) if message.is_empty() => {
                (status, Json(ErrorResponse::unexpected())).into_response()
            }
            ProxyError::Unexpected(message) => {
                (status, Json(ErrorResponse::new(message))).into_response()
            }
        }
    }
}

impl From<PathRejection> for ProxyError {
    fn from(rejection: PathRejection) -> Self {
        ProxyError::Rejected {
            status:  rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<BytesRejection> for ProxyError {
    fn from(rejection: BytesRejection) -> Self {
        ProxyError::Rejected {
            status:  rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unauthorized => ProxyError::Unauthorized,
            // デコードする呼び出しでは上流のステータスを保持せず 500 にまとめる
            failure @ UpstreamError::UpstreamFailure { .. } => {
                ProxyError::Unexpected(failure.to_string())
            }
            UpstreamError::Unexpected(message) => ProxyError::Unexpected(message),
        }
    }
}

/// 上流エラーをログ付きで [`ProxyError`] に変換する
///
/// 401 は想定内の結果なのでログを出さない。
pub fn log_upstream_error(context: &str, err: UpstreamError) -> ProxyError {
    match &err {
        UpstreamError::Unauthorized => {}
        UpstreamError::UpstreamFailure { status, .. } => {
            tracing::error!(
                error.category = "external_service",
                error.kind = "upstream_status",
                upstream.status = status.as_u16(),
                "{}で上流がエラーを返しました: {}",
                context,
                err
            );
        }
        UpstreamError::Unexpected(_) => {
            tracing::error!(
                error.category = "external_service",
                error.kind = "service_communication",
                "{}で内部エラー: {}",
                context,
                err
            );
        }
    }
    err.into()
}
