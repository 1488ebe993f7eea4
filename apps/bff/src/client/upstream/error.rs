//! 上流クライアントのエラー型

use http::StatusCode;
use thiserror::Error;

/// 上流呼び出しのエラー
///
/// `Display` の文字列はそのままフロントエンドへの `{"error": ...}` に載ることがあるため、
/// 英語の固定書式にしている。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// 上流が 401 を返した
    #[error("Unauthorized")]
    Unauthorized,

    /// 上流が 401 以外の非 2xx を返した
    #[error("API error {code}: {body}", code = .status.as_u16())]
    UpstreamFailure { status: StatusCode, body: String },

    /// 通信失敗・デコード失敗など
    #[error("{0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Unexpected(err.to_string())
    }
}
