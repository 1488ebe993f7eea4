//! # 外部 API クライアント
//!
//! 上流ゲートウェイ（アカウントサービス、プロフィールサービス）との通信を担当する。

pub mod upstream;

pub use upstream::{
    UploadFile,
    UploadForm,
    UpstreamBody,
    UpstreamClient,
    UpstreamClientImpl,
    UpstreamError,
    UpstreamPayload,
    UpstreamRequest,
    UpstreamResponse,
};
