//! # 上流ゲートウェイクライアント
//!
//! BFF から上流ゲートウェイへの通信を担当する。
//! アカウントサービス（`/accounts/...`）とプロフィールサービス（`/profile/...`）は
//! 同じベース URL の下にぶら下がっている。
//!
//! ## 呼び出しモード
//!
//! - [`UpstreamClient::fetch`]: ステータスを検査し、401 を [`UpstreamError::Unauthorized`] に、
//!   その他の失敗を [`UpstreamError::UpstreamFailure`] に変換してボディをデコードする
//! - [`UpstreamClient::fetch_raw`]: レスポンスを解釈せずに返す。ステータスや `set-cookie` を
//!   ブラウザへそのまま返したいルートが使う

mod error;
mod request;
mod response;

use std::time::Duration;

use async_trait::async_trait;
use http::{
    HeaderValue,
    header::{CONTENT_TYPE, COOKIE},
};
pub use error::UpstreamError;
pub use request::{
    DEFAULT_RESUME_FILE_NAME,
    RESUME_CONTENT_TYPE,
    UploadFile,
    UploadForm,
    UpstreamBody,
    UpstreamRequest,
};
pub use response::{UpstreamPayload, UpstreamResponse};

use crate::middleware::request_id::inject_request_id;

/// 上流ゲートウェイクライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
/// スタブは `fetch_raw` だけを実装すれば、`fetch` は既定実装で
/// 実装と同じ判定ロジックを通る。
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// リクエストを送り、レスポンスを解釈せずに返す
    ///
    /// 通信に失敗した場合のみエラーを返す。
    async fn fetch_raw(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;

    /// リクエストを送り、ステータスを検査してボディをデコードする
    async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamPayload, UpstreamError> {
        self.fetch_raw(request).await?.into_payload()
    }
}

/// 上流ゲートウェイクライアント実装
#[derive(Clone)]
pub struct UpstreamClientImpl {
    base_url: String,
    client:   reqwest::Client,
}

impl UpstreamClientImpl {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: 上流ゲートウェイのベース URL（例: `http://localhost:8080`）
    /// - `timeout`: 1 リクエストあたりのタイムアウト
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client:   reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// ベース URL とパスを連結する
    ///
    /// パスの先頭の `/` はちょうど 1 つになるよう正規化する。
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(&self, request: UpstreamRequest) -> Result<reqwest::RequestBuilder, UpstreamError> {
        let url = self.url_for(&request.path);
        let is_multipart = request.is_multipart();
        let mut builder = self.client.request(request.method, url);

        // multipart の Content-Type は boundary 付きで reqwest が設定する
        if !is_multipart {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        builder = builder.headers(request.headers);

        if let Some(cookie) = request.cookie {
            builder = builder.header(COOKIE, cookie);
        }

        builder = match request.body {
            Some(UpstreamBody::Json(body)) => builder.json(&body),
            Some(UpstreamBody::Multipart(form)) => builder.multipart(form.into_multipart()?),
            None => builder,
        };

        Ok(inject_request_id(builder))
    }
}

#[async_trait]
impl UpstreamClient for UpstreamClientImpl {
    async fn fetch_raw(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self.build(request)?.send().await?;

        tracing::debug!(
            upstream.method = %method,
            upstream.path = %path,
            upstream.status = response.status().as_u16(),
            "上流呼び出しが完了しました"
        );

        UpstreamResponse::read(response).await
    }
}
