//! # 認証ハンドラ
//!
//! ログインとユーザー登録をアカウントサービスへ転送する。
//! どちらも未認証で呼ばれるため認証ヘッダーは付けない。
//!
//! ## エンドポイント
//!
//! - `POST /api/login` → `POST /accounts/auth/login`
//! - `POST /api/register` → `POST /accounts/auth/register`

use std::sync::Arc;

use axum::{
   body::Bytes,
   extract::{State, rejection::BytesRejection},
   response::Response,
};

use crate::{
   client::{UpstreamClient, UpstreamRequest},
   error::{ProxyError, log_upstream_error},
   proxy::{parse_json_body, respond_raw},
};

const LOGIN_PATH: &str = "/accounts/auth/login";
const REGISTER_PATH: &str = "/accounts/auth/register";

/// 認証ハンドラの State
pub struct AuthState {
   pub upstream: Arc<dyn UpstreamClient>,
}

/// POST /api/login
///
/// 上流のステータスとボディをそのまま返し、発行された `set-cookie` をすべて転送する。
/// 認証失敗（上流 401）は `{"error":"Unauthorized"}` になる。
#[tracing::instrument(skip_all)]
pub async fn login(
   State(state): State<Arc<AuthState>>,
   body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
   let body = parse_json_body(&body?)?;

   let upstream = state
      .upstream
      .fetch_raw(UpstreamRequest::post(LOGIN_PATH).with_json(body))
      .await
      .map_err(|e| log_upstream_error("ログイン", e))?;

   Ok(respond_raw("ログイン", upstream, true))
}

/// POST /api/register
///
/// 上流が空ボディで応答した場合はステータスのみを返す。
#[tracing::instrument(skip_all)]
pub async fn register(
   State(state): State<Arc<AuthState>>,
   body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
   let body = parse_json_body(&body?)?;

   let upstream = state
      .upstream
      .fetch_raw(UpstreamRequest::post(REGISTER_PATH).with_json(body))
      .await
      .map_err(|e| log_upstream_error("ユーザー登録", e))?;

   Ok(respond_raw("ユーザー登録", upstream, false))
}
