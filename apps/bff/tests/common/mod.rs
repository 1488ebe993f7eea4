//! テスト共通フィクスチャ
//!
//! 上流ゲートウェイのスタブと、ルーターを 1 リクエスト分だけ動かすヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::{
   sync::{Arc, Mutex},
   time::Duration,
};

use async_trait::async_trait;
use axum::{
   Router,
   body::{Body, Bytes, to_bytes},
   http::{HeaderMap, Request, StatusCode},
};
use jobcopilot_bff::{
   app::build_app,
   client::{UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse},
   config::BffConfig,
   middleware::request_id::current_request_id,
};
use serde_json::Value;
use tower::ServiceExt;

/// スタブが受け取った上流リクエスト
#[derive(Debug, Clone)]
pub struct RecordedCall {
   pub request:    UpstreamRequest,
   /// 呼び出し時点の task-local Request ID
   pub request_id: Option<String>,
}

/// 固定のレスポンスを返し、受け取ったリクエストを記録するスタブ
pub struct StubUpstream {
   response: Result<UpstreamResponse, UpstreamError>,
   calls:    Mutex<Vec<RecordedCall>>,
}

impl StubUpstream {
   pub fn responding(response: UpstreamResponse) -> Arc<Self> {
      Arc::new(Self {
         response: Ok(response),
         calls:    Mutex::new(Vec::new()),
      })
   }

   pub fn failing(err: UpstreamError) -> Arc<Self> {
      Arc::new(Self {
         response: Err(err),
         calls:    Mutex::new(Vec::new()),
      })
   }

   pub fn calls(&self) -> Vec<RecordedCall> {
      self.calls.lock().unwrap().clone()
   }

   /// 呼び出しがちょうど 1 回であることを確認してそのリクエストを返す
   pub fn single_call(&self) -> RecordedCall {
      let calls = self.calls();
      assert_eq!(calls.len(), 1, "上流呼び出しは 1 回であること: {calls:?}");
      calls.into_iter().next().unwrap()
   }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
   async fn fetch_raw(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
      self.calls.lock().unwrap().push(RecordedCall {
         request,
         request_id: current_request_id(),
      });
      self.response.clone()
   }
}

pub fn test_config(forward_session_cookies: bool) -> BffConfig {
   BffConfig {
      host: "127.0.0.1".to_string(),
      port: 0,
      api_base_url: "http://gateway.test".to_string(),
      forward_session_cookies,
      upstream_timeout: Duration::from_secs(5),
   }
}

pub fn app_with(stub: Arc<StubUpstream>) -> Router {
   build_app(&test_config(false), stub)
}

/// ルーターのレスポンスを分解したもの
pub struct TestResponse {
   pub status:  StatusCode,
   pub headers: HeaderMap,
   pub body:    Bytes,
}

impl TestResponse {
   pub fn json(&self) -> Value {
      serde_json::from_slice(&self.body)
         .unwrap_or_else(|e| panic!("JSON であること: {e}: {:?}", self.body))
   }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
   let response = app.oneshot(request).await.unwrap();
   let status = response.status();
   let headers = response.headers().clone();
   let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
   TestResponse {
      status,
      headers,
      body,
   }
}
