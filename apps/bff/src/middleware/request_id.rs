//! # Request ID 伝播
//!
//! ブラウザからのリクエストに付与した Request ID を、上流ゲートウェイへの
//! 呼び出しにも `x-request-id` として引き継ぐ。
//!
//! 1. [`store_request_id`] が `SetRequestIdLayer` の設定した
//!    [`RequestId`](tower_http::request_id::RequestId) を task-local に保存する
//! 2. [`inject_request_id`] が上流クライアントの `RequestBuilder` にヘッダーを付与する

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use jobcopilot_shared::observability::REQUEST_ID_HEADER;
use tower_http::request_id::RequestId;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 処理中のリクエストの Request ID
///
/// task-local のスコープ外では `None`。
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

/// Request ID を task-local に保存するミドルウェア
///
/// extensions に `RequestId` が無い場合は `-` を保存する。
pub async fn store_request_id(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string();

    REQUEST_ID.scope(request_id, next.run(request)).await
}

/// 上流リクエストに `x-request-id` を付与する
pub fn inject_request_id(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match current_request_id() {
        Some(id) => builder.header(REQUEST_ID_HEADER, id),
        None => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_スコープ外ではrequest_idがない() {
        assert_eq!(current_request_id(), None);
    }

    #[tokio::test]
    async fn test_スコープ内では上流リクエストにrequest_idが付く() {
        let client = reqwest::Client::new();

        let request = REQUEST_ID
            .scope("0192f0a0-req".to_string(), async {
                inject_request_id(client.get("http://gateway.local/healthz"))
                    .build()
                    .unwrap()
            })
            .await;

        assert_eq!(request.headers()[REQUEST_ID_HEADER], "0192f0a0-req");
    }

    #[tokio::test]
    async fn test_スコープ外では上流リクエストを変更しない() {
        let client = reqwest::Client::new();

        let request = inject_request_id(client.get("http://gateway.local/healthz"))
            .build()
            .unwrap();

        assert!(request.headers().get(REQUEST_ID_HEADER).is_none());
    }
}
