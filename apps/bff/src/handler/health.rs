//! # ヘルスチェックハンドラ
//!
//! BFF の稼働状態を確認するためのエンドポイント。
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（上流ゲートウェイの `/healthz` を確認）
//!
//! レスポンス型は [`jobcopilot_shared::HealthResponse`] / [`jobcopilot_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jobcopilot_shared::{CheckStatus, HealthResponse, ReadinessResponse};

use crate::client::{UpstreamClient, UpstreamRequest};

const GATEWAY_HEALTH_PATH: &str = "/healthz";
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// BFF のヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub upstream: Arc<dyn UpstreamClient>,
}

/// BFF の Readiness Check エンドポイント
///
/// 上流ゲートウェイが 2xx を返せば 200、それ以外は 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let gateway = check_gateway(state.upstream.as_ref()).await;

    let response = ReadinessResponse::from_checks(HashMap::from([(
        "gateway".to_string(),
        gateway,
    )]));
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

/// 上流ゲートウェイの `/healthz` を呼ぶ（タイムアウト: 5 秒）
async fn check_gateway(upstream: &dyn UpstreamClient) -> CheckStatus {
    match tokio::time::timeout(
        CHECK_TIMEOUT,
        upstream.fetch(UpstreamRequest::get(GATEWAY_HEALTH_PATH)),
    )
    .await
    {
        Ok(Ok(_)) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: gateway health check failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: gateway check timed out");
            CheckStatus::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{Router, body::Body, http::Request, routing::get};
    use jobcopilot_shared::ReadinessStatus;
    use tower::ServiceExt;

    use super::*;
    use crate::client::{UpstreamError, UpstreamResponse};

    struct StubGateway {
        response: Result<UpstreamResponse, UpstreamError>,
    }

    #[async_trait]
    impl UpstreamClient for StubGateway {
        async fn fetch_raw(
            &self,
            request: UpstreamRequest,
        ) -> Result<UpstreamResponse, UpstreamError> {
            assert_eq!(request.path, GATEWAY_HEALTH_PATH);
            self.response.clone()
        }
    }

    async fn ready(response: Result<UpstreamResponse, UpstreamError>) -> (StatusCode, ReadinessResponse) {
        let state = Arc::new(ReadinessState {
            upstream: Arc::new(StubGateway { response }),
        });
        let app = Router::new()
            .route("/health/ready", get(readiness_check))
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_checkがhealthyを返す() {
        let Json(body) = health_check().await;

        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_ゲートウェイ正常で200とreadyを返す() {
        let (status, body) = ready(Ok(UpstreamResponse::text(StatusCode::OK, "ok"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, ReadinessStatus::Ready);
        assert_eq!(body.checks["gateway"], CheckStatus::Ok);
    }

    #[tokio::test]
    async fn test_ゲートウェイ異常で503とnot_readyを返す() {
        let (status, body) =
            ready(Ok(UpstreamResponse::text(StatusCode::BAD_GATEWAY, "down"))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, ReadinessStatus::NotReady);
        assert_eq!(body.checks["gateway"], CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_ゲートウェイに接続できないとき503を返す() {
        let (status, _) = ready(Err(UpstreamError::Unexpected("connection refused".to_string()))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
