//! # メソッド制限ミドルウェア
//!
//! 各プロキシルートは 1 つのメソッドだけを受け付ける。
//! それ以外のメソッドは上流を呼ばずに 405 と `Allow` ヘッダーを返す。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! Router::new().route("/api/login", only(Method::POST, auth::login))
//! ```

use axum::{
    body::Body,
    extract::State,
    handler::Handler,
    http::{Method, Request},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{MethodRouter, any},
};

use crate::error::ProxyError;

/// メソッド制限ミドルウェアの状態
#[derive(Debug, Clone)]
pub struct MethodGuard {
    pub allowed: Method,
}

impl MethodGuard {
    pub fn new(allowed: Method) -> Self {
        Self { allowed }
    }
}

/// 許可されたメソッド以外を 405 で拒否する
///
/// ボディの抽出より前に判定するため、拒否時はボディを読まない。
pub async fn require_method(
    State(guard): State<MethodGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != guard.allowed {
        tracing::debug!(
            method = %request.method(),
            allowed = %guard.allowed,
            "許可されていないメソッドを拒否しました"
        );
        return ProxyError::MethodNotAllowed {
            allowed: guard.allowed,
        }
        .into_response();
    }

    next.run(request).await
}

/// `method` のみを受け付けるルートを作る
///
/// axum 標準の 405（ボディなし）ではなく、JSON ボディ付きの 405 を返すために
/// 全メソッドで受けてからミドルウェアで判定する。
pub fn only<H, T, S>(method: Method, handler: H) -> MethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    any(handler).layer(from_fn_with_state(MethodGuard::new(method), require_method))
}
