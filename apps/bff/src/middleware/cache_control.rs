//! # キャッシュ制御ミドルウェア
//!
//! プロキシしたレスポンスにはユーザー固有のデータが含まれるため、
//! ブラウザや中間キャッシュに保存されないよう `Cache-Control: no-store` を付与する。

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// 全レスポンスに `Cache-Control: no-store` を付与する
///
/// 上流が `Cache-Control` を返していても上書きする。
pub async fn no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
