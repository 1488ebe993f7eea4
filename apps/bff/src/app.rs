//! # BFF アプリケーション構築
//!
//! State の組み立てとルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware::from_fn,
    routing::get,
};
use jobcopilot_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::UpstreamClient,
    config::BffConfig,
    handler::{
        AuthState,
        ProfileState,
        ReadinessState,
        create_profile,
        get_profile,
        health_check,
        list_profiles,
        login,
        missing_profile_id,
        readiness_check,
        register,
        upload_profile,
    },
    middleware::{no_cache, only, request_id::store_request_id},
};

/// 履歴書アップロードで受け付けるボディの上限
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// ルーターを構築する
///
/// 上流クライアントは呼び出し側で生成して渡す（テストではスタブを渡す）。
pub fn build_app(config: &BffConfig, upstream: Arc<dyn UpstreamClient>) -> Router {
    let readiness_state = Arc::new(ReadinessState {
        upstream: upstream.clone(),
    });
    let auth_state = Arc::new(AuthState {
        upstream: upstream.clone(),
    });
    let profile_state = Arc::new(ProfileState {
        upstream,
        forward_session_cookies: config.forward_session_cookies,
    });

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        // 認証 API（未認証で呼ばれる）
        .route("/api/login", only(Method::POST, login))
        .route("/api/register", only(Method::POST, register))
        .with_state(auth_state)
        // プロフィール API
        // 静的セグメント（all / new / upload）は `{profileId}` より優先される
        .route("/api/profile/all", only(Method::GET, list_profiles))
        .route("/api/profile/new", only(Method::POST, create_profile))
        .route(
            "/api/profile/upload",
            only(Method::POST, upload_profile).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/profile/", only(Method::GET, missing_profile_id))
        .route("/api/profile/{profileId}", only(Method::GET, get_profile))
        .with_state(profile_state)
        // キャッシュ制御: プロキシしたレスポンスがブラウザにキャッシュされないようにする
        .layer(from_fn(no_cache))
        // Request ID レイヤー（下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含める
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. store_request_id: task-local に保存し、上流呼び出しのヘッダーに使う
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
