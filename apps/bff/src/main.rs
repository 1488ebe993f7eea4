//! # BFF (Backend for Frontend) サーバー
//!
//! Job Copilot のフロントエンド専用 API サーバー。
//!
//! ## 役割
//!
//! ブラウザと上流ゲートウェイの間に立ち、以下を担う:
//!
//! - `AuthToken` Cookie をベアラートークンとして上流へ転送する
//! - 上流のステータスを `{"error": "..."}` 形式のレスポンスに変換する
//! - ログイン時に上流が発行した `set-cookie` をブラウザへ返す
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌─────────────────────────┐
//! │   Browser    │────▶│     BFF      │────▶│ Gateway                 │
//! │              │     │  port: 3000  │     │  /accounts/* /profile/* │
//! └──────────────┘     └──────────────┘     └─────────────────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `API_BASE_URL` | **Yes** | 上流ゲートウェイのベース URL |
//! | `BFF_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `BFF_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `FORWARD_SESSION_COOKIES` | No | 認証付き呼び出しで Cookie を転送する（`true` で有効） |
//! | `UPSTREAM_TIMEOUT_SECS` | No | 上流呼び出しのタイムアウト秒数（デフォルト: `30`） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! API_BASE_URL=http://localhost:8080 cargo run -p jobcopilot-bff
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use jobcopilot_bff::{
    app::build_app,
    client::{UpstreamClient, UpstreamClientImpl},
    config::BffConfig,
};
use jobcopilot_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("bff"));
    let _tracing_guard = tracing::info_span!("app", service = "bff").entered();

    let config = BffConfig::from_env().context("設定の読み込みに失敗しました")?;

    let upstream: Arc<dyn UpstreamClient> = Arc::new(
        UpstreamClientImpl::new(&config.api_base_url, config.upstream_timeout)
            .context("上流クライアントの初期化に失敗しました")?,
    );
    tracing::info!(api_base_url = %config.api_base_url, "上流ゲートウェイを設定しました");

    let app = build_app(&config, upstream);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("BFF サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
