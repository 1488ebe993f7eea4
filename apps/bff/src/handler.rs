//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置し、親モジュールで re-export する
//! - ハンドラは薄く保ち、上流呼び出しと応答変換は `client` / `proxy` に委譲する
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `auth`: ログイン、ユーザー登録
//! - `profile`: プロフィールの取得・一覧・作成・履歴書アップロード

pub mod auth;
pub mod health;
pub mod profile;

pub use auth::{AuthState, login, register};
pub use health::{ReadinessState, health_check, readiness_check};
pub use profile::{
   ProfileState,
   create_profile,
   get_profile,
   list_profiles,
   missing_profile_id,
   upload_profile,
};
