//! # BFF (Backend for Frontend) ライブラリ
//!
//! ブラウザと上流ゲートウェイ（アカウント / プロフィールサービス）の間に立つ
//! 薄いプロキシ層のコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app`: ルーター構築（ルート定義とレイヤー構成）
//! - `auth`: `AuthToken` Cookie からの認証ヘッダー生成
//! - `client`: 上流ゲートウェイへの HTTP クライアント
//! - `config`: 環境変数からの設定読み込み
//! - `error`: ルート境界のエラー型とレスポンス変換
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（メソッド制限、キャッシュ制御、Request ID）
//! - `proxy`: リクエストボディの解釈と上流レスポンスの変換

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod proxy;
