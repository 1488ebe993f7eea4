//! # BFF 設定
//!
//! 環境変数から BFF サーバーの設定を読み込む。

use std::{env, time::Duration};

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
   #[error("{0} が設定されていません")]
   Missing(&'static str),

   #[error("{name} の値が不正です: {value:?}")]
   Invalid { name: &'static str, value: String },
}

/// BFF サーバーの設定
#[derive(Debug, Clone)]
pub struct BffConfig {
   /// バインドアドレス
   pub host: String,
   /// ポート番号
   pub port: u16,
   /// 上流ゲートウェイのベース URL
   pub api_base_url: String,
   /// 認証付きの上流呼び出しにブラウザの Cookie ヘッダーを転送するか
   pub forward_session_cookies: bool,
   /// 上流呼び出しのタイムアウト
   pub upstream_timeout: Duration,
}

impl BffConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|name| env::var(name).ok())
   }

   /// 任意の参照関数から設定を読み込む
   ///
   /// テストではプロセスの環境変数を書き換えずにこちらを使う。
   pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let api_base_url = lookup("API_BASE_URL")
         .filter(|v| !v.trim().is_empty())
         .ok_or(ConfigError::Missing("API_BASE_URL"))?;

      let port = parse_or("BFF_PORT", lookup("BFF_PORT"), 3000)?;
      let timeout_secs = parse_or("UPSTREAM_TIMEOUT_SECS", lookup("UPSTREAM_TIMEOUT_SECS"), 30)?;

      Ok(Self {
         host: lookup("BFF_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
         port,
         api_base_url,
         forward_session_cookies: lookup("FORWARD_SESSION_COOKIES")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
         upstream_timeout: Duration::from_secs(timeout_secs),
      })
   }
}

fn parse_or<T: std::str::FromStr>(
   name: &'static str,
   value: Option<String>,
   default: T,
) -> Result<T, ConfigError> {
   match value {
      None => Ok(default),
      Some(value) => value
         .trim()
         .parse()
         .map_err(|_| ConfigError::Invalid { name, value }),
   }
}
