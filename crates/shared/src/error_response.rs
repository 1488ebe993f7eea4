//! # エラーレスポンス
//!
//! フロントエンドに返すエラーボディ `{"error": "..."}` を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - エラーの種類は HTTP ステータスコードが表す。ボディはメッセージだけを持つ
//! - 定型メッセージは便利コンストラクタで提供し、文字列のハードコードを排除

use serde::{Deserialize, Serialize};

/// 405 応答のメッセージ
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// 401 応答のメッセージ
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// 500 応答でメッセージが取り出せなかったときのメッセージ
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error";

/// アップロードフォームの必須項目欠落時のメッセージ
pub const MISSING_REQUIRED_FIELDS_MESSAGE: &str = "Missing required fields.";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub error: String,
}

impl ErrorResponse {
   /// 任意のメッセージでエラーレスポンスを作成する
   pub fn new(error: impl Into<String>) -> Self {
      Self {
         error: error.into(),
      }
   }

   /// 405 Method Not Allowed
   pub fn method_not_allowed() -> Self {
      Self::new(METHOD_NOT_ALLOWED_MESSAGE)
   }

   /// 400 必須パラメータ欠落
   ///
   /// `"<name> is required"` 形式のメッセージを返す。
   pub fn required(name: &str) -> Self {
      Self::new(format!("{name} is required"))
   }

   /// 400 アップロードフォームの必須項目欠落
   pub fn missing_required_fields() -> Self {
      Self::new(MISSING_REQUIRED_FIELDS_MESSAGE)
   }

   /// 401 Unauthorized
   pub fn unauthorized() -> Self {
      Self::new(UNAUTHORIZED_MESSAGE)
   }

   /// 500 Internal Server Error（メッセージなし）
   pub fn unexpected() -> Self {
      Self::new(UNEXPECTED_ERROR_MESSAGE)
   }
}
