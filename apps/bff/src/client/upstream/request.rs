//! 上流リクエストの組み立て

use bytes::Bytes;
use http::{HeaderMap, Method};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::auth::AuthHeaders;

/// アップロードファイルの既定ファイル名
pub const DEFAULT_RESUME_FILE_NAME: &str = "resume.pdf";

/// アップロードファイルとして転送する際の Content-Type
pub const RESUME_CONTENT_TYPE: &str = "application/pdf";

/// 上流へ送るリクエストボディ
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// JSON にシリアライズして送る
    Json(Value),
    /// `multipart/form-data` で送る（履歴書アップロード）
    Multipart(UploadForm),
}

/// アップロードされた履歴書ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// ブラウザが送ってきた元のファイル名
    pub file_name: Option<String>,
    pub bytes:     Bytes,
}

/// 履歴書アップロードのフォーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub display_name: String,
    pub source_type:  String,
    pub resume:       UploadFile,
}

impl UploadForm {
    /// reqwest の multipart フォームに詰め直す
    ///
    /// ファイルパートは常に `application/pdf` とし、ファイル名が無い場合は
    /// [`DEFAULT_RESUME_FILE_NAME`] を使う。
    pub(super) fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let file_name = self
            .resume
            .file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_RESUME_FILE_NAME.to_string());

        let resume = Part::bytes(self.resume.bytes.to_vec())
            .file_name(file_name)
            .mime_str(RESUME_CONTENT_TYPE)?;

        Ok(Form::new()
            .text("displayName", self.display_name)
            .text("sourceType", self.source_type)
            .part("resume", resume))
    }
}

/// 上流リクエスト
///
/// `path` はベース URL からの相対パス。先頭の `/` の有無は問わない。
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method:  Method,
    pub path:    String,
    /// 呼び出し側が追加するヘッダー（`Content-Type: application/json` より優先される）
    pub headers: HeaderMap,
    pub body:    Option<UpstreamBody>,
    /// セッション Cookie の転送が有効な場合にそのまま付与する Cookie ヘッダー
    pub cookie:  Option<String>,
}

impl UpstreamRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            cookie: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// 認証ヘッダーを追加する
    pub fn with_auth(mut self, auth: &AuthHeaders) -> Self {
        self.headers.extend(auth.header_map().clone());
        self
    }

    /// JSON ボディを設定する（`None` の場合はボディなし）
    pub fn with_json(mut self, body: Option<Value>) -> Self {
        self.body = body.map(UpstreamBody::Json);
        self
    }

    pub fn with_multipart(mut self, form: UploadForm) -> Self {
        self.body = Some(UpstreamBody::Multipart(form));
        self
    }

    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }

    /// multipart ボディを持つか
    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Some(UpstreamBody::Multipart(_)))
    }
}
