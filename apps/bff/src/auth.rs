//! # 認証ヘッダー
//!
//! ブラウザが送ってくる `AuthToken` Cookie からベアラートークンを取り出し、
//! 上流サービスへの `Authorization` ヘッダーを組み立てる。
//!
//! トークンの発行・署名検証は上流サービス側の責務であり、BFF はトークンを
//! 中身を見ずにそのまま転送する。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! pub async fn handler(auth: AuthHeaders) -> Response {
//!     let request = UpstreamRequest::get("/profile/profile/all").with_auth(&auth);
//!     // ...
//! }
//! ```

use std::{borrow::Cow, convert::Infallible};

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        HeaderValue,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

/// 認証トークンを保持する Cookie 名
pub const AUTH_COOKIE_NAME: &str = "AuthToken";

/// Cookie ヘッダー文字列から指定した名前の Cookie 値を取り出す
///
/// - `;` で分割し、各セグメントを trim した上で最初の `=` で key と value に分ける
/// - key は完全一致で比較し、value は URL デコードして返す
/// - value 内の `=` はそのまま保持される
/// - `=` を含まないセグメントや、デコードできない value は読み飛ばす
pub fn cookie_value(cookie_header: Option<&str>, name: &str) -> Option<String> {
    cookie_header?.split(';').find_map(|segment| {
        let (key, value) = segment.trim().split_once('=')?;
        if key != name {
            return None;
        }
        urlencoding::decode(value).ok().map(Cow::into_owned)
    })
}

/// リクエストヘッダーから Cookie ヘッダー全体を 1 つの文字列として取り出す
///
/// HTTP/2 では Cookie ヘッダーが複数行に分かれて届くことがあるため、`; ` で連結する。
fn joined_cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// 上流サービス向けの認証ヘッダー
///
/// 中身は空か `Authorization: Bearer <token>` の 1 エントリのみ。
/// トークンが無い・空・ヘッダー値として表現できない場合は空になり、
/// 壊れたヘッダーを上流に送ることはない。
///
/// リクエストごとに extractor として 1 回だけ計算される。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthHeaders {
    headers: HeaderMap,
}

impl AuthHeaders {
    /// トークンから認証ヘッダーを組み立てる
    pub fn from_token(token: Option<&str>) -> Self {
        let mut headers = HeaderMap::new();
        if let Some(value) = token
            .filter(|t| !t.is_empty())
            .and_then(|t| HeaderValue::from_str(&format!("Bearer {t}")).ok())
        {
            headers.insert(AUTHORIZATION, value);
        }
        Self { headers }
    }

    /// Cookie ヘッダー文字列から認証ヘッダーを組み立てる
    pub fn from_cookie_header(cookie_header: Option<&str>) -> Self {
        Self::from_token(cookie_value(cookie_header, AUTH_COOKIE_NAME).as_deref())
    }

    /// リクエストヘッダーから認証ヘッダーを組み立てる
    pub fn from_request_headers(headers: &HeaderMap) -> Self {
        Self::from_cookie_header(joined_cookie_header(headers).as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// `Authorization` ヘッダーの値（存在する場合）
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }
}

impl<S> FromRequestParts<S> for AuthHeaders
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_request_headers(&parts.headers))
    }
}

/// ブラウザから届いた Cookie ヘッダーそのもの
///
/// セッション Cookie の転送が有効な場合に、上流リクエストへ付与するために使う。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedCookies(pub Option<String>);

impl<S> FromRequestParts<S> for ForwardedCookies
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(joined_cookie_header(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // --- cookie_value ---

    #[rstest]
    #[case::単一cookie("AuthToken=abc", Some("abc"))]
    #[case::複数cookieの途中("theme=dark; AuthToken=abc; lang=ja", Some("abc"))]
    #[case::前後の空白を無視("  AuthToken=abc  ;other=1", Some("abc"))]
    #[case::urlデコードされる("AuthToken=a%20b%2Fc", Some("a b/c"))]
    #[case::value内のイコールを保持("AuthToken=a=b==", Some("a=b=="))]
    #[case::最初に一致したものを返す("AuthToken=first; AuthToken=second", Some("first"))]
    #[case::空のvalue("AuthToken=", Some(""))]
    #[case::該当keyなし("theme=dark; lang=ja", None)]
    #[case::前方一致では一致しない("AuthTokenX=abc", None)]
    #[case::大文字小文字を区別する("authtoken=abc", None)]
    #[case::イコールのないセグメントは読み飛ばす("garbage; AuthToken=abc", Some("abc"))]
    #[case::空文字列("", None)]
    fn test_cookie_valueが指定cookieを取り出す(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            cookie_value(Some(header), AUTH_COOKIE_NAME),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn test_cookie_value_ヘッダーなしでnoneを返す() {
        assert_eq!(cookie_value(None, AUTH_COOKIE_NAME), None);
    }

    #[test]
    fn test_cookie_value_デコード不能なvalueは読み飛ばす() {
        // %FF は UTF-8 として不正
        let header = "AuthToken=%FF; AuthToken=ok";

        assert_eq!(
            cookie_value(Some(header), AUTH_COOKIE_NAME),
            Some("ok".to_string())
        );
    }

    // --- AuthHeaders ---

    #[test]
    fn test_トークンありでbearerヘッダーを持つ() {
        let auth = AuthHeaders::from_cookie_header(Some("AuthToken=jwt.token.value"));

        assert_eq!(auth.authorization(), Some("Bearer jwt.token.value"));
        assert_eq!(auth.header_map().len(), 1);
    }

    #[test]
    fn test_トークンなしで空になる() {
        let auth = AuthHeaders::from_cookie_header(Some("theme=dark"));

        assert!(auth.is_empty());
        assert_eq!(auth.authorization(), None);
    }

    #[test]
    fn test_空トークンで空になる() {
        let auth = AuthHeaders::from_cookie_header(Some("AuthToken="));

        assert!(auth.is_empty());
    }

    #[test]
    fn test_ヘッダー値にできないトークンで空になる() {
        let auth = AuthHeaders::from_token(Some("bad\ntoken"));

        assert!(auth.is_empty());
    }

    #[test]
    fn test_複数行のcookieヘッダーを連結して探す() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("AuthToken=xyz"));

        let auth = AuthHeaders::from_request_headers(&headers);

        assert_eq!(auth.authorization(), Some("Bearer xyz"));
    }

    #[tokio::test]
    async fn test_extractorがリクエストから認証ヘッダーを組み立てる() {
        let request = Request::builder()
            .header(COOKIE, "AuthToken=abc")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let auth = AuthHeaders::from_request_parts(&mut parts, &()).await.unwrap();
        let cookies = ForwardedCookies::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(auth.authorization(), Some("Bearer abc"));
        assert_eq!(cookies, ForwardedCookies(Some("AuthToken=abc".to_string())));
    }
}
