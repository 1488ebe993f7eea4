//! # プロフィールハンドラ
//!
//! プロフィールサービスへの認証付きプロキシ。
//! 全エンドポイントで `AuthToken` Cookie から組み立てた認証ヘッダーを付与する。
//!
//! ## エンドポイント
//!
//! | BFF | 上流 | 応答モード |
//! |-----|------|-----------|
//! | `GET /api/profile/{profileId}` | `GET /profile/profile/{profileId}` | デコード |
//! | `GET /api/profile/all` | `GET /profile/profile/all` | デコード |
//! | `POST /api/profile/new` | `POST /profile/profile` | 生転送 |
//! | `POST /api/profile/upload` | `POST /profile/profile/upload` | 生転送 |

use std::{collections::HashMap, sync::Arc};

use axum::{
   body::Bytes,
   extract::{
      Multipart,
      Path,
      State,
      multipart::{Field, MultipartError, MultipartRejection},
      rejection::{BytesRejection, PathRejection},
   },
   response::Response,
};
use jobcopilot_shared::ErrorResponse;

use crate::{
   auth::{AuthHeaders, ForwardedCookies},
   client::{UploadFile, UploadForm, UpstreamClient, UpstreamRequest},
   error::{ProxyError, log_upstream_error},
   proxy::{parse_json_body, required_path_param, respond_decoded, respond_raw},
};

const PROFILE_ID_PARAM: &str = "profileId";

/// プロフィールハンドラの State
pub struct ProfileState {
   pub upstream:                Arc<dyn UpstreamClient>,
   pub forward_session_cookies: bool,
}

impl ProfileState {
   /// 認証ヘッダーと（設定が有効なら）Cookie を付与する
   fn authorize(
      &self,
      request: UpstreamRequest,
      auth: &AuthHeaders,
      cookies: ForwardedCookies,
   ) -> UpstreamRequest {
      let request = request.with_auth(auth);
      if self.forward_session_cookies {
         request.with_cookie(cookies.0)
      } else {
         request
      }
   }
}

/// GET /api/profile/{profileId}
#[tracing::instrument(skip_all)]
pub async fn get_profile(
   State(state): State<Arc<ProfileState>>,
   params: Result<Path<HashMap<String, String>>, PathRejection>,
   auth: AuthHeaders,
   cookies: ForwardedCookies,
) -> Result<Response, ProxyError> {
   let Path(params) = params?;
   let profile_id = required_path_param(&params, PROFILE_ID_PARAM)?;
   let path = format!("/profile/profile/{}", urlencoding::encode(profile_id));

   let request = state.authorize(UpstreamRequest::get(path), &auth, cookies);
   let result = state.upstream.fetch(request).await;

   Ok(respond_decoded("プロフィール取得", result))
}

/// GET /api/profile/
///
/// `profileId` が空のパスで呼ばれた場合。上流は呼ばない。
pub async fn missing_profile_id() -> ProxyError {
   ProxyError::Validation(ErrorResponse::required(PROFILE_ID_PARAM).error)
}

/// GET /api/profile/all
///
/// 上流の `{profiles, totalProfiles}` をそのまま返す。
#[tracing::instrument(skip_all)]
pub async fn list_profiles(
   State(state): State<Arc<ProfileState>>,
   auth: AuthHeaders,
   cookies: ForwardedCookies,
) -> Response {
   let request = state.authorize(UpstreamRequest::get("/profile/profile/all"), &auth, cookies);
   let result = state.upstream.fetch(request).await;

   respond_decoded("プロフィール一覧取得", result)
}

/// POST /api/profile/new
///
/// ボディ（`displayName`, `pastedCV`, `fileId`, `sourceType`）は検証せずに転送する。
#[tracing::instrument(skip_all)]
pub async fn create_profile(
   State(state): State<Arc<ProfileState>>,
   auth: AuthHeaders,
   cookies: ForwardedCookies,
   body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
   let body = parse_json_body(&body?)?;

   let request = state.authorize(
      UpstreamRequest::post("/profile/profile").with_json(body),
      &auth,
      cookies,
   );
   let upstream = state
      .upstream
      .fetch_raw(request)
      .await
      .map_err(|e| log_upstream_error("プロフィール作成", e))?;

   Ok(respond_raw("プロフィール作成", upstream, false))
}

/// POST /api/profile/upload
///
/// `multipart/form-data` の `displayName` / `sourceType` / `resume` を受け取り、
/// 履歴書ファイルを `application/pdf` として詰め直して転送する。
/// いずれかが欠けている場合（multipart 以外のボディを含む）は上流を呼ばずに 400 を返す。
/// multipart として壊れているボディは 500。
#[tracing::instrument(skip_all)]
pub async fn upload_profile(
   State(state): State<Arc<ProfileState>>,
   auth: AuthHeaders,
   cookies: ForwardedCookies,
   multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ProxyError> {
   // multipart 以外のボディは項目欠落として扱う
   let form = match multipart {
      Ok(multipart) => read_upload_form(multipart).await?,
      Err(_) => None,
   }
   .ok_or_else(|| ProxyError::Validation(ErrorResponse::missing_required_fields().error))?;

   let request = state.authorize(
      UpstreamRequest::post("/profile/profile/upload").with_multipart(form),
      &auth,
      cookies,
   );
   let upstream = state
      .upstream
      .fetch_raw(request)
      .await
      .map_err(|e| log_upstream_error("履歴書アップロード", e))?;

   Ok(respond_raw("履歴書アップロード", upstream, false))
}

/// multipart からアップロードフォームを読み取る
///
/// 同名のパートが複数ある場合は最初のものを使う。
/// 空のテキスト、空のファイルは欠落として扱い、必須項目が揃わなければ `None`。
async fn read_upload_form(mut multipart: Multipart) -> Result<Option<UploadForm>, ProxyError> {
   let mut display_name: Option<String> = None;
   let mut source_type: Option<String> = None;
   let mut resume: Option<UploadFile> = None;

   while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
      let name = field.name().map(str::to_string);
      match name.as_deref() {
         Some("displayName") if display_name.is_none() => {
            display_name = non_empty_text(field).await?;
         }
         Some("sourceType") if source_type.is_none() => {
            source_type = non_empty_text(field).await?;
         }
         Some("resume") if resume.is_none() => {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if !bytes.is_empty() {
               resume = Some(UploadFile { file_name, bytes });
            }
         }
         _ => {}
      }
   }

   Ok(match (display_name, source_type, resume) {
      (Some(display_name), Some(source_type), Some(resume)) => Some(UploadForm {
         display_name,
         source_type,
         resume,
      }),
      _ => None,
   })
}

async fn non_empty_text(field: Field<'_>) -> Result<Option<String>, ProxyError> {
   let text = field.text().await.map_err(multipart_error)?;
   Ok((!text.is_empty()).then_some(text))
}

fn multipart_error(err: MultipartError) -> ProxyError {
   tracing::error!(
      error.category = "request",
      error.kind = "multipart",
      "履歴書アップロードのフォーム解析に失敗しました: {}",
      err
   );
   ProxyError::Unexpected(err.body_text())
}
