use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::response::Response;
use serde::Deserialize;

use super::{multipart_body, query_params};
use crate::auth::AuthUser;
use crate::models::UploadImageResponse;
use crate::services::ImageUpload;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::success;

const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageQuery {
    pub old_image_url: Option<String>,
    /// Defaults to `true` whenever `oldImageUrl` is given.
    pub delete_old_image: Option<bool>,
}

struct ReceivedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

pub async fn upload_image(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<UploadImageQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let query = query_params(query)?;
    let multipart = multipart_body(multipart)?;
    let file = read_file_field(multipart)
        .await?
        .ok_or_else(|| AppError::ValidationError("No file provided.".into()))?;

    let old_image_url = query.old_image_url.as_deref().filter(|u| !u.is_empty());
    let delete_old_image = query
        .delete_old_image
        .unwrap_or(old_image_url.is_some());

    let upload = ImageUpload {
        file_name: &file.file_name,
        content_type: &file.content_type,
        bytes: &file.bytes,
    };
    let image_url = state
        .events
        .upload_image(user.id(), upload, delete_old_image, old_image_url)
        .await?;

    Ok(success(UploadImageResponse { image_url }, "Image uploaded"))
}

async fn read_file_field(mut multipart: Multipart) -> AppResult<Option<ReceivedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(ReceivedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::ValidationError(format!("Invalid multipart body: {}", err.body_text()))
}
