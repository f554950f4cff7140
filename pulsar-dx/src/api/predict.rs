//! Scan upload and diagnosis

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::analysis::Prediction;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field carrying the scan
pub const UPLOAD_FIELD: &str = "file";

/// An accepted upload
#[derive(Debug)]
struct Upload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Pull the `file` part out of the form, ignoring any other fields
async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest(format!(
                "Invalid file type '{}': an image upload is required",
                content_type
            )));
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();
        return Ok(Upload { filename, bytes });
    }

    Err(ApiError::BadRequest(format!(
        "Missing '{}' field in upload",
        UPLOAD_FIELD
    )))
}

/// POST /predict
///
/// Rejected uploads leave no history row. Bytes that fail to decode still
/// return 200 with a degraded prediction.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<Prediction>> {
    let upload = read_upload(multipart).await?;
    info!(
        filename = upload.filename.as_deref().unwrap_or("<unnamed>"),
        size = upload.bytes.len(),
        "Scan received"
    );

    let prediction = state
        .engine
        .predict(upload.bytes, upload.filename.as_deref())
        .await?;
    Ok(Json(prediction))
}

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}
