use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use jpegfit_core::{transport::JPEG_CONTENT_TYPE, validate_upload, CompressedImage};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// Sets the flag when the request future is dropped, so an abandoned
/// request stops compressing at the next attempt boundary.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64Response {
    pub image: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub attempts: usize,
    pub within_budget: bool,
    pub byte_length: u64,
    pub encoded_length: u64,
}

impl From<CompressedImage> for Base64Response {
    fn from(image: CompressedImage) -> Self {
        Self {
            image: image.to_base64(),
            mime_type: JPEG_CONTENT_TYPE,
            width: image.width,
            height: image.height,
            quality: image.quality,
            attempts: image.attempts.len(),
            within_budget: image.within_budget,
            byte_length: image.byte_len(),
            encoded_length: image.projected_base64_len(),
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

/// `POST /api/resize`: answer with the compressed JPEG bytes.
pub async fn resize(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let upload = read_upload(multipart).await?;
    let image = compress_upload(&state, upload).await?;

    Ok(([(header::CONTENT_TYPE, JPEG_CONTENT_TYPE)], image.into_bytes()).into_response())
}

/// `POST /api/resize/base64`: answer with the compressed JPEG as base64 JSON.
pub async fn resize_base64(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<Base64Response>> {
    let upload = read_upload(multipart).await?;
    let image = compress_upload(&state, upload).await?;

    Ok(Json(Base64Response::from(image)))
}

async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;
        return Ok(Upload {
            bytes: bytes.to_vec(),
            content_type,
        });
    }

    Err(AppError::bad_request("No file uploaded"))
}

async fn compress_upload(state: &AppState, upload: Upload) -> AppResult<CompressedImage> {
    let format = validate_upload(&upload.bytes, upload.content_type.as_deref(), &state.intake)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let _guard = CancelOnDrop(Arc::clone(&cancelled));
    let encoder = Arc::clone(&state.encoder);
    let budget = state.budget;
    let input_len = upload.bytes.len();

    let result = tokio::task::spawn_blocking(move || {
        encoder.compress_with_cancel(&upload.bytes, &budget, || cancelled.load(Ordering::Relaxed))
    })
    .await
    .map_err(|e| AppError::internal(format!("Compression task failed: {e}")))?;

    match result {
        Ok(image) => {
            info!(
                source_format = ?format,
                input_len,
                output_len = image.byte_len(),
                width = image.width,
                height = image.height,
                quality = image.quality,
                attempts = image.attempts.len(),
                within_budget = image.within_budget,
                "compressed upload"
            );
            Ok(image)
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, input_len, "compression failed");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use jpegfit_core::{IntakeLimits, SizeBudget};
    use tower::ServiceExt;

    const BOUNDARY: &str = "jpegfit-test-boundary";

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
        });
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn error_message(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["error"]["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(AppState::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_resize_returns_jpeg() {
        let body = multipart_body(FILE_FIELD, "image/png", &png_bytes(64, 48));
        let response = app(AppState::default())
            .oneshot(upload_request("/api/resize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JPEG_CONTENT_TYPE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[0..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_resize_base64_reports_lengths() {
        let body = multipart_body(FILE_FIELD, "image/png", &png_bytes(64, 48));
        let response = app(AppState::default())
            .oneshot(upload_request("/api/resize/base64", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let image = json["image"].as_str().unwrap();
        assert!(image.starts_with("/9j/"));
        assert_eq!(json["encodedLength"].as_u64().unwrap(), image.len() as u64);
        assert_eq!(json["mimeType"], "image/jpeg");
        assert_eq!(json["width"], 64);
        assert_eq!(json["height"], 48);
        assert_eq!(json["withinBudget"], true);
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let body = multipart_body("photo", "image/png", &png_bytes(8, 8));
        let response = app(AppState::default())
            .oneshot(upload_request("/api/resize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "No file uploaded");
    }

    #[tokio::test]
    async fn test_unsupported_type() {
        let body = multipart_body(FILE_FIELD, "image/gif", b"GIF89a");
        let response = app(AppState::default())
            .oneshot(upload_request("/api/resize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_undecodable_upload() {
        let body = multipart_body(FILE_FIELD, "image/png", b"definitely not a png");
        let response = app(AppState::default())
            .oneshot(upload_request("/api/resize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_over_intake_limit() {
        let state = AppState {
            intake: IntakeLimits { max_input_bytes: 64 },
            ..AppState::default()
        };
        let body = multipart_body(FILE_FIELD, "image/png", &png_bytes(32, 32));
        let response = app(state)
            .oneshot(upload_request("/api/resize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unreachable_budget() {
        let state = AppState {
            budget: SizeBudget::raw(1),
            ..AppState::default()
        };
        let body = multipart_body(FILE_FIELD, "image/png", &png_bytes(32, 32));
        let response = app(state)
            .oneshot(upload_request("/api/resize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error_message(response)
            .await
            .starts_with("Image cannot be reduced enough"));
    }

    #[test]
    fn test_cancel_guard_sets_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        drop(CancelOnDrop(Arc::clone(&flag)));
        assert!(flag.load(Ordering::Relaxed));
    }
}
