//! Product image upload.
//!
//! Images are written to the configured upload directory under a random
//! name and served back from `/uploads/<file>`.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use tracing::instrument;
use uuid::Uuid;

use golazo_core::UploadResponse;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Maximum accepted request body for an upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// `POST /api/upload/image`
#[instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart?;
    let no_file = || AppError::BadRequest("No file uploaded".to_string());

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Only image files are allowed".to_string(),
            ));
        }
        let extension = file_extension(field.file_name(), &content_type);

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(no_file());
        }

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let dir = &state.config().upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("write upload: {e}")))?;

        tracing::info!(file = %file_name, size = bytes.len(), "Image uploaded");
        return Ok(Json(UploadResponse {
            image_url: state.config().upload_url(&file_name),
        }));
    }

    Err(no_file())
}

/// Extension for the stored file: the uploaded name's extension when it is
/// short and alphanumeric, otherwise derived from the content type.
fn file_extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type
            .trim_start_matches("image/")
            .split(['+', ';'])
            .next()
            .unwrap_or_default()
        {
            "jpeg" => "jpg".to_string(),
            "" => "img".to_string(),
            other => other.to_string(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };

    use crate::test_support::TestApp;

    const BOUNDARY: &str = "golazoBoundary";

    fn multipart_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload/image")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Some("Camiseta.PNG"), "image/png"), "png");
        assert_eq!(file_extension(Some("foto"), "image/jpeg"), "jpg");
        assert_eq!(file_extension(None, "image/svg+xml"), "svg");
        assert_eq!(file_extension(Some("x.p/../h"), "image/webp"), "webp");
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let app = TestApp::new();
        let (status, body) = app
            .send(multipart_request("image", "balon.png", "image/png", b"\x89PNG fake"))
            .await;

        assert_eq!(status, StatusCode::OK);
        let url = body["imageUrl"].as_str().unwrap();
        assert!(url.starts_with("http://localhost:3000/uploads/"));
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let (status, served) = app.get(&format!("/uploads/{file_name}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(served, "\u{fffd}PNG fake");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let app = TestApp::new();
        let (status, body) = app
            .send(multipart_request("image", "notas.txt", "text/plain", b"hola"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only image files are allowed");
    }

    #[tokio::test]
    async fn test_upload_without_image_field() {
        let app = TestApp::new();
        let (status, body) = app
            .send(multipart_request("archivo", "balon.png", "image/png", b"data"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_payload_too_large() {
        let app = TestApp::new();
        let oversized = vec![0_u8; MAX_UPLOAD_BYTES + 1];
        let (status, body) = app
            .send(multipart_request("image", "estadio.png", "image/png", &oversized))
            .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }
}
