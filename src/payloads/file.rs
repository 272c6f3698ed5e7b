//! Design upload bodies for `POST /files`.

use axum::http::Method;
use serde::Serialize;

use super::{now_millis, PayloadError};
use crate::upstream::UpstreamCall;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileUpload {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub filename: String,
    pub visible: bool,
}

impl FileUpload {
    pub fn to_call(&self) -> Result<UpstreamCall, PayloadError> {
        Ok(UpstreamCall::new(Method::POST, "/files").with_body(serde_json::to_vec(self)?))
    }
}

/// Register a design hosted at `url` in the Printful file library.
pub fn design_upload(url: impl Into<String>, filename: Option<String>) -> FileUpload {
    FileUpload {
        url: url.into(),
        kind: "default".to_string(),
        filename: filename.unwrap_or_else(|| format!("design_{}.png", now_millis())),
        visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filename() {
        let upload = design_upload("https://cdn.example.com/a.png", None);
        assert!(upload.filename.starts_with("design_"));
        assert!(upload.filename.ends_with(".png"));
        assert!(upload.visible);
        assert_eq!(upload.kind, "default");
    }

    #[test]
    fn test_upload_call() {
        let call = design_upload("https://cdn.example.com/a.png", Some("logo.png".into()))
            .to_call()
            .unwrap();
        assert_eq!(call.path, "/files");

        let body: serde_json::Value =
            serde_json::from_slice(call.outbound_body().unwrap()).unwrap();
        assert_eq!(body["filename"], "logo.png");
        assert_eq!(body["type"], "default");
    }
}
