//! Test fixtures
//!
//! Canned remote store behaviour and request payloads for integration tests.

use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use super::CLOUD_NAME;

/// Bytes served for every fetched image
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image payload";

/// Width and height reported for every upload
pub const UPLOAD_WIDTH: u32 = 10;
pub const UPLOAD_HEIGHT: u32 = 20;

/// Value of a text field in a multipart body
pub fn multipart_field(body: &[u8], name: &str) -> Option<String> {
    let body = String::from_utf8_lossy(body);
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("\r\n")? + start;
    Some(body[start..end].to_string())
}

/// Echoes an upload back as a stored asset served by the same mock server
pub struct EchoUpload {
    pub base_url: String,
}

impl Respond for EchoUpload {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let folder = multipart_field(&request.body, "folder").unwrap_or_default();
        let public_id = multipart_field(&request.body, "public_id").unwrap_or_default();

        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "secure_url": format!(
                "{}/res/{}/image/upload/v1700000000/{}/{}.png",
                self.base_url, CLOUD_NAME, folder, public_id
            ),
            "width": UPLOAD_WIDTH,
            "height": UPLOAD_HEIGHT,
            "public_id": format!("{}/{}", folder, public_id),
        }))
    }
}

/// Upload endpoint path on the mock server
pub fn upload_path() -> String {
    format!("/v1_1/{}/image/upload", CLOUD_NAME)
}

/// Destroy endpoint path on the mock server
pub fn destroy_path() -> String {
    format!("/v1_1/{}/image/destroy", CLOUD_NAME)
}

/// Prefix-delete endpoint path on the mock server
pub fn resources_path() -> String {
    format!("/v1_1/{}/resources/image/upload", CLOUD_NAME)
}

/// Mount an upload endpoint that succeeds for every file
pub async fn mount_echo_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(upload_path()))
        .respond_with(EchoUpload {
            base_url: server.uri(),
        })
        .mount(server)
        .await;
}

/// Mount delivery URLs for every stored image
pub async fn mount_image_delivery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/res/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(IMAGE_BYTES))
        .mount(server)
        .await;
}

/// Multipart form with one `files` part per name
pub fn image_form(names: &[&str]) -> reqwest::multipart::Form {
    names.iter().fold(reqwest::multipart::Form::new(), |form, name| {
        let part = reqwest::multipart::Part::bytes(IMAGE_BYTES.to_vec())
            .file_name(name.to_string())
            .mime_str("image/png")
            .expect("valid mime type");
        form.part("files", part)
    })
}
