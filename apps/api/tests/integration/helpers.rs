use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use catalog::{
    config::Config,
    presentation::http::{routes::create_router, state::AppState},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::HashMap, io::Cursor, path::PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const UPLOAD_PASSWORD: &str = "CatalogPassword123!";

pub struct TestApp {
    pub app: Router,
    pub data_dir: PathBuf,
    // dropped with the app
    _dir: TempDir,
}

fn build_config(data_dir: &std::path::Path, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("DATA_DIR".into(), data_dir.display().to_string());
    vars.insert("PALETTE_COLOR_COUNT".into(), "4".into());
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("invalid test config")
}

/// Router over a filesystem backend in a fresh temp directory.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(&[]).await
}

pub async fn spawn_app_with(extra: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let data_dir = dir.path().to_path_buf();
    let state = AppState::from_config(build_config(&data_dir, extra)).await;
    TestApp {
        app: create_router(state),
        data_dir,
        _dir: dir,
    }
}

/// Router with the upload password gate switched on.
pub async fn spawn_gated_app() -> TestApp {
    let hash = bcrypt::hash(UPLOAD_PASSWORD, 4).expect("failed to hash password");
    spawn_app_with(&[
        ("UPLOAD_PASSWORD_HASH", hash.as_str()),
        ("SESSION_SECRET", "test-session-secret"),
    ])
    .await
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn get(app: &Router, uri: &str) -> axum::response::Response {
    let req = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request");
    send(app, req).await
}

pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub async fn read_bytes(res: axum::response::Response) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
        .to_vec()
}

pub async fn read_text(res: axum::response::Response) -> String {
    String::from_utf8(read_bytes(res).await).expect("invalid utf8")
}

pub async fn expect_status(
    res: axum::response::Response,
    expected: StatusCode,
) -> axum::response::Response {
    let actual = res.status();

    if actual == expected {
        return res;
    }

    let body = read_text(res).await;
    panic!(
        "HTTP status mismatch. Expected {}, got {}. Response body: {}",
        expected, actual, body
    );
}

/// A PNG whose pixels differ on every call, so its content hash is unique.
pub fn unique_png(width: u32, height: u32) -> Vec<u8> {
    let seed = *Uuid::now_v7().as_bytes();
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        let i = ((x + y) as usize) % 14;
        image::Rgb([seed[i], seed[i + 1], seed[i + 2]])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("failed to encode png");
    bytes
}

/// Form fields for one upload. Unset optional fields are left out of the body.
#[derive(Debug, Clone)]
pub struct UploadForm<'a> {
    pub filename: &'a str,
    pub market: &'a str,
    pub audience_type: &'a str,
    pub campaign_type: &'a str,
    pub ctr: &'a str,
    pub roas: &'a str,
    pub campaign_number: Option<&'a str>,
}

impl Default for UploadForm<'_> {
    fn default() -> Self {
        Self {
            filename: "banner.png",
            market: "medical",
            audience_type: "doctors",
            campaign_type: "awareness",
            ctr: "1.5",
            roas: "3.2",
            campaign_number: None,
        }
    }
}

pub fn multipart_upload_body(form: &UploadForm<'_>, image_bytes: Option<&[u8]>) -> (String, Vec<u8>) {
    let boundary = format!("----catalog-boundary-{}", Uuid::now_v7());
    let mut body = Vec::new();

    let mut push_text = |name: &str, value: &str| {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    };

    push_text("market", form.market);
    push_text("audience_type", form.audience_type);
    push_text("campaign_type", form.campaign_type);
    push_text("ctr", form.ctr);
    push_text("roas", form.roas);
    if let Some(number) = form.campaign_number {
        push_text("campaign_number", number);
    }

    if let Some(image_bytes) = image_bytes {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                form.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(image_bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (boundary, body)
}

pub fn upload_request(
    form: &UploadForm<'_>,
    image_bytes: Option<&[u8]>,
    token: Option<&str>,
) -> Request<Body> {
    let (boundary, body) = multipart_upload_body(form, image_bytes);
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/graphics")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).expect("failed to build upload request")
}

/// Uploads `image_bytes` and returns the created record.
pub async fn upload(app: &Router, form: &UploadForm<'_>, image_bytes: &[u8]) -> Value {
    let res = send(app, upload_request(form, Some(image_bytes), None)).await;
    read_json(expect_status(res, StatusCode::CREATED).await).await
}
