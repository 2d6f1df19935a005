use super::helpers::{
    UploadForm, expect_status, get, read_bytes, read_json, send, spawn_app, spawn_app_with,
    unique_png, upload,
};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::Value;

#[tokio::test]
async fn health_and_status_report_filesystem_backend() {
    let app = spawn_app().await;

    let res = get(&app.app, "/health").await;
    let health: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["backend"], "filesystem");

    let res = get(&app.app, "/api/v1/status").await;
    let status: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(status["storage"]["available"], true);
    assert_eq!(status["catalog_file"], "graphics_data.json");
    assert_eq!(status["upload_password_required"], false);
}

#[tokio::test]
async fn smoke_upload_then_fetch_record_image_and_thumbnail() {
    let app = spawn_app().await;
    let image = unique_png(400, 200);

    let record = upload(
        &app.app,
        &UploadForm {
            filename: "wide.png",
            ..Default::default()
        },
        &image,
    )
    .await;
    let id = record["id"].as_str().unwrap();
    assert_eq!(record["technical"]["ratio"], "2:1");

    let res = get(&app.app, &format!("/api/v1/graphics/{}", id)).await;
    let fetched: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(fetched, record);

    let res = get(&app.app, &format!("/api/v1/graphics/{}/image", id)).await;
    let res = expect_status(res, StatusCode::OK).await;
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(read_bytes(res).await, image);

    let res = get(&app.app, &format!("/api/v1/graphics/{}/thumbnail", id)).await;
    let res = expect_status(res, StatusCode::OK).await;
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
    let thumb = image::load_from_memory(&read_bytes(res).await).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (120, 60));
}

#[tokio::test]
async fn unknown_graphic_is_404() {
    let app = spawn_app().await;
    for uri in [
        "/api/v1/graphics/deadbeef",
        "/api/v1/graphics/deadbeef/image",
        "/api/v1/graphics/deadbeef/thumbnail",
    ] {
        let res = get(&app.app, uri).await;
        expect_status(res, StatusCode::NOT_FOUND).await;
    }
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = spawn_app().await;

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let res = send(&app.app, req).await;
    assert_eq!(res.headers()["x-request-id"], "trace-me-123");

    let res = get(&app.app, "/health").await;
    assert!(!res.headers()["x-request-id"].is_empty());
}

#[tokio::test]
async fn login_without_configured_password_is_rejected() {
    let app = spawn_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"password":"anything"}"#))
        .unwrap();
    let res = send(&app.app, req).await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn malformed_password_hash_fails_without_leaking_details() {
    let app = spawn_app_with(&[
        ("UPLOAD_PASSWORD_HASH", "not-a-bcrypt-hash"),
        ("SESSION_SECRET", "s3cret"),
    ])
    .await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"password":"anything"}"#))
        .unwrap();
    let res = send(&app.app, req).await;
    let body: Value = read_json(expect_status(res, StatusCode::INTERNAL_SERVER_ERROR).await).await;
    assert_eq!(body["error"], "Internal server error");
}
