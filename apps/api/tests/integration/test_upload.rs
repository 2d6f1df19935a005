use super::helpers::{
    UPLOAD_PASSWORD, UploadForm, expect_status, get, read_json, send, spawn_app, spawn_gated_app,
    unique_png, upload, upload_request,
};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};

#[tokio::test]
async fn upload_creates_record_with_technical_metadata() {
    let app = spawn_app().await;
    let image = unique_png(64, 36);

    let form = UploadForm {
        filename: "Spring Banner.PNG",
        campaign_number: Some("CMP-2024/01"),
        ..Default::default()
    };
    let record = upload(&app.app, &form, &image).await;

    let id = record["id"].as_str().expect("id missing");
    assert_eq!(id.len(), 64);
    assert_eq!(record["filename"], "Spring Banner.PNG");
    assert_eq!(record["stored_filename"], format!("{}.png", id));
    assert!(record.get("drive_file_id").is_none());
    assert_eq!(record["technical"]["format"], "PNG");
    assert_eq!(record["technical"]["dimensions"], json!([64, 36]));
    assert_eq!(record["technical"]["ratio"], "16:9");
    assert_eq!(record["technical"]["file_size"], image.len() as u64);
    assert!(!record["technical"]["color_palette"].as_array().unwrap().is_empty());
    assert_eq!(record["business"]["market"], "medical");
    assert_eq!(record["business"]["campaign_number"], "CMP-2024/01");

    assert!(app.data_dir.join("uploads").join(format!("{}.png", id)).exists());
    let saved: Value = serde_json::from_slice(
        &std::fs::read(app.data_dir.join("graphics_data.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["graphics"][0]["id"], id);
}

#[tokio::test]
async fn identical_image_is_rejected_as_duplicate() {
    let app = spawn_app().await;
    let image = unique_png(20, 20);

    upload(&app.app, &UploadForm::default(), &image).await;

    let renamed = UploadForm {
        filename: "copy.png",
        ..Default::default()
    };
    let res = send(&app.app, upload_request(&renamed, Some(image.as_slice()), None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::CONFLICT).await).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let report: Value = read_json(get(&app.app, "/api/v1/graphics").await).await;
    assert_eq!(report["total"], 1);
}

#[tokio::test]
async fn second_save_backs_up_previous_catalog() {
    let app = spawn_app().await;
    upload(&app.app, &UploadForm::default(), &unique_png(10, 10)).await;
    let first = std::fs::read(app.data_dir.join("graphics_data.json")).unwrap();

    upload(&app.app, &UploadForm::default(), &unique_png(10, 10)).await;

    let backups: Vec<_> = std::fs::read_dir(app.data_dir.join("backups"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    let name = backups[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("graphics_data_backup_"), "{}", name);
    assert_eq!(std::fs::read(&backups[0]).unwrap(), first);
}

#[tokio::test]
async fn upload_rejects_request_without_image_part() {
    let app = spawn_app().await;
    let res = send(&app.app, upload_request(&UploadForm::default(), None, None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert_eq!(body["error"], "Missing image");
}

#[tokio::test]
async fn upload_rejects_invalid_input() {
    let app = spawn_app().await;
    let image = unique_png(8, 8);

    let cases = [
        UploadForm {
            filename: "notes.txt",
            ..Default::default()
        },
        UploadForm {
            market: "retail",
            ..Default::default()
        },
        UploadForm {
            audience_type: "   ",
            ..Default::default()
        },
        UploadForm {
            ctr: "-1",
            ..Default::default()
        },
        UploadForm {
            roas: "plenty",
            ..Default::default()
        },
        UploadForm {
            campaign_number: Some("no spaces allowed"),
            ..Default::default()
        },
    ];

    for form in &cases {
        let res = send(&app.app, upload_request(form, Some(image.as_slice()), None)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "form {:?}", form);
    }
    assert!(!app.data_dir.join("graphics_data.json").exists());
}

#[tokio::test]
async fn bytes_that_are_not_an_image_are_rejected() {
    let app = spawn_app().await;
    let res = send(
        &app.app,
        upload_request(&UploadForm::default(), Some(&b"plain text, not a png"[..]), None),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert!(body["error"].as_str().unwrap().contains("not a readable image"));

    let uploads = std::fs::read_dir(app.data_dir.join("uploads")).unwrap().count();
    assert_eq!(uploads, 0);
}

#[tokio::test]
async fn truncated_image_is_rejected() {
    let app = spawn_app().await;
    let image = unique_png(200, 200);
    let truncated = &image[..image.len() / 2];

    let res = send(
        &app.app,
        upload_request(&UploadForm::default(), Some(truncated), None),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert!(body["error"].as_str().unwrap().contains("not a readable image"));
    assert!(!app.data_dir.join("graphics_data.json").exists());
}

#[tokio::test]
async fn gate_requires_session_token() {
    let app = spawn_gated_app().await;
    let image = unique_png(12, 12);

    let res = send(
        &app.app,
        upload_request(&UploadForm::default(), Some(image.as_slice()), None),
    )
    .await;
    expect_status(res, StatusCode::UNAUTHORIZED).await;

    let res = send(
        &app.app,
        upload_request(&UploadForm::default(), Some(image.as_slice()), Some("not-a-token")),
    )
    .await;
    expect_status(res, StatusCode::UNAUTHORIZED).await;

    let login = |password: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "password": password }).to_string()))
            .expect("failed to build login request")
    };

    let res = send(&app.app, login("wrong password")).await;
    expect_status(res, StatusCode::FORBIDDEN).await;

    let res = send(&app.app, login(UPLOAD_PASSWORD)).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    let token = body["token"].as_str().expect("token missing");

    let res = send(
        &app.app,
        upload_request(&UploadForm::default(), Some(image.as_slice()), Some(token)),
    )
    .await;
    expect_status(res, StatusCode::CREATED).await;

    // reads stay open
    let res = get(&app.app, "/api/v1/graphics").await;
    expect_status(res, StatusCode::OK).await;
}

#[tokio::test]
async fn upload_options_list_markets() {
    let app = spawn_app().await;
    let res = get(&app.app, "/api/v1/upload/options").await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["markets"], json!(["medical", "education", "business"]));
    assert_eq!(body["password_required"], false);
    assert!(body["allowed_extensions"]
        .as_array()
        .unwrap()
        .contains(&json!("webp")));
}
