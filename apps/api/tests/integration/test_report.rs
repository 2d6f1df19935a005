use super::helpers::{
    UploadForm, expect_status, get, read_json, spawn_app, spawn_app_with, unique_png, upload,
};
use axum::http::StatusCode;
use serde_json::{Value, json};

fn ids(report: &Value) -> Vec<String> {
    report["graphics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap().to_string())
        .collect()
}

async fn report(app: &axum::Router, query: &str) -> Value {
    let res = get(app, &format!("/api/v1/graphics{}", query)).await;
    read_json(expect_status(res, StatusCode::OK).await).await
}

#[tokio::test]
async fn empty_catalog_reports_no_averages() {
    let app = spawn_app().await;
    let body = report(&app.app, "").await;

    assert_eq!(body["total"], 0);
    assert_eq!(body["average_ctr"], Value::Null);
    assert_eq!(body["average_roas"], Value::Null);
    assert_eq!(body["graphics"], json!([]));
    assert_eq!(body["warnings"], json!([]));
}

#[tokio::test]
async fn filters_sort_and_averages() {
    let app = spawn_app().await;

    let a = upload(
        &app.app,
        &UploadForm {
            filename: "a.png",
            market: "medical",
            ctr: "1.0",
            roas: "2.0",
            ..Default::default()
        },
        &unique_png(16, 16),
    )
    .await;
    let b = upload(
        &app.app,
        &UploadForm {
            filename: "b.png",
            market: "education",
            audience_type: "students",
            ctr: "3.0",
            roas: "4.0",
            ..Default::default()
        },
        &unique_png(16, 16),
    )
    .await;
    let c = upload(
        &app.app,
        &UploadForm {
            filename: "c.png",
            market: "medical",
            ctr: "2.0",
            roas: "6.0",
            ..Default::default()
        },
        &unique_png(16, 16),
    )
    .await;
    let id = |v: &Value| v["id"].as_str().unwrap().to_string();

    let all = report(&app.app, "").await;
    assert_eq!(all["total"], 3);
    assert_eq!(ids(&all), [id(&c), id(&b), id(&a)]);
    assert_eq!(all["average_ctr"], 2.0);
    assert_eq!(all["average_roas"], 4.0);
    assert_eq!(all["filters"]["markets"], json!(["education", "medical"]));
    assert_eq!(all["filters"]["audience_types"], json!(["doctors", "students"]));

    let medical = report(&app.app, "?market=medical&sort_by=ctr&order=asc").await;
    assert_eq!(ids(&medical), [id(&a), id(&c)]);
    assert_eq!(medical["average_roas"], 4.0);
    // options always describe the whole catalog
    assert_eq!(medical["filters"]["markets"], json!(["education", "medical"]));

    let by_name = report(&app.app, "?sort_by=filename").await;
    assert_eq!(ids(&by_name), [id(&c), id(&b), id(&a)]);

    let none = report(&app.app, "?market=").await;
    assert_eq!(none["total"], 0);
    assert_eq!(none["average_ctr"], Value::Null);
}

#[tokio::test]
async fn full_selection_descending_equals_reversed_ascending() {
    let app = spawn_app().await;
    for _ in 0..3 {
        upload(&app.app, &UploadForm::default(), &unique_png(9, 9)).await;
    }

    let all = "market=medical&market=education&market=business\
        &audience_type=doctors&campaign_type=awareness";
    let desc = report(&app.app, &format!("?{}", all)).await;
    let asc = report(&app.app, &format!("?{}&order=asc", all)).await;

    let mut reversed = ids(&asc);
    reversed.reverse();
    assert_eq!(ids(&desc), reversed);
    assert_eq!(desc["total"], 3);
}

#[tokio::test]
async fn filter_options_containing_commas_can_be_selected() {
    let app = spawn_app().await;
    let both = upload(
        &app.app,
        &UploadForm {
            audience_type: "doctors, nurses",
            ..Default::default()
        },
        &unique_png(10, 10),
    )
    .await;
    upload(&app.app, &UploadForm::default(), &unique_png(10, 10)).await;

    let all = report(&app.app, "").await;
    assert_eq!(
        all["filters"]["audience_types"],
        json!(["doctors", "doctors, nurses"])
    );

    let picked = report(&app.app, "?audience_type=doctors%2C%20nurses").await;
    assert_eq!(picked["total"], 1);
    assert_eq!(ids(&picked), [both["id"].as_str().unwrap()]);

    let two = report(
        &app.app,
        "?audience_type=doctors&audience_type=doctors%2C%20nurses",
    )
    .await;
    assert_eq!(two["total"], 2);
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() {
    let app = spawn_app().await;
    let res = get(&app.app, "/api/v1/graphics?sort_by=size").await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn corrupted_catalog_reads_as_empty_with_warning() {
    let app = spawn_app().await;
    std::fs::write(app.data_dir.join("graphics_data.json"), b"{ this is not json").unwrap();

    let body = report(&app.app, "").await;
    assert_eq!(body["total"], 0);
    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("could not be parsed"));
}

#[tokio::test]
async fn legacy_catalog_with_polish_keys_is_reported() {
    let app = spawn_app().await;
    let legacy = json!({
        "graphics": [{
            "id": "0123456789abcdef",
            "filename": "stara.png",
            "stored_filename": "0123456789abcdef.png",
            "upload_date": "2023-11-02T08:15:00.000001",
            "technical": {
                "format": "PNG",
                "dimensions": [1080, 1080],
                "ratio": "1:1",
                "file_size": 1000,
                "color_palette": []
            },
            "business": {
                "rynek": "medical",
                "typ_odbiorcy": "lekarze",
                "typ_kampanii": "sprzedażowa",
                "ctr": 0.5,
                "roas": 1.5
            }
        }]
    });
    std::fs::write(
        app.data_dir.join("graphics_data.json"),
        serde_json::to_vec_pretty(&legacy).unwrap(),
    )
    .unwrap();

    let body = report(&app.app, "").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["graphics"][0]["business"]["campaign_type"], "sprzedażowa");
    assert_eq!(body["filters"]["audience_types"], json!(["lekarze"]));
}

#[tokio::test]
async fn unavailable_storage_answers_503() {
    // drive backend without a folder id cannot be set up
    let app = spawn_app_with(&[("STORAGE_BACKEND", "drive")]).await;

    let res = get(&app.app, "/api/v1/graphics").await;
    expect_status(res, StatusCode::SERVICE_UNAVAILABLE).await;

    let res = get(&app.app, "/api/v1/status").await;
    let status: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(status["storage"]["backend"], "drive");
    assert_eq!(status["storage"]["available"], false);
    assert!(
        status["storage"]["message"]
            .as_str()
            .unwrap()
            .contains("DRIVE_FOLDER_ID")
    );
}
