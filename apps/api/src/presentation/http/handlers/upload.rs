use crate::{
    application::upload_graphic::{
        dto::{BusinessInput, UploadGraphicRequest, UploadOptions},
        use_case::UploadGraphicUseCase,
    },
    domain::graphic::{entity::GraphicRecord, value_objects::ALLOWED_EXTENSIONS},
    presentation::http::{errors::AppError, state::AppState},
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

/// Market choices and limits for the upload form.
pub async fn upload_options(State(state): State<AppState>) -> Json<UploadOptions> {
    Json(UploadOptions {
        markets: state.config.markets.clone(),
        allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        max_upload_bytes: state.config.max_upload_bytes as u64,
        password_required: state.config.upload_gate_enabled(),
    })
}

fn parse_metric(name: &str, raw: Option<String>) -> Result<f64, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::BadRequest(format!("{} must be a number", name)))
}

pub async fn upload_graphic(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<GraphicRecord>), AppError> {
    let repository = state.catalog()?;

    let mut image = None;
    let mut market = String::new();
    let mut audience_type = String::new();
    let mut campaign_type = String::new();
    let mut ctr = None;
    let mut roas = None;
    let mut campaign_number = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some((filename, data));
            }
            "market" => market = field.text().await.unwrap_or_default(),
            "audience_type" => audience_type = field.text().await.unwrap_or_default(),
            "campaign_type" => campaign_type = field.text().await.unwrap_or_default(),
            "ctr" => ctr = Some(field.text().await.unwrap_or_default()),
            "roas" => roas = Some(field.text().await.unwrap_or_default()),
            "campaign_number" => campaign_number = Some(field.text().await.unwrap_or_default()),
            _ => {}
        }
    }

    let (filename, image_data) = image.ok_or(AppError::BadRequest("Missing image".into()))?;
    if filename.trim().is_empty() {
        return Err(AppError::BadRequest("Image file name is required".into()));
    }
    if image_data.is_empty() {
        return Err(AppError::BadRequest("Image file is empty".into()));
    }

    let request = UploadGraphicRequest {
        filename,
        image_data,
        business: BusinessInput {
            market,
            audience_type,
            campaign_type,
            ctr: parse_metric("ctr", ctr)?,
            roas: parse_metric("roas", roas)?,
            campaign_number,
        },
    };

    let use_case = UploadGraphicUseCase::new(
        repository,
        state.analyzer.clone(),
        state.config.markets.clone(),
    );
    let record = use_case.execute(request).await?;

    Ok((StatusCode::CREATED, Json(record)))
}
