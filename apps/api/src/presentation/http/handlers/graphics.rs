use crate::{
    application::get_graphic::use_case::GetGraphicUseCase,
    domain::graphic::{entity::GraphicRecord, value_objects::content_type_for_extension},
    presentation::http::{errors::AppError, state::AppState},
};
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

fn use_case(state: &AppState) -> Result<GetGraphicUseCase, AppError> {
    Ok(GetGraphicUseCase::new(state.catalog()?, state.analyzer.clone()))
}

pub async fn get_graphic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GraphicRecord>, AppError> {
    Ok(Json(use_case(&state)?.find(&id).await?))
}

/// Header values must be visible ASCII; anything else becomes `_`.
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}

/// Original image bytes.
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (record, data) = use_case(&state)?.image(&id).await?;
    let disposition = format!("inline; filename=\"{}\"", header_safe(&record.filename));
    Ok((
        [
            (
                header::CONTENT_TYPE,
                content_type_for_extension(record.extension()).to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        data,
    ))
}

/// Small PNG preview for report tables.
pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let data = use_case(&state)?.thumbnail(&id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        data,
    ))
}
