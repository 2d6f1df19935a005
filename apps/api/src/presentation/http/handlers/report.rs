use crate::{
    application::report::{
        dto::{ReportQuery, ReportResponse, SortField, SortOrder},
        use_case::ReportUseCase,
    },
    presentation::http::{errors::AppError, state::AppState},
};
use axum::{
    Json,
    extract::{Query, State},
};

/// Report query parameters. Selections repeat their key
/// (`?market=medical&market=education`); an empty value selects nothing
/// while an absent key selects everything.
#[derive(Debug, Default)]
pub struct ReportParams {
    pub market: Option<Vec<String>>,
    pub audience_type: Option<Vec<String>>,
    pub campaign_type: Option<Vec<String>>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ReportParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "market" => select(&mut params.market, value),
                "audience_type" => select(&mut params.audience_type, value),
                "campaign_type" => select(&mut params.campaign_type, value),
                "sort_by" => params.sort_by = Some(value),
                "order" => params.order = Some(value),
                _ => {}
            }
        }
        params
    }
}

fn select(selection: &mut Option<Vec<String>>, value: String) {
    let values = selection.get_or_insert_with(Vec::new);
    let value = value.trim();
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

impl TryFrom<ReportParams> for ReportQuery {
    type Error = AppError;

    fn try_from(params: ReportParams) -> Result<Self, Self::Error> {
        let sort_by = match params.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortField::default(),
            Some(s) => s.parse().map_err(AppError::BadRequest)?,
        };
        let order = match params.order.as_deref().map(str::trim) {
            None | Some("") => SortOrder::default(),
            Some(s) => s.parse().map_err(AppError::BadRequest)?,
        };
        Ok(ReportQuery {
            markets: params.market,
            audience_types: params.audience_type,
            campaign_types: params.campaign_type,
            sort_by,
            order,
        })
    }
}

pub async fn get_report(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ReportResponse>, AppError> {
    let query = ReportQuery::try_from(ReportParams::from_pairs(pairs))?;
    let report = ReportUseCase::new(state.catalog()?).execute(query).await?;
    Ok(Json(report))
}
