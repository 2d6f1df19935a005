use crate::domain::graphic::entity::GraphicRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortField {
    #[default]
    UploadDate,
    Ctr,
    Roas,
    Filename,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload_date" => Ok(Self::UploadDate),
            "ctr" => Ok(Self::Ctr),
            "roas" => Ok(Self::Roas),
            "filename" => Ok(Self::Filename),
            other => Err(format!(
                "Unknown sort field '{}'. Use upload_date, ctr, roas or filename",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desc" => Ok(Self::Desc),
            "asc" => Ok(Self::Asc),
            other => Err(format!("Unknown sort order '{}'. Use asc or desc", other)),
        }
    }
}

/// Report selection. `None` selects every available value of a dimension;
/// `Some(vec![])` selects none.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub markets: Option<Vec<String>>,
    pub audience_types: Option<Vec<String>>,
    pub campaign_types: Option<Vec<String>>,
    pub sort_by: SortField,
    pub order: SortOrder,
}

/// Distinct values present in the catalog, sorted.
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export)]
pub struct FilterOptions {
    pub markets: Vec<String>,
    pub audience_types: Vec<String>,
    pub campaign_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ReportResponse {
    pub total: usize,
    /// `None` when nothing matched
    pub average_ctr: Option<f64>,
    pub average_roas: Option<f64>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub filters: FilterOptions,
    pub graphics: Vec<GraphicRecord>,
    pub warnings: Vec<String>,
}
