use super::dto::{FilterOptions, ReportQuery, ReportResponse, SortField, SortOrder};
use crate::domain::graphic::{
    entity::{Catalog, GraphicRecord},
    errors::DomainError,
    repository::CatalogRepository,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct ReportUseCase {
    repository: Arc<dyn CatalogRepository>,
}

impl ReportUseCase {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, query), fields(sort_by = ?query.sort_by, order = ?query.order))]
    pub async fn execute(&self, query: ReportQuery) -> Result<ReportResponse, DomainError> {
        let snapshot = self.repository.load().await?;
        let mut report = build_report(&snapshot.catalog, &query);
        report.warnings.extend(snapshot.warning);
        debug!("Report matched {} of {} graphics", report.total, snapshot.catalog.len());
        Ok(report)
    }
}

/// Filters, sorts and summarises a catalog.
pub fn build_report(catalog: &Catalog, query: &ReportQuery) -> ReportResponse {
    let filters = filter_options(catalog);

    let mut graphics: Vec<GraphicRecord> = catalog
        .graphics
        .iter()
        .filter(|g| {
            selected(&query.markets, &g.business.market)
                && selected(&query.audience_types, &g.business.audience_type)
                && selected(&query.campaign_types, &g.business.campaign_type)
        })
        .cloned()
        .collect();

    // sort_by is stable; reversing the comparator keeps ties in catalog order
    graphics.sort_by(|a, b| {
        let ord = compare(a, b, query.sort_by);
        match query.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let total = graphics.len();
    let (average_ctr, average_roas) = if total == 0 {
        (None, None)
    } else {
        let n = total as f64;
        (
            Some(graphics.iter().map(|g| g.business.ctr).sum::<f64>() / n),
            Some(graphics.iter().map(|g| g.business.roas).sum::<f64>() / n),
        )
    };

    ReportResponse {
        total,
        average_ctr,
        average_roas,
        sort_by: query.sort_by,
        order: query.order,
        filters,
        graphics,
        warnings: Vec::new(),
    }
}

fn selected(selection: &Option<Vec<String>>, value: &str) -> bool {
    match selection {
        None => true,
        Some(values) => values.iter().any(|v| v == value),
    }
}

fn compare(a: &GraphicRecord, b: &GraphicRecord, field: SortField) -> Ordering {
    match field {
        SortField::UploadDate => a.upload_date.cmp(&b.upload_date),
        SortField::Ctr => a.business.ctr.total_cmp(&b.business.ctr),
        SortField::Roas => a.business.roas.total_cmp(&b.business.roas),
        SortField::Filename => a.filename.cmp(&b.filename),
    }
}

fn filter_options(catalog: &Catalog) -> FilterOptions {
    FilterOptions {
        markets: distinct(catalog, |g| &g.business.market),
        audience_types: distinct(catalog, |g| &g.business.audience_type),
        campaign_types: distinct(catalog, |g| &g.business.campaign_type),
    }
}

fn distinct(catalog: &Catalog, field: fn(&GraphicRecord) -> &str) -> Vec<String> {
    catalog
        .graphics
        .iter()
        .map(|g| field(g).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
