use std::sync::Arc;

pub use adapter::ChartRepoAdapter;
pub use api::{ChartSummary, ChartVersionDetail, ChartVersionMetadata, ChartVersionSummary, Label};
pub use name::parse_chart_name;

use crate::error::Result;
use crate::http::ReqwestHttpClient;
use crate::model::Registry;
use crate::project::HttpProjectLister;

mod adapter;
mod api;
mod name;

pub type HttpChartRepoAdapter =
    ChartRepoAdapter<ReqwestHttpClient, HttpProjectLister<ReqwestHttpClient>>;

/// Builds an adapter that reaches `registry` over HTTP.
pub fn connect(registry: Registry) -> Result<HttpChartRepoAdapter> {
    let client = Arc::new(ReqwestHttpClient::for_registry(&registry)?);
    let registry = Arc::new(registry);
    let projects = HttpProjectLister::new(registry.clone(), client.clone());
    Ok(ChartRepoAdapter::new(registry, client, projects))
}
