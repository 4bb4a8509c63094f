use std::sync::Arc;

pub use adapter::CatalogAdapter;
pub use api::{ChartInfo, ChartList, ChartVersion, ChartVersionList};
pub use client::{CatalogClient, DEFAULT_CATALOG_URL};

use crate::error::Result;
use crate::http::ReqwestHttpClient;
use crate::model::Registry;

mod adapter;
mod api;
mod client;

/// Builds a catalog adapter for `base_url`, or the public catalog when unset.
pub fn connect(base_url: Option<&str>, insecure: bool) -> Result<CatalogAdapter<ReqwestHttpClient>> {
    let base_url = base_url.unwrap_or(DEFAULT_CATALOG_URL);
    let registry = Registry::new("catalog", base_url).with_insecure(insecure);
    let client = Arc::new(ReqwestHttpClient::for_registry(&registry)?);
    let catalog = CatalogClient::new(client).with_base_url(base_url);
    Ok(CatalogAdapter::new(Arc::new(registry), catalog))
}
