use std::sync::Arc;

use super::api::{ChartList, ChartVersionList};
use crate::error::{Error, Result};
use crate::http::{get_json, ChartContent, HttpClient};

pub const DEFAULT_CATALOG_URL: &str = "https://hub.helm.sh";

const LIST_CHARTS: &str = "/api/chartsvc/v1/charts";

fn list_versions(chart: &str) -> String {
    format!("/api/chartsvc/v1/charts/{}/versions", chart)
}

/// Read-only client for the public chart catalog.
pub struct CatalogClient<C> {
    base_url: String,
    client: Arc<C>,
}

impl<C: HttpClient> CatalogClient<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists every chart in the catalog. The catalog is expected to answer
    /// in a single page.
    pub async fn fetch_charts(&self) -> Result<ChartList> {
        let url = format!("{}{}", self.base_url, LIST_CHARTS);
        let list: ChartList = get_json(self.client.as_ref(), &url).await?;

        if let Some(total_pages) = list.meta.as_ref().and_then(|meta| meta.total_pages) {
            if total_pages > 1 {
                return Err(Error::Paginated { url, total_pages });
            }
        }
        Ok(list)
    }

    /// Lists the versions of `chart`, failing with [`Error::NotFound`] when
    /// the catalog does not know it.
    pub async fn fetch_chart_detail(&self, chart: &str) -> Result<ChartVersionList> {
        let url = format!("{}{}", self.base_url, list_versions(chart));
        match get_json(self.client.as_ref(), &url).await {
            Err(error) if error.status() == Some(404) => Err(Error::NotFound(chart.to_string())),
            result => result,
        }
    }

    pub async fn check_healthy(&self) -> Result<()> {
        match self.client.get(&self.base_url).await {
            Ok(_) => Ok(()),
            Err(Error::Remote { status, .. }) => Err(Error::Unhealthy(status)),
            Err(error) => Err(error),
        }
    }

    pub(crate) async fn open(&self, url: &str) -> Result<ChartContent> {
        self.client.open(url).await
    }
}
