use std::sync::Arc;

use super::client::CatalogClient;
use crate::chartrepo::parse_chart_name;
use crate::error::{Error, Result};
use crate::filter::{self, Filter};
use crate::http::{ChartContent, HttpClient};
use crate::model::{Artifact, Registry, Repository, Resource, ResourceMetadata, ResourceType};

/// Read-only adapter over the chart catalog. Charts are named
/// `<repo>/<chart>` after the catalog's chart ids.
pub struct CatalogAdapter<C> {
    registry: Arc<Registry>,
    catalog: CatalogClient<C>,
}

impl<C: HttpClient> CatalogAdapter<C> {
    pub fn new(registry: Arc<Registry>, catalog: CatalogClient<C>) -> Self {
        Self { registry, catalog }
    }

    pub fn catalog(&self) -> &CatalogClient<C> {
        &self.catalog
    }

    pub async fn fetch_charts(&self, filters: &[Filter]) -> Result<Vec<Resource>> {
        let charts = self.catalog.fetch_charts().await?;
        let repositories = charts
            .data
            .into_iter()
            .map(|chart| Repository::new(chart.id))
            .collect();
        let repositories = filter::filter_repositories(repositories, filters)?;

        let mut resources = Vec::new();
        for repository in repositories {
            let versions = match self.catalog.fetch_chart_detail(&repository.name).await {
                Ok(versions) => versions,
                Err(Error::NotFound(_)) => {
                    log::warn!("Chart {} disappeared from the catalog", repository.name);
                    continue;
                }
                Err(error) => return Err(error),
            };

            let artifacts = versions
                .data
                .into_iter()
                .map(|version| Artifact {
                    tag: version.attributes.version,
                    labels: Vec::new(),
                })
                .collect();
            let artifacts = filter::filter_artifacts(artifacts, filters)?;

            resources.extend(artifacts.into_iter().map(|artifact| Resource {
                resource_type: ResourceType::Chart,
                registry: self.registry.clone(),
                metadata: ResourceMetadata {
                    repository: repository.clone(),
                    artifact,
                },
            }));
        }

        log::info!("Found {} charts in the catalog", resources.len());
        Ok(resources)
    }

    pub async fn chart_exist(&self, name: &str, version: &str) -> Result<bool> {
        parse_chart_name(name)?;
        match self.catalog.fetch_chart_detail(name).await {
            Ok(versions) => Ok(versions.find(version).is_some()),
            Err(Error::NotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    pub async fn download_chart(&self, name: &str, version: &str) -> Result<ChartContent> {
        parse_chart_name(name)?;
        let versions = self.catalog.fetch_chart_detail(name).await?;
        let chart = versions
            .find(version)
            .ok_or_else(|| Error::NotFound(format!("{}:{}", name, version)))?;

        let url = chart
            .attributes
            .urls
            .first()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::NoDownloadUrl {
                name: name.to_string(),
                version: version.to_string(),
            })?;
        log::info!("Downloading chart {}:{} from {}", name, version, url);

        self.catalog.open(url).await
    }
}
