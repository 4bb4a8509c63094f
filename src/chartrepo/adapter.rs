use std::sync::Arc;

use reqwest::Url;

use super::api::{ChartSummary, ChartVersionDetail, ChartVersionSummary};
use super::name::parse_chart_name;
use crate::error::{Error, Result};
use crate::filter::{self, Filter};
use crate::http::{get_json, ChartContent, ChartUpload, HttpClient};
use crate::model::{
    Artifact, Project, Registry, Repository, Resource, ResourceMetadata, ResourceType,
};
use crate::project::ProjectLister;

/// Adapter for a project scoped chart repository (`/api/chartrepo`).
pub struct ChartRepoAdapter<C, P> {
    registry: Arc<Registry>,
    client: Arc<C>,
    projects: P,
}

impl<C, P> ChartRepoAdapter<C, P>
where
    C: HttpClient,
    P: ProjectLister,
{
    pub fn new(registry: Arc<Registry>, client: Arc<C>, projects: P) -> Self {
        Self {
            registry,
            client,
            projects,
        }
    }

    /// Lists every chart version matching `filters`, one [`Resource`] per
    /// version, in project, repository and version listing order.
    pub async fn fetch_charts(&self, filters: &[Filter]) -> Result<Vec<Resource>> {
        let projects = self.projects.list_projects(filters).await?;

        let mut resources = Vec::new();
        for project in &projects {
            let url = format!("{}/api/chartrepo/{}/charts", self.registry.url(), project.name);
            let charts: Vec<ChartSummary> = get_json(self.client.as_ref(), &url).await?;
            if charts.is_empty() {
                log::debug!("Project {} has no charts", project.name);
                continue;
            }

            let repositories = charts
                .into_iter()
                .map(|chart| Repository::new(format!("{}/{}", project.name, chart.name)))
                .collect();
            let repositories = filter::filter_repositories(repositories, filters)?;

            for repository in &repositories {
                self.fetch_repository(project, repository, filters, &mut resources)
                    .await?;
            }
        }

        log::info!(
            "Found {} charts on {}",
            resources.len(),
            self.registry.url()
        );
        Ok(resources)
    }

    async fn fetch_repository(
        &self,
        project: &Project,
        repository: &Repository,
        filters: &[Filter],
        resources: &mut Vec<Resource>,
    ) -> Result<()> {
        let chart = repository
            .name
            .strip_prefix(&format!("{}/", project.name))
            .unwrap_or(&repository.name);
        let url = format!(
            "{}/api/chartrepo/{}/charts/{}",
            self.registry.url(),
            project.name,
            chart
        );
        let versions: Vec<ChartVersionSummary> = get_json(self.client.as_ref(), &url).await?;
        if versions.is_empty() {
            log::debug!("Chart {} has no versions", repository.name);
            return Ok(());
        }

        let artifacts = versions
            .iter()
            .map(|version| Artifact {
                tag: version.version.clone(),
                labels: version.label_names(),
            })
            .collect();
        let artifacts = filter::filter_artifacts(artifacts, filters)?;
        if artifacts.is_empty() {
            log::debug!("No versions of {} matched the filters", repository.name);
            return Ok(());
        }

        resources.extend(artifacts.into_iter().map(|artifact| Resource {
            resource_type: ResourceType::Chart,
            registry: self.registry.clone(),
            metadata: ResourceMetadata {
                repository: Repository {
                    name: repository.name.clone(),
                    metadata: project.metadata.clone(),
                },
                artifact,
            },
        }));
        Ok(())
    }

    /// Whether `name` (`<project>/<chart>`) exists at `version`. Only a 404
    /// counts as absent; any other failure is returned.
    pub async fn chart_exist(&self, name: &str, version: &str) -> Result<bool> {
        match self.chart_info(name, version).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    async fn chart_info(&self, name: &str, version: &str) -> Result<ChartVersionDetail> {
        let (project, chart) = parse_chart_name(name)?;
        let url = format!(
            "{}/api/chartrepo/{}/charts/{}/{}",
            self.registry.url(),
            project,
            chart,
            version
        );
        get_json(self.client.as_ref(), &url).await
    }

    /// Opens the archive of `name` at `version`. The location always comes
    /// from the version detail; `_content_url` is accepted for callers that
    /// carry one but is not consulted.
    pub async fn download_chart(
        &self,
        name: &str,
        version: &str,
        _content_url: &str,
    ) -> Result<ChartContent> {
        let info = self.chart_info(name, version).await?;
        let raw_url = info.download_url().ok_or_else(|| Error::NoDownloadUrl {
            name: name.to_string(),
            version: version.to_string(),
        })?;

        let (project, _) = parse_chart_name(name)?;
        let url = resolve_download_url(self.registry.url(), project, raw_url);
        log::info!("Downloading chart {}:{} from {}", name, version, url);

        self.client.open(&url).await
    }

    pub async fn upload_chart(&self, name: &str, version: &str, chart: ChartUpload) -> Result<()> {
        let (project, chart_name) = parse_chart_name(name)?;
        let url = format!("{}/api/chartrepo/{}/charts", self.registry.url(), project);
        log::info!("Uploading chart {}:{} to {}", name, version, url);

        self.client
            .post_file(&url, "chart", &format!("{}.tgz", chart_name), chart)
            .await
    }

    pub async fn delete_chart(&self, name: &str, version: &str) -> Result<()> {
        let (project, chart) = parse_chart_name(name)?;
        let url = format!(
            "{}/api/chartrepo/{}/charts/{}/{}",
            self.registry.url(),
            project,
            chart,
            version
        );
        log::info!("Deleting chart {}:{}", name, version);

        self.client.delete(&url).await
    }
}

/// Absolute `http(s)` URLs are used as they are. Anything else is taken to
/// be relative to the project's chart repository.
fn resolve_download_url(base: &str, project: &str, raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => raw.to_string(),
        _ => format!("{}/chartrepo/{}/{}", base, project, raw),
    }
}
