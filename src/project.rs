use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::{self, Filter};
use crate::http::{get_json, HttpClient};
use crate::model::{Project, Registry};

/// Enumerates the projects of a registry, already narrowed by the
/// project-level part of `filters`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectLister: Send + Sync {
    async fn list_projects(&self, filters: &[Filter]) -> Result<Vec<Project>>;
}

/// Lists projects through the registry's project API.
pub struct HttpProjectLister<C> {
    registry: Arc<Registry>,
    client: Arc<C>,
}

impl<C: HttpClient> HttpProjectLister<C> {
    pub fn new(registry: Arc<Registry>, client: Arc<C>) -> Self {
        Self { registry, client }
    }
}

#[async_trait]
impl<C: HttpClient> ProjectLister for HttpProjectLister<C> {
    async fn list_projects(&self, filters: &[Filter]) -> Result<Vec<Project>> {
        let url = format!(
            "{}/api/v2.0/projects?page=1&page_size=100",
            self.registry.url()
        );
        let projects: Vec<Project> = get_json(self.client.as_ref(), &url).await?;
        log::debug!("Found {} projects on {}", projects.len(), self.registry.url());

        filter::filter_projects(projects, filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::MockHttpClient;

    #[tokio::test]
    async fn test_list_projects() {
        let mut client = MockHttpClient::new();
        client
            .expect_get()
            .withf(|url: &str| url == "https://harbor/api/v2.0/projects?page=1&page_size=100")
            .returning(|_| {
                Ok(br#"[
                    {"project_id": 1, "name": "library", "metadata": {"public": "true"}},
                    {"project_id": 2, "name": "private"}
                ]"#
                .to_vec())
            });

        let lister = HttpProjectLister::new(
            Arc::new(Registry::new("harbor", "https://harbor/")),
            Arc::new(client),
        );

        let projects = lister.list_projects(&[]).await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "library");
        assert_eq!(projects[0].metadata["public"], "true");

        let projects = lister
            .list_projects(&[Filter::name("priv*/**")])
            .await
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "private");
    }

    #[tokio::test]
    async fn test_list_projects_decode_error() {
        let mut client = MockHttpClient::new();
        client
            .expect_get()
            .returning(|_| Ok(br#"{"errors": []}"#.to_vec()));

        let lister = HttpProjectLister::new(
            Arc::new(Registry::new("harbor", "https://harbor")),
            Arc::new(client),
        );
        match lister.list_projects(&[]).await {
            Err(Error::Decode { url, .. }) => {
                assert_eq!(url, "https://harbor/api/v2.0/projects?page=1&page_size=100")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
