use serde::Deserialize;

/// Body of the chart list endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct ChartList {
    pub data: Vec<ChartInfo>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ListMeta {
    #[serde(rename = "totalPages", default)]
    pub total_pages: Option<u32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChartInfo {
    /// `<repo>/<chart>`
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub attributes: Option<ChartAttributes>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChartAttributes {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repo: Option<ChartRepo>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChartRepo {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of the per-chart version list endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct ChartVersionList {
    pub data: Vec<ChartVersion>,
}

impl ChartVersionList {
    pub fn find(&self, version: &str) -> Option<&ChartVersion> {
        self.data
            .iter()
            .find(|candidate| candidate.attributes.version == version)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChartVersion {
    #[serde(default)]
    pub id: Option<String>,
    pub attributes: ChartVersionAttributes,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChartVersionAttributes {
    pub version: String,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}
