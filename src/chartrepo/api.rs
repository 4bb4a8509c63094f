use serde::Deserialize;

/// Entry of `GET /api/chartrepo/{project}/charts`.
#[derive(Deserialize, Debug, Clone)]
pub struct ChartSummary {
    pub name: String,
    #[serde(default)]
    pub total_versions: Option<u32>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

/// Entry of `GET /api/chartrepo/{project}/charts/{chart}`.
#[derive(Deserialize, Debug, Clone)]
pub struct ChartVersionSummary {
    pub version: String,
    #[serde(default)]
    pub labels: Option<Vec<Label>>,
}

impl ChartVersionSummary {
    pub fn label_names(&self) -> Vec<String> {
        self.labels
            .iter()
            .flatten()
            .map(|label| label.name.clone())
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Label {
    pub name: String,
}

/// Body of `GET /api/chartrepo/{project}/charts/{chart}/{version}`.
#[derive(Deserialize, Debug, Clone)]
pub struct ChartVersionDetail {
    #[serde(default)]
    pub metadata: Option<ChartVersionMetadata>,
}

impl ChartVersionDetail {
    /// The first advertised download URL, when it is non-empty.
    pub fn download_url(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .urls
            .first()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChartVersionMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_summary_labels() {
        let versions: Vec<ChartVersionSummary> = serde_json::from_str(
            r#"[
                {"name": "nginx", "version": "1.0.0", "labels": [{"id": 1, "name": "stable"}, {"id": 2, "name": "web"}]},
                {"name": "nginx", "version": "1.1.0", "labels": null},
                {"name": "nginx", "version": "1.2.0"}
            ]"#,
        )
        .unwrap();

        assert_eq!(versions[0].label_names(), vec!["stable", "web"]);
        assert!(versions[1].label_names().is_empty());
        assert!(versions[2].label_names().is_empty());
    }

    #[test]
    fn test_download_url() {
        let detail: ChartVersionDetail = serde_json::from_str(
            r#"{"metadata": {"name": "nginx", "version": "1.0.0", "urls": ["charts/nginx-1.0.0.tgz", "https://mirror/nginx-1.0.0.tgz"]}}"#,
        )
        .unwrap();
        assert_eq!(detail.download_url(), Some("charts/nginx-1.0.0.tgz"));

        for body in [
            r#"{}"#,
            r#"{"metadata": null}"#,
            r#"{"metadata": {"urls": []}}"#,
            r#"{"metadata": {"urls": ["", "https://mirror/nginx-1.0.0.tgz"]}}"#,
        ] {
            let detail: ChartVersionDetail = serde_json::from_str(body).unwrap();
            assert_eq!(detail.download_url(), None, "{}", body);
        }
    }
}
