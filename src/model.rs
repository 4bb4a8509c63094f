use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque key/value metadata attached to a project.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Credentials sent as HTTP basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The remote service an adapter talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub name: String,
    url: String,
    pub insecure: bool,
    pub credential: Option<Credential>,
}

impl Registry {
    pub fn new(name: impl Into<String>, url: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            url: url.as_ref().trim_end_matches('/').to_string(),
            insecure: false,
            credential: None,
        }
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Base URL without a trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Chart,
    Image,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chart => f.write_str("chart"),
            Self::Image => f.write_str("image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A chart addressed by its `<project>/<chart>` name.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub name: String,
    pub metadata: Metadata,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
        }
    }
}

/// One chart version and the names of its labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub tag: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMetadata {
    pub repository: Repository,
    pub artifact: Artifact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub resource_type: ResourceType,
    pub registry: Arc<Registry>,
    pub metadata: ResourceMetadata,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.metadata.repository.name, self.metadata.artifact.tag
        )
    }
}
