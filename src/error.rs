use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the chart adapters and their transport.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid chart name format: {0}")]
    InvalidNameFormat(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote answered with a non-success status. `body` is the raw
    /// response text, kept so the remote's own error payload reaches the caller.
    #[error("{url} returned {status}: {body}")]
    Remote {
        url: String,
        status: u16,
        body: String,
    },

    /// The version exists but the remote did not report where to fetch it from.
    #[error("cannot get the download url for chart {name}:{version}")]
    NoDownloadUrl { name: String, version: String },

    #[error("invalid filter pattern {pattern:?}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{url} is paginated ({total_pages} pages), only single page listings are supported")]
    Paginated { url: String, total_pages: u32 },

    #[error("chart catalog is unhealthy, status {0}")]
    Unhealthy(u16),
}

impl Error {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// HTTP status reported by the remote, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Unhealthy(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let conflict = Error::Remote {
            url: "http://harbor/api/chartrepo/library/charts".to_string(),
            status: 409,
            body: "chart already exists".to_string(),
        };
        assert_eq!(conflict.status(), Some(409));
        assert!(!conflict.is_not_found());
        assert_eq!(
            conflict.to_string(),
            "http://harbor/api/chartrepo/library/charts returned 409: chart already exists"
        );

        let missing = Error::Remote {
            url: "http://harbor".to_string(),
            status: 404,
            body: String::new(),
        };
        assert!(missing.is_not_found());
        assert!(Error::NotFound("nginx".to_string()).is_not_found());
        assert_eq!(Error::InvalidNameFormat("nginx".to_string()).status(), None);
    }
}
