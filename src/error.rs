use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitLab API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedShape { endpoint: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Only {found} of {wanted} distinct refs found after {pages} page(s)")]
    InsufficientData {
        found: usize,
        wanted: usize,
        pages: usize,
    },
}

/// How a failed request is reported to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream answered with something other than the expected records.
    UpstreamShape,
    /// Everything else: network, upstream 5xx, templates, pagination budget.
    Internal,
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedShape { .. } => ErrorKind::UpstreamShape,
            _ => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_shape_is_the_only_upstream_shape_kind() {
        let shape = DashboardError::UnexpectedShape {
            endpoint: "pipelines".to_string(),
            message: "invalid type: map, expected a sequence".to_string(),
        };
        assert_eq!(shape.kind(), ErrorKind::UpstreamShape);

        let others = [
            DashboardError::Config("bad".to_string()),
            DashboardError::Api {
                status: 502,
                message: "Bad Gateway".to_string(),
            },
            DashboardError::Template {
                name: "main".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
            DashboardError::InsufficientData {
                found: 1,
                wanted: 3,
                pages: 2,
            },
        ];
        for err in &others {
            assert_eq!(err.kind(), ErrorKind::Internal, "{err}");
        }
    }

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = DashboardError::InsufficientData {
            found: 2,
            wanted: 5,
            pages: 50,
        };
        assert_eq!(
            err.to_string(),
            "Only 2 of 5 distinct refs found after 50 page(s)"
        );
    }
}
