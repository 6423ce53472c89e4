use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::auth::Token;
use crate::error::{DashboardError, Result};

pub(super) const JOBS_PER_PAGE: u32 = 40;

pub struct GitLabClient {
    client: Client,
    project_url: Url,
}

impl GitLabClient {
    pub fn new(
        base_url: &str,
        project_id: &str,
        token: &Token,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut token_value = HeaderValue::from_str(token.as_str())
            .map_err(|e| DashboardError::Config(format!("Invalid token: {e}")))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("private-token"), token_value);

        let mut builder = Client::builder()
            .user_agent(concat!("cidash/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base = Url::parse(base_url)
            .map_err(|e| DashboardError::Config(format!("Invalid base URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let project_url = base
            .join(&format!(
                "api/v4/projects/{}/",
                urlencoding::encode(project_id)
            ))
            .map_err(|e| DashboardError::Config(format!("Invalid project URL: {e}")))?;

        Ok(Self {
            client,
            project_url,
        })
    }

    /// Project-scoped endpoint URL, e.g. `pipelines` or `pipelines/7/jobs`.
    pub(super) fn endpoint(&self, path: &str) -> Result<Url> {
        self.project_url
            .join(path)
            .map_err(|e| DashboardError::Config(format!("Invalid endpoint '{path}': {e}")))
    }

    /// GET a URL and parse the body as JSON.
    ///
    /// Upstream 5xx answers are API errors. Any other status is parsed like a
    /// success, so error objects surface later as shape mismatches.
    pub(super) async fn get_json(&self, url: Url) -> Result<Value> {
        debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_server_error() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(DashboardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a collection endpoint and decode its records.
    pub(super) async fn get_records<T>(&self, url: Url, endpoint: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let value = self.get_json(url).await?;
        decode_records(value, endpoint)
    }
}

pub(super) fn decode_records<T>(value: Value, endpoint: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|e| DashboardError::UnexpectedShape {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::providers::gitlab::types::PipelineRecord;
    use serde_json::json;

    fn client(base_url: &str, project: &str) -> GitLabClient {
        GitLabClient::new(base_url, project, &Token::from("glpat-test"), None).unwrap()
    }

    #[test]
    fn builds_project_url_with_encoded_path() {
        let client = client("https://gitlab.example.com", "group/project");
        assert_eq!(
            client.endpoint("pipelines").unwrap().as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fproject/pipelines"
        );
    }

    #[test]
    fn keeps_base_path_of_relative_installs() {
        let client = client("https://example.com/gitlab", "42");
        assert_eq!(
            client.endpoint("jobs").unwrap().as_str(),
            "https://example.com/gitlab/api/v4/projects/42/jobs"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = GitLabClient::new("not a url", "42", &Token::from("t"), None);
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn rejects_token_with_newline() {
        let result = GitLabClient::new(
            "https://gitlab.com",
            "42",
            &Token::from("bad\ntoken"),
            None,
        );
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn error_object_is_a_shape_error() {
        let value = json!({"message": "401 Unauthorized"});
        let err = decode_records::<PipelineRecord>(value, "pipelines").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamShape);
    }

    #[tokio::test]
    async fn sends_private_token_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/42/jobs")
            .match_header("private-token", "glpat-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = client(&server.url(), "42");
        let value = client
            .get_json(client.endpoint("jobs").unwrap())
            .await
            .unwrap();

        assert_eq!(value, json!([]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_are_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v4/projects/42/jobs")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = client(&server.url(), "42");
        let err = client
            .get_json(client.endpoint("jobs").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::Api { status: 502, .. }));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn malformed_json_is_an_internal_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v4/projects/42/jobs")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client(&server.url(), "42");
        let err = client
            .get_json(client.endpoint("jobs").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
