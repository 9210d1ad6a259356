//! GitHub REST adapter for listing and (un)archiving repositories.
//!
//! The [`RepositorySource`] and [`RepositoryMutator`] traits decouple the
//! transition engine from the GitHub backend. Tests use scripted fakes from
//! `test_support` or a `wiremock` server in place of the real API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::core::types::RepositoryRecord;

/// Only the first page is consumed.
pub const PAGE_SIZE: u32 = 100;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Errors from a single GitHub API call.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// Transport failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the API.
        message: String,
    },

    /// The token cannot be sent as a header value.
    #[error("invalid access token: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),

    /// The configured API URL cannot take path segments.
    #[error("API URL cannot be a base: {0}")]
    BaseUrl(String),
}

/// Lists the repositories of the configured account.
#[async_trait]
pub trait RepositorySource {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRecord>, GitHubError>;
}

/// Sets the archived flag of a single repository.
#[async_trait]
pub trait RepositoryMutator {
    async fn set_archived(&self, name: &str, archived: bool) -> Result<(), GitHubError>;
}

/// Repository item as returned by `GET /users/{user}/repos`.
#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    pushed_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    archived: bool,
    html_url: String,
}

impl ApiRepository {
    /// Empty repositories report `pushed_at: null`; their creation time stands in.
    fn into_record(self) -> Option<RepositoryRecord> {
        let last_pushed_at = self.pushed_at.or(self.created_at)?;
        Some(RepositoryRecord {
            name: self.name,
            last_pushed_at,
            is_archived: self.archived,
            url: self.html_url,
        })
    }
}

/// Authenticated client for one GitHub account.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    username: String,
}

impl GitHubClient {
    pub fn new(api_url: Url, username: &str, token: &str) -> Result<Self, GitHubError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("archiver/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url,
            username: username.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GitHubError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GitHubError::BaseUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    #[instrument(skip(self), fields(username = %self.username))]
    async fn fetch_repositories(&self) -> Result<Vec<RepositoryRecord>, GitHubError> {
        let mut url = self.endpoint(&["users", self.username.as_str(), "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string());

        let resp = self.http.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        let items: Vec<ApiRepository> = resp.json().await?;

        let fetched = items.len();
        let records: Vec<RepositoryRecord> = items
            .into_iter()
            .filter_map(|item| {
                let name = item.name.clone();
                let record = item.into_record();
                if record.is_none() {
                    warn!(repo = %name, "repository has no push or creation time, skipping");
                }
                record
            })
            .collect();
        debug!(fetched, usable = records.len(), "repositories listed");
        Ok(records)
    }

    #[instrument(skip(self), fields(username = %self.username))]
    async fn patch_archived(&self, name: &str, archived: bool) -> Result<(), GitHubError> {
        let url = self.endpoint(&["repos", self.username.as_str(), name])?;
        let resp = self
            .http
            .patch(url)
            .json(&serde_json::json!({ "archived": archived }))
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        info!(repo = name, archived, status = resp.status().as_u16(), "archive flag updated");
        Ok(())
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRecord>, GitHubError> {
        self.fetch_repositories().await
    }
}

#[async_trait]
impl RepositoryMutator for GitHubClient {
    async fn set_archived(&self, name: &str, archived: bool) -> Result<(), GitHubError> {
        self.patch_archived(name, archived).await
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(GitHubError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GitHubClient {
        let api_url = Url::parse(&server.uri()).unwrap();
        GitHubClient::new(api_url, "octo", "t0ken").unwrap()
    }

    #[tokio::test]
    async fn lists_first_page_with_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octo/repos"))
            .and(query_param("per_page", "100"))
            .and(header("authorization", "Bearer t0ken"))
            .and(header("accept", GITHUB_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "name": "alpha",
                    "pushed_at": "2024-01-02T03:04:05Z",
                    "created_at": "2020-01-01T00:00:00Z",
                    "archived": false,
                    "html_url": "https://github.com/octo/alpha",
                    "private": false
                },
                {
                    "name": "empty",
                    "pushed_at": null,
                    "created_at": "2023-05-06T00:00:00Z",
                    "archived": true,
                    "html_url": "https://github.com/octo/empty"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let repos = client(&server).list_repositories().await.unwrap();

        assert_eq!(
            repos,
            vec![
                RepositoryRecord {
                    name: "alpha".to_string(),
                    last_pushed_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
                    is_archived: false,
                    url: "https://github.com/octo/alpha".to_string(),
                },
                RepositoryRecord {
                    name: "empty".to_string(),
                    last_pushed_at: Utc.with_ymd_and_hms(2023, 5, 6, 0, 0, 0).unwrap(),
                    is_archived: true,
                    url: "https://github.com/octo/empty".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn list_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octo/repos"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = client(&server).list_repositories().await.unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: 401, .. }));
        assert!(err.to_string().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn set_archived_patches_flag() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/octo/alpha"))
            .and(body_json(serde_json::json!({ "archived": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).set_archived("alpha", true).await.unwrap();
    }

    #[tokio::test]
    async fn set_archived_maps_forbidden_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/octo/alpha"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client(&server).set_archived("alpha", false).await.unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: 403, .. }));
    }

    #[test]
    fn endpoint_keeps_enterprise_path_prefix() {
        let api_url = Url::parse("https://ghe.example.com/api/v3/").unwrap();
        let client = GitHubClient::new(api_url, "octo", "t").unwrap();
        let url = client.endpoint(&["repos", "octo", "alpha"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/octo/alpha");
    }

    #[test]
    fn record_without_any_timestamp_is_dropped() {
        let item = ApiRepository {
            name: "ghost".to_string(),
            pushed_at: None,
            created_at: None,
            archived: false,
            html_url: "https://github.com/octo/ghost".to_string(),
        };
        assert!(item.into_record().is_none());
    }
}
