use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::json;

use crate::error::{Result, ShipError};
use crate::host::{Identity, RemoteHost, RemoteRepo};

const API_BASE: &str = "https://api.github.com";

/// GitHub REST v3 client.
pub struct GithubClient {
    http: Client,
    base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE)
    }

    /// Client against a non-default API base, used by tests with a mock
    /// server.
    pub fn with_base_url(base: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("git-ship"));

        let http = Client::builder().default_headers(headers).build()?;
        Ok(GithubClient {
            http,
            base: base.into(),
            token: None,
        })
    }

    fn auth_header(&self) -> Result<HeaderValue> {
        let token = self.token.as_deref().unwrap_or_default();
        HeaderValue::from_str(&format!("token {}", token))
            .map_err(|e| ShipError::host(format!("invalid token value: {}", e)))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .header(AUTHORIZATION, self.auth_header()?)
            .send()?;

        if resp.status().is_success() {
            Ok(Some(resp.json()?))
        } else {
            Ok(None)
        }
    }
}

impl RemoteHost for GithubClient {
    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn get_user(&self) -> Result<Option<Identity>> {
        self.get_json("/user")
    }

    fn get_orgs(&self) -> Result<Vec<Identity>> {
        Ok(self.get_json("/user/orgs")?.unwrap_or_default())
    }

    fn get_repo(&self, login: &str, name: &str) -> Result<Option<RemoteRepo>> {
        self.get_json(&format!("/repos/{}/{}", login, name))
    }

    fn create_repo(&self, name: &str) -> Result<Option<RemoteRepo>> {
        let resp = self
            .http
            .post(format!("{}/user/repos", self.base))
            .header(AUTHORIZATION, self.auth_header()?)
            .json(&json!({ "name": name }))
            .send()?;

        if resp.status().is_success() {
            Ok(Some(resp.json()?))
        } else {
            Ok(None)
        }
    }

    fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepo>> {
        let resp = self
            .http
            .post(format!("{}/orgs/{}/repos", self.base, org))
            .header(AUTHORIZATION, self.auth_header()?)
            .json(&json!({ "name": name }))
            .send()?;

        if resp.status().is_success() {
            Ok(Some(resp.json()?))
        } else {
            Ok(None)
        }
    }

    fn remote_url(&self, login: &str, name: &str) -> String {
        format!("git@github.com:{}/{}.git", login, name)
    }

    fn token_help_url(&self) -> &str {
        "https://github.com/settings/tokens"
    }

    fn ssh_keys_url(&self) -> &str {
        "https://github.com/settings/keys"
    }

    fn ssh_keys_help_url(&self) -> &str {
        "https://docs.github.com/en/authentication/connecting-to-github-with-ssh"
    }
}
