use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::json;

use crate::error::Result;
use crate::host::{Identity, RemoteHost, RemoteRepo};

const API_BASE: &str = "https://gitee.com/api/v5";

/// Gitee REST v5 client. Authentication is an `access_token` query
/// parameter rather than an Authorization header.
pub struct GiteeClient {
    http: Client,
    base: String,
    token: Option<String>,
}

impl GiteeClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE)
    }

    /// Client against a non-default API base, used by tests with a mock
    /// server.
    pub fn with_base_url(base: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("git-ship"));

        let http = Client::builder().default_headers(headers).build()?;
        Ok(GiteeClient {
            http,
            base: base.into(),
            token: None,
        })
    }

    fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .query(&[("access_token", self.token())])
            .send()?;

        if resp.status().is_success() {
            Ok(Some(resp.json()?))
        } else {
            Ok(None)
        }
    }

    fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Option<T>> {
        let resp = self
            .http
            .post(format!("{}{}", self.base, path))
            .query(&[("access_token", self.token())])
            .json(&body)
            .send()?;

        if resp.status().is_success() {
            Ok(Some(resp.json()?))
        } else {
            Ok(None)
        }
    }
}

impl RemoteHost for GiteeClient {
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
        self.post_json("/user/repos", json!({ "name": name }))
    }

    fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepo>> {
        self.post_json(&format!("/orgs/{}/repos", org), json!({ "name": name }))
    }

    fn remote_url(&self, login: &str, name: &str) -> String {
        format!("git@gitee.com:{}/{}.git", login, name)
    }

    fn token_help_url(&self) -> &str {
        "https://gitee.com/profile/personal_access_tokens"
    }

    fn ssh_keys_url(&self) -> &str {
        "https://gitee.com/profile/sshkeys"
    }

    fn ssh_keys_help_url(&self) -> &str {
        "https://gitee.com/help/articles/4181"
    }
}
