//! Cluster manager JSON API client.
//!
//! Provides both [`NodeLister`] and [`UserDirectory`] over a Jenkins-style
//! HTTP API:
//!
//! - `GET {base}/computer/api/json?tree=...` for the node list
//! - `GET {base}/user/{id}/api/json` for a single operator (404 = unknown)

use std::time::Duration;

use nodenag_core::config::ClusterConfig;
use nodenag_core::{Node, OfflineCause, Operator, OperatorId};
use reqwest::Url;
use serde::Deserialize;

use crate::cluster::{NodeLister, UserDirectory};
use crate::error::ClusterError;

const COMPUTER_TREE: &str =
    "computer[displayName,offline,offlineCauseReason,offlineCause[description]]";

/// Cause classes that record an operator-initiated disconnect.
const MANUAL_CAUSE_CLASSES: &[&str] = &["SimpleOfflineCause", "UserCause", "ByCLI"];

#[derive(Debug, Deserialize)]
struct ComputerSet {
    #[serde(default)]
    computer: Vec<ComputerJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputerJson {
    display_name: String,
    #[serde(default)]
    offline: bool,
    #[serde(default)]
    offline_cause_reason: Option<String>,
    #[serde(default)]
    offline_cause: Option<OfflineCauseJson>,
}

#[derive(Debug, Deserialize)]
struct OfflineCauseJson {
    #[serde(rename = "_class", default)]
    class: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserJson {
    id: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    property: Vec<UserPropertyJson>,
}

#[derive(Debug, Deserialize)]
struct UserPropertyJson {
    #[serde(default)]
    address: Option<String>,
}

fn is_manual_class(class: &str) -> bool {
    let simple_name = class.rsplit(|c: char| c == '.' || c == '$').next().unwrap_or(class);
    MANUAL_CAUSE_CLASSES.contains(&simple_name)
}

impl ComputerJson {
    fn into_node(self) -> Node {
        let cause = self.offline_cause.map(|cause| match cause.class {
            Some(class) if is_manual_class(&class) => OfflineCause::Manual {
                reason: cause
                    .description
                    .or(self.offline_cause_reason)
                    .unwrap_or_default(),
            },
            Some(class) => OfflineCause::Automated {
                kind: class,
                description: cause.description.or(self.offline_cause_reason),
            },
            None => OfflineCause::Unknown,
        });

        Node {
            display_name: self.display_name,
            offline: self.offline,
            offline_cause: cause,
        }
    }
}

impl UserJson {
    fn into_operator(self) -> Operator {
        let email = self
            .property
            .into_iter()
            .filter_map(|p| p.address)
            .find(|addr| !addr.trim().is_empty());

        Operator {
            id: OperatorId::new(self.id),
            full_name: self.full_name,
            email,
        }
    }
}

/// HTTP client for the cluster manager API.
#[derive(Debug, Clone)]
pub struct ClusterApiClient {
    base: Url,
    client: reqwest::Client,
    credentials: Option<(String, String)>,
}

impl ClusterApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Option<(String, String)>,
    ) -> Result<Self, ClusterError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ClusterError::Config(format!("invalid cluster URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClusterError::Config(format!(
                "cluster URL '{base_url}' cannot be used as a base"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base,
            client,
            credentials,
        })
    }

    pub fn from_config(config: &ClusterConfig) -> Result<Self, ClusterError> {
        let credentials = match (&config.username, &config.api_token) {
            (Some(user), Some(token)) => Some((user.clone(), token.clone())),
            _ => None,
        };
        Self::new(&config.url, config.timeout(), credentials)
    }

    fn computers_url(&self) -> Result<Url, ClusterError> {
        let mut url = self
            .base
            .join("computer/api/json")
            .map_err(|e| ClusterError::Config(e.to_string()))?;
        url.query_pairs_mut().append_pair("tree", COMPUTER_TREE);
        Ok(url)
    }

    fn user_url(&self, id: &OperatorId) -> Result<Url, ClusterError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClusterError::Config("cluster URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["user", id.as_str(), "api", "json"]);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, ClusterError> {
        let mut request = self.client.get(url);
        if let Some((user, token)) = &self.credentials {
            request = request.basic_auth(user, Some(token));
        }
        Ok(request.send().await?)
    }

    async fn status_error(response: reqwest::Response) -> ClusterError {
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        ClusterError::Status { url, status, body }
    }
}

#[async_trait::async_trait]
impl NodeLister for ClusterApiClient {
    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        let response = self.get(self.computers_url()?).await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let set: ComputerSet = response.json().await?;
        let nodes: Vec<Node> = set.computer.into_iter().map(ComputerJson::into_node).collect();

        tracing::debug!(count = nodes.len(), "listed cluster nodes");
        Ok(nodes)
    }
}

#[async_trait::async_trait]
impl UserDirectory for ClusterApiClient {
    async fn resolve_user(
        &self,
        id: &OperatorId,
        create_if_missing: bool,
    ) -> Result<Option<Operator>, ClusterError> {
        if create_if_missing {
            tracing::warn!(operator = %id, "cluster directory is read-only, not creating user");
        }

        let response = self.get(self.user_url(id)?).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let user: UserJson = response.json().await?;
        Ok(Some(user.into_operator()))
    }
}
