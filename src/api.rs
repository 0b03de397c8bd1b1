use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::http::builder::RequestOptions;
use crate::http::client::ApiClient;
use crate::http::executor::execute;

/// Documents served by the Rover server under `/api/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Plan,
    Rso,
    Map,
    Graph,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Resource::Plan, Resource::Rso, Resource::Map, Resource::Graph];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Plan => "plan",
            Resource::Rso => "rso",
            Resource::Map => "map",
            Resource::Graph => "graph",
        }
    }

    pub fn path(&self) -> String {
        format!("/api/{}", self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::UnknownResource(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub alive: bool,
}

pub async fn health(client: &ApiClient) -> Result<Health, AppError> {
    execute(client, &RequestOptions::get("/health")).await?.json()
}

pub async fn fetch_resource(
    client: &ApiClient,
    resource: Resource,
) -> Result<serde_json::Value, AppError> {
    tracing::debug!(%resource, "fetching rover resource");
    execute(client, &RequestOptions::get(resource.path())).await?.json()
}
