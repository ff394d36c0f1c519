// src/deploy/client.rs

//! Minimal client for the engine's REST API.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::deploy::bpmn::ProcessDefinition;
use crate::errors::{BakerError, Result};

/// `deployment-source` sent with every deployment.
pub const DEPLOYMENT_SOURCE: &str = "cam-baker";

/// Response of `POST /deployment/create`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub id: String,
    #[serde(default)]
    pub definition_id: Option<String>,
    #[serde(default)]
    pub business_key: Option<String>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub ended: bool,
}

/// Activity instance tree of one process instance.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInstance {
    pub id: String,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub activity_name: Option<String>,
    #[serde(default)]
    pub child_activity_instances: Vec<ActivityInstance>,
}

/// Error body returned by the engine.
#[derive(Debug, Deserialize)]
struct RemoteError {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineClient {
    http: Client,
    base_url: String,
}

impl EngineClient {
    /// `server` is the engine address without the `/engine-rest` suffix.
    pub fn new(server: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: format!("{}/engine-rest", server.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Create a deployment holding the diagram and its resources.
    pub async fn deploy(&self, definition: &ProcessDefinition) -> Result<Deployment> {
        let form = deployment_form(definition);
        debug!(
            diagram = %definition.filename,
            resources = definition.resources.len(),
            "creating deployment"
        );

        let response = self
            .http
            .post(self.endpoint("deployment/create"))
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response, &definition.filename).await?;
        Ok(response.json().await?)
    }

    /// `POST /process-instance` with an optional filter body.
    pub async fn list_instances(&self, query: &Value) -> Result<Vec<ProcessInstance>> {
        let response = self
            .http
            .post(self.endpoint("process-instance"))
            .json(query)
            .send()
            .await?;
        json_body(response, "process-instance").await
    }

    pub async fn instance_activities(&self, instance_id: &str) -> Result<ActivityInstance> {
        let path = format!("process-instance/{instance_id}/activity-instances");
        let response = self.http.get(self.endpoint(&path)).send().await?;
        json_body(response, &path).await
    }

    /// `POST /migration/execute`; the engine answers without a body.
    pub async fn execute_migration(&self, plan: &Value) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("migration/execute"))
            .json(plan)
            .send()
            .await?;
        check_status(response, "migration/execute").await?;
        Ok(())
    }
}

fn deployment_form(definition: &ProcessDefinition) -> Form {
    let diagram = Part::bytes(definition.content.clone()).file_name(definition.filename.clone());

    let mut form = Form::new()
        .text("deployment-name", format!("{} auto-deploy", definition.filename))
        .text("deployment-source", DEPLOYMENT_SOURCE)
        .part("diagram", diagram);

    for resource in &definition.resources {
        let part = Part::bytes(resource.content.clone()).file_name(resource.name.clone());
        form = form.part(resource.name.clone(), part);
    }
    form
}

async fn json_body<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let response = check_status(response, what).await?;
    Ok(response.json().await?)
}

/// Turn a non-success response into a deploy error carrying the engine's
/// own message when it sent one.
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BakerError::deploy(what, format!("{status}: {}", remote_message(&body))))
}

/// Message of an engine error body, falling back to the raw body.
pub fn remote_message(body: &str) -> String {
    match serde_json::from_str::<RemoteError>(body) {
        Ok(RemoteError {
            message: Some(message),
            kind,
        }) => match kind {
            Some(kind) => format!("{kind}: {message}"),
            None => message,
        },
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().to_string(),
    }
}
