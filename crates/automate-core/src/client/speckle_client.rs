//! HTTP implementation of [`SpeckleApi`]

use super::api::{ActiveUser, ObjectBundle, RunStatusReport, SpeckleApi, Version};
use super::graphql::{
    ACTIVE_USER_QUERY, ActiveUserData, GraphQlResponse, ProjectVersionData, RUN_STATUS_MUTATION,
    VERSION_QUERY,
};
use super::transport::{closure_ids, parse_object_lines};
use crate::config::RunnerConfig;
use crate::error::{AutomateError, AutomateResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{debug, instrument};
use url::Url;

/// Client for one Speckle server, authenticated with a personal token
#[derive(Clone)]
pub struct SpeckleClient {
    http: Client,
    server_url: Url,
    token: String,
    object_batch_size: usize,
    request_timeout_secs: u64,
}

impl std::fmt::Debug for SpeckleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeckleClient")
            .field("server_url", &self.server_url.as_str())
            .field("object_batch_size", &self.object_batch_size)
            .finish_non_exhaustive()
    }
}

impl SpeckleClient {
    /// Create a client with the timeouts of `config`.
    ///
    /// `server_url` must end with `/` so endpoint paths join below it.
    pub fn new(server_url: Url, token: impl Into<String>, config: &RunnerConfig) -> AutomateResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(concat!("speckle-automate-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AutomateError::config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self::with_http_client(server_url, token, http, config))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_http_client(
        server_url: Url,
        token: impl Into<String>,
        http: Client,
        config: &RunnerConfig,
    ) -> Self {
        Self {
            http,
            server_url,
            token: token.into(),
            object_batch_size: config.object_batch_size,
            request_timeout_secs: config.request_timeout_secs,
        }
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> AutomateResult<Url> {
        Ok(self.server_url.join(path)?)
    }

    async fn send(&self, request: RequestBuilder) -> AutomateResult<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(response).await
    }

    fn transport_error(&self, error: reqwest::Error) -> AutomateError {
        if error.is_timeout() {
            AutomateError::timeout(self.request_timeout_secs)
        } else {
            error.into()
        }
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> AutomateResult<T> {
        let url = self.endpoint("graphql")?;
        let body = json!({ "query": query, "variables": variables });
        let response = self.send(self.http.post(url).json(&body)).await?;
        let envelope: GraphQlResponse<T> = response.json().await.map_err(|e| {
            AutomateError::json_with_context(e.to_string(), format!("decoding {} response", operation))
        })?;
        envelope.into_data(operation)
    }

    async fn fetch_children(
        &self,
        project_id: &str,
        ids: &[String],
    ) -> AutomateResult<HashMap<String, Value>> {
        let url = self.endpoint(&format!("api/getobjects/{}", project_id))?;
        let mut children = HashMap::with_capacity(ids.len());
        for batch in ids.chunks(self.object_batch_size.max(1)) {
            // The endpoint expects the id list itself encoded as a JSON string
            let body = json!({ "objects": serde_json::to_string(batch)? });
            let response = self.send(self.http.post(url.clone()).json(&body)).await?;
            let text = response.text().await.map_err(|e| self.transport_error(e))?;
            children.extend(parse_object_lines(&text)?);
            debug!("fetched {} of {} child objects", children.len(), ids.len());
        }
        Ok(children)
    }
}

async fn check_status(response: Response) -> AutomateResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = body.chars().take(200).collect::<String>();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AutomateError::auth(format!(
            "server rejected the token ({}): {}",
            status, detail
        )),
        StatusCode::NOT_FOUND => AutomateError::not_found_resource(format!("{} not found", url), "resource"),
        _ => AutomateError::http_status(format!("server returned {}: {}", status, detail), url, status.as_u16()),
    })
}

#[async_trait]
impl SpeckleApi for SpeckleClient {
    #[instrument(skip(self))]
    async fn active_user(&self) -> AutomateResult<ActiveUser> {
        let data: ActiveUserData = self
            .graphql("active user query", ACTIVE_USER_QUERY, json!({}))
            .await?;
        data.active_user
            .ok_or_else(|| AutomateError::auth("token is not associated with an active user"))
    }

    #[instrument(skip(self))]
    async fn get_version(&self, project_id: &str, version_id: &str) -> AutomateResult<Version> {
        let data: ProjectVersionData = self
            .graphql(
                "version query",
                VERSION_QUERY,
                json!({ "projectId": project_id, "versionId": version_id }),
            )
            .await?;
        let project = data.project.ok_or_else(|| {
            AutomateError::not_found_resource(format!("project {} not found", project_id), "project")
        })?;
        project.version.ok_or_else(|| {
            AutomateError::not_found_resource(
                format!("version {} not found in project {}", version_id, project_id),
                "version",
            )
        })
    }

    #[instrument(skip(self))]
    async fn download_objects(&self, project_id: &str, object_id: &str) -> AutomateResult<ObjectBundle> {
        let url = self.endpoint(&format!("objects/{}/{}/single", project_id, object_id))?;
        let response = self.send(self.http.get(url)).await?;
        let root: Value = response.json().await.map_err(|e| {
            AutomateError::json_with_context(e.to_string(), format!("decoding object {}", object_id))
        })?;

        let ids = closure_ids(&root);
        let children = if ids.is_empty() {
            HashMap::new()
        } else {
            self.fetch_children(project_id, &ids).await?
        };
        Ok(ObjectBundle { root, children })
    }

    #[instrument(skip(self, report), fields(status = %report.run_status))]
    async fn report_run_status(&self, report: &RunStatusReport) -> AutomateResult<()> {
        let _: Value = self
            .graphql(
                "run status report",
                RUN_STATUS_MUTATION,
                serde_json::to_value(report)?,
            )
            .await?;
        Ok(())
    }
}
