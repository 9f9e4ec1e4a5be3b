use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::types::*;
use crate::validate;

/// HTTP client for the PaperClip research backend.
///
/// Cheap to clone; clones share the connection pool and carry their own
/// copy of the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| ApiError::Invalid(format!("invalid base url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Invalid(format!("invalid base url '{base_url}'")));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paperclip-desk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base, token: None })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Invalid(format!("invalid base url '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.url(segments)?;
        debug!(%method, %url, "api request");
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let resp = req.send().await.map_err(|e| {
            warn!(error = %e, "api transport error");
            ApiError::from(e)
        })?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let err = ApiError::from_body(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "api error response");
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.send(self.request(Method::GET, segments)?).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> ApiResult<T> {
        self.send(self.request(Method::POST, segments)?.json(body)).await
    }

    async fn delete(&self, segments: &[&str]) -> ApiResult<()> {
        let _: Deleted = self.send(self.request(Method::DELETE, segments)?).await?;
        Ok(())
    }

    async fn post_topic<T: DeserializeOwned>(&self, path: &str, topic: &str) -> ApiResult<T> {
        let topic = validate::topic(topic)?;
        self.send(self.request(Method::POST, &[path])?.query(&[("topic", topic)])).await
    }

    // Service

    pub async fn health(&self) -> ApiResult<Health> {
        self.get(&["health"]).await
    }

    pub async fn tools(&self) -> ApiResult<ToolCatalog> {
        self.get(&["tools"]).await
    }

    pub async fn stats(&self) -> ApiResult<Stats> {
        self.get(&["stats"]).await
    }

    // Chat

    /// Sends a chat query or tool command and returns the assistant's text.
    pub async fn query(&self, req: &QueryRequest) -> ApiResult<String> {
        let query = validate::required("query", &req.query)?;
        let req = QueryRequest { query, ..req.clone() };
        let resp: QueryResponse = self.post(&["query"], &req).await?;
        Ok(resp.response)
    }

    pub async fn export_chat(&self, turns: &[ChatTurn]) -> ApiResult<ChatExport> {
        self.post(&["export-chat"], turns).await
    }

    // Auth

    pub async fn register(&self, email: &str, password: &str, name: Option<&str>) -> ApiResult<AuthResponse> {
        let email = validate::required("email", email)?;
        let password = validate::required("password", password)?;
        let name = name.and_then(validate::optional);
        self.post(&["auth", "register"], &json!({ "email": email, "password": password, "name": name }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let email = validate::required("email", email)?;
        let password = validate::required("password", password)?;
        self.post(&["auth", "login"], &json!({ "email": email, "password": password })).await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.get(&["auth", "me"]).await
    }

    // Workspaces

    pub async fn workspaces(&self) -> ApiResult<Vec<Workspace>> {
        let list: WorkspaceList = self.get(&["workspaces"]).await?;
        Ok(list.workspaces)
    }

    pub async fn create_workspace(&self, name: &str, description: Option<&str>) -> ApiResult<Workspace> {
        let name = validate::required("workspace name", name)?;
        let description = description.and_then(validate::optional);
        self.post(&["workspaces"], &json!({ "name": name, "description": description })).await
    }

    pub async fn workspace(&self, id: i64) -> ApiResult<Workspace> {
        self.get(&["workspaces", &id.to_string()]).await
    }

    pub async fn delete_workspace(&self, id: i64) -> ApiResult<()> {
        self.delete(&["workspaces", &id.to_string()]).await
    }

    pub async fn messages(&self, workspace: i64) -> ApiResult<Vec<Message>> {
        let list: MessageList = self.get(&["workspaces", &workspace.to_string(), "messages"]).await?;
        Ok(list.messages)
    }

    pub async fn add_message(&self, workspace: i64, role: &str, content: &str) -> ApiResult<Message> {
        let role = validate::role(role)?;
        let content = validate::required("content", content)?;
        self.post(
            &["workspaces", &workspace.to_string(), "messages"],
            &json!({ "role": role, "content": content }),
        )
        .await
    }

    pub async fn memory(&self, workspace: i64) -> ApiResult<Vec<MemoryItem>> {
        let list: MemoryList = self.get(&["workspaces", &workspace.to_string(), "memory"]).await?;
        Ok(list.memory)
    }

    pub async fn add_memory(&self, workspace: i64, key: &str, value: &str) -> ApiResult<MemoryItem> {
        let key = validate::required("memory key", key)?;
        let value = validate::required("memory value", value)?;
        self.post(&["workspaces", &workspace.to_string(), "memory"], &json!({ "key": key, "value": value }))
            .await
    }

    pub async fn delete_memory(&self, workspace: i64, key: &str) -> ApiResult<()> {
        self.delete(&["workspaces", &workspace.to_string(), "memory", key]).await
    }

    pub async fn ideation_items(&self, workspace: i64) -> ApiResult<Vec<StoredItem>> {
        let list: StoredItems = self.get(&["workspaces", &workspace.to_string(), "ideation"]).await?;
        Ok(list.items)
    }

    pub async fn delete_ideation_item(&self, workspace: i64, item: i64) -> ApiResult<()> {
        self.delete(&["workspaces", &workspace.to_string(), "ideation", &item.to_string()]).await
    }

    pub async fn experiment_plans(&self, workspace: i64) -> ApiResult<Vec<StoredItem>> {
        let list: StoredItems = self.get(&["workspaces", &workspace.to_string(), "experiments"]).await?;
        Ok(list.items)
    }

    pub async fn delete_experiment_plan(&self, workspace: i64, plan: i64) -> ApiResult<()> {
        self.delete(&["workspaces", &workspace.to_string(), "experiments", &plan.to_string()]).await
    }

    pub async fn resources(&self, workspace: i64) -> ApiResult<Vec<Resource>> {
        let list: ResourceList = self.get(&["workspaces", &workspace.to_string(), "resources"]).await?;
        Ok(list.resources)
    }

    pub async fn add_resource(&self, workspace: i64, resource: &NewResource) -> ApiResult<Resource> {
        let resource = NewResource {
            kind: validate::required("resource type", &resource.kind)?.to_lowercase(),
            title: validate::required("resource title", &resource.title)?,
            content: validate::required("resource content", &resource.content)?,
            metadata: resource.metadata.clone(),
        };
        self.post(&["workspaces", &workspace.to_string(), "resources"], &resource).await
    }

    // Ideation / experiment design

    pub async fn ideation(&self, req: &IdeationRequest) -> ApiResult<IdeationResponse> {
        let topic = validate::required("topic", &req.topic)?;
        self.post(&["ideation"], &IdeationRequest { topic, ..req.clone() }).await
    }

    pub async fn experiment_design(&self, req: &ExperimentRequest) -> ApiResult<ExperimentResponse> {
        let topic = validate::required("topic", &req.topic)?;
        self.post(&["experiment-design"], &ExperimentRequest { topic, ..req.clone() }).await
    }

    // Research generation

    pub async fn quick_search(&self, topic: &str) -> ApiResult<QuickSearch> {
        let topic = validate::topic(topic)?;
        self.send(self.request(Method::GET, &["quick-search"])?.query(&[("q", topic)])).await
    }

    pub async fn popular_topics(&self) -> ApiResult<Vec<PopularTopic>> {
        let list: PopularTopics = self.get(&["popular-topics"]).await?;
        Ok(list.topics)
    }

    pub async fn research_suite(&self, topic: &str) -> ApiResult<ResearchBundle> {
        self.post_topic("research-suite", topic).await
    }

    pub async fn mindmap(&self, topic: &str) -> ApiResult<MindMap> {
        self.post_topic("mindmap", topic).await
    }

    pub async fn podcast(&self, topic: &str) -> ApiResult<PodcastScript> {
        self.post_topic("podcast", topic).await
    }

    pub async fn citations(&self, topic: &str) -> ApiResult<Citations> {
        self.post_topic("citations", topic).await
    }
}
