use serde::{Deserialize, Serialize};
use serde_json::Value;

// Health / catalog

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub tools_available: Option<u32>,
}

impl Health {
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "ok")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCatalog {
    pub tools: Vec<ToolInfo>,
    #[serde(default)]
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_queries: u64,
    #[serde(default)]
    pub papers_found: u64,
    #[serde(default)]
    pub code_snippets: u64,
    #[serde(default)]
    pub avg_response_time: f64,
    #[serde(default)]
    pub research_papers: Option<String>,
    #[serde(default)]
    pub datasets: Option<String>,
    #[serde(default)]
    pub models: Option<String>,
    #[serde(default)]
    pub universities: Option<String>,
    #[serde(default)]
    pub active_researchers: Option<String>,
}

// Chat

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub user_id: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<ChatTurn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            user_id: "guest".into(),
            query: query.into(),
            command: None,
            university: None,
            model_name: None,
            conversation_history: None,
            workspace_id: None,
            tool_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExport {
    pub exported_at: String,
    pub message_count: usize,
    #[serde(default)]
    pub messages: Vec<Value>,
}

// Auth

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: User,
}

// Workspaces

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workspace {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct WorkspaceList {
    pub workspaces: Vec<Workspace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub id: i64,
    pub workspace_id: i64,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub tool_type: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct MessageList {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub workspace_id: i64,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct MemoryList {
    pub memory: Vec<MemoryItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub workspace_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ResourceList {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Saved ideation result or experiment plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredItem {
    pub id: i64,
    pub workspace_id: i64,
    pub topic: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct StoredItems {
    pub items: Vec<StoredItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Deleted {
    #[serde(default)]
    pub deleted: bool,
}

// Ideation / experiment design

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeationRequest {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ideation {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub constraints: Option<String>,
    /// Ideas as produced by the model; each is usually an object with
    /// title/hypothesis/novelty/feasibility/risks/next_steps.
    #[serde(default)]
    pub ideas: Vec<Value>,
    /// Raw model output when it could not be parsed into ideas.
    #[serde(default)]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdeationResponse {
    pub topic: String,
    pub ideation: Ideation,
    #[serde(default)]
    pub saved: Option<StoredItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRequest {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExperimentDesign {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default)]
    pub plan: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExperimentResponse {
    pub topic: String,
    pub experiment: ExperimentDesign,
    #[serde(default)]
    pub saved: Option<StoredItem>,
}

// Research generation

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Paper {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResearchBundle {
    pub topic: String,
    #[serde(default)]
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub summaries: Value,
    #[serde(default)]
    pub mind_map: String,
    #[serde(default)]
    pub podcast_script: String,
    #[serde(default)]
    pub code_snippet: String,
    #[serde(default)]
    pub experiment_plan: String,
    #[serde(default)]
    pub writing_outline: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MindMap {
    pub topic: String,
    pub mermaid_code: String,
    #[serde(default)]
    pub papers_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PodcastScript {
    pub topic: String,
    pub script: String,
    #[serde(default)]
    pub papers_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Citations {
    pub topic: String,
    #[serde(default)]
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub summary_with_citations: String,
    #[serde(default)]
    pub bibtex_entries: Vec<String>,
    #[serde(default)]
    pub total_papers: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuickSearch {
    pub topic: String,
    /// Usually the domain-discovery tool's text, but not guaranteed to be a string.
    #[serde(default)]
    pub suggestions: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopularTopic {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct PopularTopics {
    pub topics: Vec<PopularTopic>,
}
