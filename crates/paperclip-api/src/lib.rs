//! Typed client for the PaperClip research backend.

mod client;
mod error;
mod types;
pub mod validate;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    AuthResponse, ChatExport, ChatTurn, Citations, ExperimentDesign, ExperimentRequest, ExperimentResponse, Health,
    Ideation, IdeationRequest, IdeationResponse, MemoryItem, Message, MindMap, NewResource, Paper, PodcastScript,
    PopularTopic, QueryRequest, QuickSearch, ResearchBundle, Resource, Stats, StoredItem, ToolCatalog, ToolInfo, User,
    Workspace,
};
