//! Background requests and their completions.
//!
//! Panels never await. They hand a future to [`Ctx::spawn`], which tags the
//! eventual reply with the panel kind, a request slot and a fresh ticket and
//! sends it back to the UI loop. A reply is applied only if its ticket is
//! still the latest one the panel issued for that slot.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use paperclip_api::{
    ApiClient, ApiResult, AuthResponse, ChatExport, ExperimentResponse, Health, IdeationResponse, MemoryItem, Message,
    PopularTopic, Resource, Stats, StoredItem, ToolCatalog, User, Workspace,
};
use paperclip_wm::PanelKind;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Names one kind of request a panel can have in flight.
pub type Slot = &'static str;

#[derive(Debug)]
pub enum Reply {
    Text(ApiResult<String>),
    Export(ApiResult<ChatExport>),
    Messages(ApiResult<Vec<Message>>),
    Message(ApiResult<Message>),
    Tools(ApiResult<ToolCatalog>),
    Stats(ApiResult<Stats>),
    Health(ApiResult<Health>),
    Topics(ApiResult<Vec<PopularTopic>>),
    Workspaces(ApiResult<Vec<Workspace>>),
    Workspace(ApiResult<Workspace>),
    Memory(ApiResult<Vec<MemoryItem>>),
    MemoryItem(ApiResult<MemoryItem>),
    Resources(ApiResult<Vec<Resource>>),
    Resource(ApiResult<Resource>),
    Stored(ApiResult<Vec<StoredItem>>),
    Done(ApiResult<()>),
    Ideation(ApiResult<IdeationResponse>),
    Experiment(ApiResult<ExperimentResponse>),
    Auth(ApiResult<AuthResponse>),
}

#[derive(Debug)]
pub enum Completion {
    Panel { kind: PanelKind, slot: Slot, ticket: u64, reply: Reply },
    /// Result of validating a stored token on start. Applies only while the
    /// client still holds `token`.
    Session { token: String, result: ApiResult<User> },
}

/// Latest ticket per slot for one panel instance.
#[derive(Debug, Default)]
pub struct Inflight {
    latest: HashMap<Slot, u64>,
}

impl Inflight {
    fn issue(&mut self, slot: Slot, ticket: u64) {
        self.latest.insert(slot, ticket);
    }

    /// Consumes the ticket if it is the current one for `slot`.
    pub fn accept(&mut self, slot: Slot, ticket: u64) -> bool {
        if self.latest.get(slot) == Some(&ticket) {
            self.latest.remove(slot);
            true
        } else {
            debug!(slot, ticket, "stale reply discarded");
            false
        }
    }

    /// Abandons whatever is pending in `slot`; its reply will be discarded.
    pub fn forget(&mut self, slot: Slot) {
        if let Some(ticket) = self.latest.remove(slot) {
            debug!(slot, ticket, "pending reply abandoned");
        }
    }

    pub fn is_pending(&self, slot: Slot) -> bool {
        self.latest.contains_key(slot)
    }

    pub fn any_pending(&self) -> bool {
        !self.latest.is_empty()
    }
}

/// Everything a panel may use while handling input or a reply.
pub struct Ctx<'a> {
    pub api: &'a ApiClient,
    pub user: Option<&'a User>,
    /// Workspace chosen in the Workspaces window or via `/workspace`.
    pub workspace: Option<&'a (i64, String)>,
    pub stats_poll: Duration,
    kind: PanelKind,
    tx: &'a UnboundedSender<Completion>,
    tickets: &'a AtomicU64,
}

impl<'a> Ctx<'a> {
    pub fn new(
        kind: PanelKind,
        api: &'a ApiClient,
        user: Option<&'a User>,
        workspace: Option<&'a (i64, String)>,
        stats_poll: Duration,
        tx: &'a UnboundedSender<Completion>,
        tickets: &'a AtomicU64,
    ) -> Self {
        Self { api, user, workspace, stats_poll, kind, tx, tickets }
    }

    pub fn authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Selected workspace id, only while signed in.
    pub fn workspace_id(&self) -> Option<i64> {
        self.workspace.filter(|_| self.authenticated()).map(|(id, _)| *id)
    }

    pub fn spawn<F>(&self, inflight: &mut Inflight, slot: Slot, fut: F)
    where
        F: Future<Output = Reply> + Send + 'static,
    {
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        inflight.issue(slot, ticket);
        let tx = self.tx.clone();
        let kind = self.kind.clone();
        debug!(panel = %kind.slug(), slot, ticket, "request issued");
        tokio::spawn(async move {
            let reply = fut.await;
            let _ = tx.send(Completion::Panel { kind, slot, ticket, reply });
        });
    }
}
