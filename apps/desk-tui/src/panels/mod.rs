//! Window contents. Each panel owns its own input, loading and error state;
//! the desktop only routes keys, clicks and replies to the right one.

mod account;
mod chat;
mod experiment;
mod ideation;
mod research;
mod stats;
mod tool;
mod tools;
pub mod widgets;
mod workspaces;

use std::time::Instant;

use crossterm::event::KeyEvent;
use paperclip_api::{AuthResponse, ChatExport};
use paperclip_wm::PanelKind;
use ratatui::prelude::*;

use crate::events::{Ctx, Reply, Slot};

pub use account::AccountPanel;
pub use chat::ChatPanel;
pub use experiment::ExperimentPanel;
pub use ideation::IdeationPanel;
pub use research::ResearchPanel;
pub use stats::StatsPanel;
pub use tool::ToolPanel;
pub use tools::ToolsPanel;
pub use workspaces::WorkspacesPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind { Info, Success, Warn, Error }

/// What a panel asks the desktop to do after handling an event.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    None,
    Open(PanelKind),
    SignedIn(AuthResponse),
    Logout,
    UseWorkspace(Option<(i64, String)>),
    SaveExport(ChatExport),
    Toast(ToastKind, String),
}

pub enum Panel {
    Chat(ChatPanel),
    Research(ResearchPanel),
    Tools(ToolsPanel),
    Tool(ToolPanel),
    Workspaces(WorkspacesPanel),
    Stats(StatsPanel),
    Ideation(IdeationPanel),
    Experiment(ExperimentPanel),
    Account(AccountPanel),
}

macro_rules! each_panel {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Panel::Chat($p) => $body,
            Panel::Research($p) => $body,
            Panel::Tools($p) => $body,
            Panel::Tool($p) => $body,
            Panel::Workspaces($p) => $body,
            Panel::Stats($p) => $body,
            Panel::Ideation($p) => $body,
            Panel::Experiment($p) => $body,
            Panel::Account($p) => $body,
        }
    };
}

impl Panel {
    pub fn for_kind(kind: &PanelKind) -> Self {
        match kind {
            PanelKind::Chat => Panel::Chat(ChatPanel::default()),
            PanelKind::Research => Panel::Research(ResearchPanel::default()),
            PanelKind::Tools => Panel::Tools(ToolsPanel::default()),
            PanelKind::Tool(tool) => Panel::Tool(ToolPanel::new(tool.clone())),
            PanelKind::Workspaces => Panel::Workspaces(WorkspacesPanel::default()),
            PanelKind::Stats => Panel::Stats(StatsPanel::default()),
            PanelKind::Ideation => Panel::Ideation(IdeationPanel::default()),
            PanelKind::Experiment => Panel::Experiment(ExperimentPanel::default()),
            PanelKind::Account => Panel::Account(AccountPanel::default()),
        }
    }

    /// Called once right after the window is created.
    pub fn mount(&mut self, ctx: &Ctx) {
        match self {
            Panel::Chat(p) => p.mount(ctx),
            Panel::Research(p) => p.mount(ctx),
            Panel::Tools(p) => p.mount(ctx),
            Panel::Workspaces(p) => p.mount(ctx),
            Panel::Stats(p) => p.mount(ctx, Instant::now()),
            Panel::Account(p) => p.mount(ctx),
            Panel::Tool(_) | Panel::Ideation(_) | Panel::Experiment(_) => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        each_panel!(self, p => p.on_key(key, ctx))
    }

    /// Left click inside the body; `row` is relative to the body's top edge.
    pub fn on_click(&mut self, row: u16, ctx: &Ctx) -> PanelAction {
        match self {
            Panel::Tools(p) => p.on_click(row),
            Panel::Research(p) => {
                p.on_click(row);
                PanelAction::None
            }
            Panel::Workspaces(p) => p.on_click(row, ctx),
            _ => PanelAction::None,
        }
    }

    pub fn on_scroll(&mut self, up: bool) {
        each_panel!(self, p => p.on_scroll(up))
    }

    /// Routes a reply whose ticket the caller has not checked yet.
    pub fn apply(&mut self, slot: Slot, ticket: u64, reply: Reply, ctx: &Ctx) -> PanelAction {
        each_panel!(self, p => {
            if !p.inflight.accept(slot, ticket) {
                return PanelAction::None;
            }
            p.apply(slot, reply, ctx)
        })
    }

    /// True while any request issued by this panel is unanswered.
    pub fn busy(&self) -> bool {
        each_panel!(self, p => p.inflight.any_pending())
    }

    pub fn tick(&mut self, now: Instant, ctx: &Ctx) {
        if let Panel::Stats(p) = self {
            p.tick(now, ctx);
        }
    }

    /// Sign-in state changed; `ctx.user` holds the new value.
    pub fn auth_changed(&mut self, ctx: &Ctx) {
        match self {
            Panel::Workspaces(p) => p.auth_changed(ctx),
            Panel::Account(p) => p.auth_changed(ctx),
            _ => {}
        }
    }

    pub fn workspace_changed(&mut self, ctx: &Ctx) {
        match self {
            Panel::Chat(p) => p.workspace_changed(ctx),
            Panel::Workspaces(p) => p.workspace_changed(ctx),
            _ => {}
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        each_panel!(self, p => p.draw(f, area, focused))
    }
}

#[cfg(test)]
pub(crate) mod harness {
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    use paperclip_api::{ApiClient, User};
    use paperclip_wm::PanelKind;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

    use crate::events::{Completion, Ctx};

    /// Owns what a [`Ctx`] borrows. Requests go to a closed local port.
    pub struct Harness {
        pub api: ApiClient,
        pub user: Option<User>,
        pub workspace: Option<(i64, String)>,
        pub tx: UnboundedSender<Completion>,
        pub rx: UnboundedReceiver<Completion>,
        pub tickets: AtomicU64,
    }

    impl Harness {
        pub fn new() -> Self {
            let (tx, rx) = unbounded_channel();
            Self {
                api: ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap(),
                user: None,
                workspace: None,
                tx,
                rx,
                tickets: AtomicU64::new(0),
            }
        }

        pub fn signed_in(mut self) -> Self {
            self.user = Some(User { id: 1, email: "ada@example.org".into(), name: Some("Ada".into()) });
            self
        }

        pub fn with_workspace(mut self, id: i64, name: &str) -> Self {
            self.workspace = Some((id, name.into()));
            self
        }

        pub fn ctx(&self, kind: PanelKind) -> Ctx<'_> {
            Ctx::new(
                kind,
                &self.api,
                self.user.as_ref(),
                self.workspace.as_ref(),
                Duration::from_secs(10),
                &self.tx,
                &self.tickets,
            )
        }
    }
}
