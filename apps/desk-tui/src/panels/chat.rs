use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{ChatTurn, QueryRequest};
use ratatui::{prelude::*, widgets::*};
use tracing::info;

use super::widgets::{wrap_text_lines, Status, TextInput};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const SEND: Slot = "send";
const EXPORT: Slot = "export";
const HISTORY: Slot = "history";
const BIND: Slot = "bind";

/// Turns of prior conversation sent along with each query.
const HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Clear,
    Export,
    Workspace(Option<i64>),
    Tool(Option<String>),
    Help,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
    match head {
        "/clear" => Ok(Command::Clear),
        "/export" => Ok(Command::Export),
        "/help" => Ok(Command::Help),
        "/workspace" => match arg {
            None | Some("off") => Ok(Command::Workspace(None)),
            Some(id) => id.parse().map(|id| Command::Workspace(Some(id))).map_err(|_| format!("not a workspace id: {id}")),
        },
        "/tool" => Ok(Command::Tool(arg.map(str::to_string))),
        other => Err(format!("unknown command {other}; try /help")),
    }
}

#[derive(Default)]
pub struct ChatPanel {
    pub(super) inflight: Inflight,
    turns: Vec<ChatTurn>,
    input: TextInput,
    status: Status,
    /// Lines scrolled up from the bottom.
    scroll: u16,
    tool_type: Option<String>,
    workspace: Option<(i64, String)>,
}

impl ChatPanel {
    pub fn mount(&mut self, ctx: &Ctx) {
        self.workspace_changed(ctx);
    }

    /// Binds the transcript to the selected workspace and loads its history.
    /// Answers still owed to the previous workspace are discarded.
    pub fn workspace_changed(&mut self, ctx: &Ctx) {
        let next = ctx.workspace.filter(|_| ctx.authenticated()).cloned();
        if next == self.workspace {
            return;
        }
        for slot in [SEND, EXPORT, HISTORY] {
            self.inflight.forget(slot);
        }
        self.workspace = next;
        self.turns.clear();
        self.scroll = 0;
        if let Some((id, name)) = &self.workspace {
            let api = ctx.api.clone();
            let id = *id;
            self.status = Status::loading(format!("loading {name}"));
            ctx.spawn(&mut self.inflight, HISTORY, async move { Reply::Messages(api.messages(id).await) });
        } else {
            self.status = Status::Idle;
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        match key.code {
            KeyCode::Enter => self.submit(ctx),
            KeyCode::PageUp => {
                self.on_scroll(true);
                PanelAction::None
            }
            KeyCode::PageDown => {
                self.on_scroll(false);
                PanelAction::None
            }
            _ => {
                self.input.handle(key);
                PanelAction::None
            }
        }
    }

    pub fn on_scroll(&mut self, up: bool) {
        self.scroll = if up { self.scroll.saturating_add(3) } else { self.scroll.saturating_sub(3) };
    }

    fn submit(&mut self, ctx: &Ctx) -> PanelAction {
        if self.input.is_blank() {
            return PanelAction::None;
        }
        let text = self.input.take();
        if text.trim_start().starts_with('/') {
            return match parse_command(&text) {
                Ok(cmd) => self.run(cmd, ctx),
                Err(msg) => {
                    self.status = Status::Error(msg);
                    PanelAction::None
                }
            };
        }
        if self.inflight.is_pending(SEND) {
            self.input.set(text);
            return PanelAction::Toast(ToastKind::Warn, "Still waiting for the previous answer".into());
        }
        let mut req = QueryRequest::new(text.trim());
        let start = self.turns.len().saturating_sub(HISTORY_TURNS);
        if !self.turns.is_empty() {
            req.conversation_history = Some(self.turns[start..].to_vec());
        }
        req.tool_type = self.tool_type.clone();
        req.workspace_id = ctx.workspace_id();
        if let Some(user) = ctx.user {
            req.user_id = user.id.to_string();
        }
        self.turns.push(ChatTurn::user(text.trim()));
        self.scroll = 0;
        self.status = Status::loading("thinking");
        let api = ctx.api.clone();
        ctx.spawn(&mut self.inflight, SEND, async move { Reply::Text(api.query(&req).await) });
        PanelAction::None
    }

    fn run(&mut self, cmd: Command, ctx: &Ctx) -> PanelAction {
        match cmd {
            Command::Clear => {
                self.turns.clear();
                self.scroll = 0;
                self.status = Status::Idle;
                PanelAction::None
            }
            Command::Export => {
                if self.turns.is_empty() {
                    return PanelAction::Toast(ToastKind::Warn, "Nothing to export yet".into());
                }
                let api = ctx.api.clone();
                let turns = self.turns.clone();
                self.status = Status::loading("exporting");
                ctx.spawn(&mut self.inflight, EXPORT, async move { Reply::Export(api.export_chat(&turns).await) });
                PanelAction::None
            }
            Command::Workspace(None) => PanelAction::UseWorkspace(None),
            Command::Workspace(Some(id)) => {
                if !ctx.authenticated() {
                    return PanelAction::Toast(ToastKind::Warn, "Sign in to use workspaces".into());
                }
                let api = ctx.api.clone();
                self.status = Status::loading(format!("opening workspace {id}"));
                ctx.spawn(&mut self.inflight, BIND, async move { Reply::Workspace(api.workspace(id).await) });
                PanelAction::None
            }
            Command::Tool(tool) => {
                self.status = Status::Note(match &tool {
                    Some(t) => format!("answering with {t}"),
                    None => "tool cleared".into(),
                });
                self.tool_type = tool;
                PanelAction::None
            }
            Command::Help => {
                self.status = Status::Note("/clear  /export  /workspace <id>|off  /tool [name]".into());
                PanelAction::None
            }
        }
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Text(Ok(answer)) => {
                self.turns.push(ChatTurn::assistant(answer));
                self.status = Status::Idle;
                PanelAction::None
            }
            Reply::Messages(Ok(messages)) => {
                self.turns = messages
                    .into_iter()
                    .filter(|m| m.role != "system")
                    .map(|m| ChatTurn { role: m.role, content: m.content })
                    .collect();
                self.status = Status::Idle;
                PanelAction::None
            }
            Reply::Export(Ok(export)) => {
                self.status = Status::Note(format!("exported {} messages", export.message_count));
                PanelAction::SaveExport(export)
            }
            Reply::Workspace(Ok(ws)) => {
                info!(workspace = ws.id, "chat bound to workspace");
                self.status = Status::Idle;
                PanelAction::UseWorkspace(Some((ws.id, ws.name)))
            }
            Reply::Text(Err(e))
            | Reply::Messages(Err(e))
            | Reply::Export(Err(e))
            | Reply::Workspace(Err(e)) => {
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, e.to_string())
            }
            _ => PanelAction::None,
        }
    }

    fn transcript(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for turn in &self.turns {
            let (who, style) = if turn.role == "user" {
                ("You", theme::selected())
            } else {
                ("PaperClip", theme::status_ok())
            };
            lines.push(Line::styled(format!("{who}:"), style));
            for l in wrap_text_lines(&turn.content, width.saturating_sub(2)) {
                lines.push(Line::from(format!("  {l}")));
            }
            lines.push(Line::from(""));
        }
        lines
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let mut header = vec![Span::styled("Workspace: ", theme::label())];
        header.push(match &self.workspace {
            Some((id, name)) => Span::raw(format!("{name} (#{id})")),
            None => Span::styled("none", theme::label()),
        });
        if let Some(t) = &self.tool_type {
            header.push(Span::styled("  Tool: ", theme::label()));
            header.push(Span::raw(t.clone()));
        }
        f.render_widget(Paragraph::new(Line::from(header)), rows[0]);

        let lines = if self.turns.is_empty() {
            vec![Line::styled("Ask about papers, datasets, professors or code. /help lists commands.", theme::label())]
        } else {
            self.transcript(rows[1].width)
        };
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let max_top = total.saturating_sub(rows[1].height);
        let top = max_top.saturating_sub(self.scroll);
        f.render_widget(Paragraph::new(lines).scroll((top, 0)), rows[1]);

        f.render_widget(Paragraph::new(self.status.line()), rows[2]);
        let prompt = Span::styled("> ", theme::selected());
        let mut input = vec![prompt];
        input.extend(self.input.line(rows[3].width.saturating_sub(2), focused).spans);
        f.render_widget(Paragraph::new(Line::from(input)), rows[3]);
    }
}
