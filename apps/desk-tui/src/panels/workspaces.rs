use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{validate, ApiError, MemoryItem, Message, NewResource, Resource, StoredItem, Workspace};
use ratatui::{prelude::*, widgets::*};
use tracing::info;

use super::widgets::{move_selection, Status, TextInput};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const LIST: Slot = "list";
const CREATE: Slot = "create";
const DELETE: Slot = "delete";
const SECTION: Slot = "section";
const ADD: Slot = "add";
const REMOVE: Slot = "remove";

/// The workspace list starts below the status line.
const LIST_TOP: u16 = 1;
const LIST_ROWS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Messages,
    Memory,
    Resources,
    Ideation,
    Experiments,
}

impl Section {
    const ALL: [Section; 5] = [Section::Messages, Section::Memory, Section::Resources, Section::Ideation, Section::Experiments];

    fn label(self) -> &'static str {
        match self {
            Section::Messages => "Messages",
            Section::Memory => "Memory",
            Section::Resources => "Resources",
            Section::Ideation => "Ideation",
            Section::Experiments => "Experiments",
        }
    }

    fn cycle(self, forward: bool) -> Self {
        let ix = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        let n = Self::ALL.len();
        Self::ALL[if forward { (ix + 1) % n } else { (ix + n - 1) % n }]
    }

    fn hint(self) -> &'static str {
        match self {
            Section::Messages => "msg <role> <text>",
            Section::Memory => "mem <key>=<value> · forget <key>",
            Section::Resources => "res <type> <title> | <content>",
            Section::Ideation | Section::Experiments => "drop <id>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Contents {
    #[default]
    Empty,
    Messages(Vec<Message>),
    Memory(Vec<MemoryItem>),
    Resources(Vec<Resource>),
    Items(Vec<StoredItem>),
}

impl Contents {
    fn lines(&self) -> Vec<String> {
        let lines: Vec<String> = match self {
            Contents::Empty => return vec![],
            Contents::Messages(list) => list
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content.lines().next().unwrap_or_default()))
                .collect(),
            Contents::Memory(list) => list.iter().map(|m| format!("{} = {}", m.key, m.value)).collect(),
            Contents::Resources(list) => list.iter().map(|r| format!("#{} [{}] {}", r.id, r.kind, r.title)).collect(),
            Contents::Items(list) => list.iter().map(|i| format!("#{} {}  {}", i.id, i.topic, i.created_at)).collect(),
        };
        if lines.is_empty() {
            vec!["Nothing here yet.".into()]
        } else {
            lines
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    New { name: String, description: Option<String> },
    Delete,
    Msg { role: String, content: String },
    Mem { key: String, value: String },
    Forget(String),
    Res { kind: String, title: String, content: String },
    Drop(i64),
    Refresh,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let invalid = |e: ApiError| e.to_string();
    match head {
        "new" => {
            let (name, description) = match rest.split_once('|') {
                Some((n, d)) => (n, validate::optional(d)),
                None => (rest, None),
            };
            Ok(Command::New { name: validate::required("name", name).map_err(invalid)?, description })
        }
        "delete" => Ok(Command::Delete),
        "refresh" => Ok(Command::Refresh),
        "msg" => {
            let (role, content) = rest.split_once(char::is_whitespace).ok_or("usage: msg <role> <text>")?;
            Ok(Command::Msg {
                role: validate::role(role).map_err(invalid)?,
                content: validate::required("content", content).map_err(invalid)?,
            })
        }
        "mem" => {
            let (key, value) = rest.split_once('=').ok_or("usage: mem <key>=<value>")?;
            Ok(Command::Mem {
                key: validate::required("key", key).map_err(invalid)?,
                value: validate::required("value", value).map_err(invalid)?,
            })
        }
        "forget" => Ok(Command::Forget(validate::required("key", rest).map_err(invalid)?)),
        "res" => {
            const USAGE: &str = "usage: res <type> <title> | <content>";
            let (head, content) = rest.split_once('|').ok_or(USAGE)?;
            let (kind, title) = head.trim().split_once(char::is_whitespace).ok_or(USAGE)?;
            Ok(Command::Res {
                kind: validate::required("type", kind).map_err(invalid)?,
                title: validate::required("title", title).map_err(invalid)?,
                content: validate::required("content", content).map_err(invalid)?,
            })
        }
        "drop" => rest.parse().map(Command::Drop).map_err(|_| format!("not an item id: {rest}")),
        other => Err(format!("unknown command {other}; try new, delete, msg, mem, forget, res, drop, refresh")),
    }
}

/// Workspace browser. The active workspace is owned by the desktop; this
/// panel mirrors it and proposes changes through [`PanelAction::UseWorkspace`].
#[derive(Default)]
pub struct WorkspacesPanel {
    pub(super) inflight: Inflight,
    signed_in: bool,
    workspaces: Vec<Workspace>,
    sel: usize,
    active: Option<(i64, String)>,
    section: Section,
    contents: Contents,
    input: TextInput,
    status: Status,
    deleting: Option<i64>,
}

impl WorkspacesPanel {
    pub fn mount(&mut self, ctx: &Ctx) {
        self.auth_changed(ctx);
    }

    pub fn auth_changed(&mut self, ctx: &Ctx) {
        self.signed_in = ctx.authenticated();
        if !self.signed_in {
            self.workspaces.clear();
            self.sel = 0;
            self.active = None;
            self.contents = Contents::Empty;
            self.status = Status::Note("Sign in (F8) to manage workspaces.".into());
            return;
        }
        self.refresh(ctx);
        self.workspace_changed(ctx);
    }

    /// Follows the desktop's active workspace.
    pub fn workspace_changed(&mut self, ctx: &Ctx) {
        let next = ctx.workspace.filter(|_| ctx.authenticated()).cloned();
        if next == self.active {
            return;
        }
        self.active = next;
        if let Some(ix) = self.active.as_ref().and_then(|(id, _)| self.workspaces.iter().position(|w| w.id == *id)) {
            self.sel = ix;
        }
        self.load_section(ctx);
    }

    fn refresh(&mut self, ctx: &Ctx) {
        let api = ctx.api.clone();
        self.status = Status::loading("loading workspaces");
        ctx.spawn(&mut self.inflight, LIST, async move { Reply::Workspaces(api.workspaces().await) });
    }

    fn load_section(&mut self, ctx: &Ctx) {
        let Some((id, _)) = &self.active else {
            self.contents = Contents::Empty;
            return;
        };
        let (id, api) = (*id, ctx.api.clone());
        self.status = Status::loading(format!("loading {}", self.section.label().to_lowercase()));
        match self.section {
            Section::Messages => ctx.spawn(&mut self.inflight, SECTION, async move { Reply::Messages(api.messages(id).await) }),
            Section::Memory => ctx.spawn(&mut self.inflight, SECTION, async move { Reply::Memory(api.memory(id).await) }),
            Section::Resources => {
                ctx.spawn(&mut self.inflight, SECTION, async move { Reply::Resources(api.resources(id).await) })
            }
            Section::Ideation => {
                ctx.spawn(&mut self.inflight, SECTION, async move { Reply::Stored(api.ideation_items(id).await) })
            }
            Section::Experiments => {
                ctx.spawn(&mut self.inflight, SECTION, async move { Reply::Stored(api.experiment_plans(id).await) })
            }
        }
    }

    fn select(&mut self, ctx: &Ctx) -> PanelAction {
        let Some(ws) = self.workspaces.get(self.sel) else { return PanelAction::None };
        let picked = (ws.id, ws.name.clone());
        if self.active.as_ref() != Some(&picked) {
            self.active = Some(picked.clone());
            self.load_section(ctx);
        }
        PanelAction::UseWorkspace(Some(picked))
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        if !self.signed_in {
            return PanelAction::None;
        }
        match key.code {
            KeyCode::Up => self.sel = move_selection(self.sel, self.workspaces.len(), false),
            KeyCode::Down => self.sel = move_selection(self.sel, self.workspaces.len(), true),
            KeyCode::Tab | KeyCode::BackTab => {
                self.section = self.section.cycle(key.code == KeyCode::Tab);
                self.contents = Contents::Empty;
                self.load_section(ctx);
            }
            KeyCode::Enter if self.input.is_blank() => return self.select(ctx),
            KeyCode::Enter => {
                let line = self.input.take();
                return match parse_command(&line) {
                    Ok(cmd) => self.run(cmd, ctx),
                    Err(msg) => {
                        self.input.set(line);
                        self.status = Status::Error(msg);
                        PanelAction::None
                    }
                };
            }
            _ => {
                self.input.handle(key);
            }
        }
        PanelAction::None
    }

    fn list_offset(&self) -> usize {
        (self.sel + 1).saturating_sub(LIST_ROWS)
    }

    /// A click on a workspace row selects and activates it.
    pub fn on_click(&mut self, row: u16, ctx: &Ctx) -> PanelAction {
        let Some(ix) = row.checked_sub(LIST_TOP).map(usize::from) else { return PanelAction::None };
        if ix >= LIST_ROWS {
            return PanelAction::None;
        }
        let ix = ix + self.list_offset();
        if ix < self.workspaces.len() {
            self.sel = ix;
            self.select(ctx)
        } else {
            PanelAction::None
        }
    }

    pub fn on_scroll(&mut self, up: bool) {
        self.sel = move_selection(self.sel, self.workspaces.len(), !up);
    }

    fn run(&mut self, cmd: Command, ctx: &Ctx) -> PanelAction {
        let api = ctx.api.clone();
        match cmd {
            Command::Refresh => {
                self.refresh(ctx);
                self.load_section(ctx);
                return PanelAction::None;
            }
            Command::New { name, description } => {
                self.status = Status::loading(format!("creating {name}"));
                ctx.spawn(&mut self.inflight, CREATE, async move {
                    Reply::Workspace(api.create_workspace(&name, description.as_deref()).await)
                });
                return PanelAction::None;
            }
            Command::Delete => {
                let Some(ws) = self.workspaces.get(self.sel) else {
                    self.status = Status::Error("no workspace selected".into());
                    return PanelAction::None;
                };
                let id = ws.id;
                self.deleting = Some(id);
                self.status = Status::loading(format!("deleting {}", ws.name));
                ctx.spawn(&mut self.inflight, DELETE, async move { Reply::Done(api.delete_workspace(id).await) });
                return PanelAction::None;
            }
            _ => {}
        }

        let Some((id, _)) = &self.active else {
            self.status = Status::Error("activate a workspace first (Enter on the list)".into());
            return PanelAction::None;
        };
        let id = *id;
        match cmd {
            Command::Msg { role, content } => {
                self.section = Section::Messages;
                ctx.spawn(&mut self.inflight, ADD, async move { Reply::Message(api.add_message(id, &role, &content).await) });
            }
            Command::Mem { key, value } => {
                self.section = Section::Memory;
                ctx.spawn(&mut self.inflight, ADD, async move { Reply::MemoryItem(api.add_memory(id, &key, &value).await) });
            }
            Command::Forget(key) => {
                self.section = Section::Memory;
                ctx.spawn(&mut self.inflight, REMOVE, async move { Reply::Done(api.delete_memory(id, &key).await) });
            }
            Command::Res { kind, title, content } => {
                self.section = Section::Resources;
                let resource = NewResource { kind, title, content, metadata: None };
                ctx.spawn(&mut self.inflight, ADD, async move { Reply::Resource(api.add_resource(id, &resource).await) });
            }
            Command::Drop(item) => match self.section {
                Section::Ideation => {
                    ctx.spawn(&mut self.inflight, REMOVE, async move { Reply::Done(api.delete_ideation_item(id, item).await) })
                }
                Section::Experiments => ctx.spawn(&mut self.inflight, REMOVE, async move {
                    Reply::Done(api.delete_experiment_plan(id, item).await)
                }),
                _ => {
                    self.status = Status::Error("drop works in the Ideation and Experiments tabs".into());
                    return PanelAction::None;
                }
            },
            Command::Refresh | Command::New { .. } | Command::Delete => {}
        }
        self.status = Status::loading("saving");
        PanelAction::None
    }

    pub fn apply(&mut self, slot: Slot, reply: Reply, ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Workspaces(Ok(list)) => {
                self.workspaces = list;
                self.sel = self.sel.min(self.workspaces.len().saturating_sub(1));
                self.status = Status::Note(format!("{} workspaces · Enter activates · Tab switches tab", self.workspaces.len()));
                let gone = self.active.as_ref().is_some_and(|(id, _)| !self.workspaces.iter().any(|w| w.id == *id));
                if gone {
                    self.active = None;
                    self.contents = Contents::Empty;
                    return PanelAction::UseWorkspace(None);
                }
                PanelAction::None
            }
            Reply::Workspace(Ok(ws)) => {
                info!(workspace = ws.id, "workspace created");
                let msg = format!("Created workspace {}", ws.name);
                self.workspaces.push(ws);
                self.sel = self.workspaces.len() - 1;
                self.status = Status::Idle;
                PanelAction::Toast(ToastKind::Success, msg)
            }
            Reply::Done(Ok(())) if slot == DELETE => {
                let id = self.deleting.take();
                info!(workspace = ?id, "workspace deleted");
                self.workspaces.retain(|w| Some(w.id) != id);
                self.sel = self.sel.min(self.workspaces.len().saturating_sub(1));
                self.status = Status::Idle;
                if id.is_some() && self.active.as_ref().map(|(a, _)| *a) == id {
                    self.active = None;
                    self.contents = Contents::Empty;
                    return PanelAction::UseWorkspace(None);
                }
                PanelAction::Toast(ToastKind::Info, "Workspace deleted".into())
            }
            Reply::Done(Ok(())) | Reply::Message(Ok(_)) | Reply::MemoryItem(Ok(_)) | Reply::Resource(Ok(_)) => {
                self.load_section(ctx);
                PanelAction::None
            }
            Reply::Messages(Ok(list)) => self.show(Contents::Messages(list)),
            Reply::Memory(Ok(list)) => self.show(Contents::Memory(list)),
            Reply::Resources(Ok(list)) => self.show(Contents::Resources(list)),
            Reply::Stored(Ok(list)) => self.show(Contents::Items(list)),
            Reply::Workspaces(Err(e))
            | Reply::Workspace(Err(e))
            | Reply::Done(Err(e))
            | Reply::Message(Err(e))
            | Reply::MemoryItem(Err(e))
            | Reply::Resource(Err(e))
            | Reply::Messages(Err(e))
            | Reply::Memory(Err(e))
            | Reply::Resources(Err(e))
            | Reply::Stored(Err(e)) => {
                if slot == DELETE {
                    self.deleting = None;
                }
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, e.to_string())
            }
            _ => PanelAction::None,
        }
    }

    fn show(&mut self, contents: Contents) -> PanelAction {
        self.contents = contents;
        self.status = Status::Idle;
        PanelAction::None
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        if !self.signed_in {
            f.render_widget(Paragraph::new(self.status.line()).wrap(Wrap { trim: true }), area);
            return;
        }
        let list_h = u16::try_from(self.workspaces.len().clamp(1, LIST_ROWS)).unwrap_or(1);
        let rows = Layout::vertical([
            Constraint::Length(LIST_TOP),
            Constraint::Length(list_h),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        f.render_widget(Paragraph::new(self.status.line()), rows[0]);

        let list: Vec<Line> = if self.workspaces.is_empty() {
            vec![Line::styled("No workspaces. Type: new <name> [| description]", theme::label())]
        } else {
            self.workspaces
                .iter()
                .enumerate()
                .skip(self.list_offset())
                .take(LIST_ROWS)
                .map(|(i, w)| {
                    let active = self.active.as_ref().is_some_and(|(id, _)| *id == w.id);
                    let marker = if active { "● " } else { "  " };
                    let desc = w.description.as_deref().map(|d| format!(" · {d}")).unwrap_or_default();
                    let style = if focused && i == self.sel { theme::selected() } else { Style::default() };
                    Line::from(vec![
                        Span::styled(format!("{marker}{}", w.name), style),
                        Span::styled(desc, theme::label()),
                    ])
                })
                .collect()
        };
        f.render_widget(Paragraph::new(list), rows[1]);

        let mut tabs = Vec::new();
        for s in Section::ALL {
            let style = if s == self.section { theme::selected() } else { theme::label() };
            tabs.push(Span::styled(format!(" {} ", s.label()), style));
        }
        f.render_widget(Paragraph::new(Line::from(tabs)), rows[2]);

        let body: Vec<Line> = match &self.active {
            None => vec![Line::styled("Activate a workspace to see its contents.", theme::label())],
            Some(_) => self.contents.lines().into_iter().map(Line::from).collect(),
        };
        f.render_widget(Paragraph::new(body).block(Block::default().borders(Borders::TOP).border_style(theme::label())), rows[3]);

        let hint = format!("{} · new <name> · delete · refresh", self.section.hint());
        f.render_widget(Paragraph::new(Line::styled(hint, theme::label())), rows[4]);
        let mut prompt = vec![Span::styled("> ", theme::label())];
        prompt.extend(self.input.line(rows[5].width.saturating_sub(2), focused).spans);
        f.render_widget(Paragraph::new(Line::from(prompt)), rows[5]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::harness::Harness;
    use paperclip_wm::PanelKind;
    use pretty_assertions::assert_eq;

    fn ws(id: i64, name: &str) -> Workspace {
        Workspace { id, user_id: Some(1), name: name.into(), description: None, created_at: String::new() }
    }

    #[test]
    fn commands_parse() {
        assert_eq!(
            parse_command("new Thesis | survey of GNNs"),
            Ok(Command::New { name: "Thesis".into(), description: Some("survey of GNNs".into()) })
        );
        assert_eq!(parse_command("new Thesis"), Ok(Command::New { name: "Thesis".into(), description: None }));
        assert_eq!(
            parse_command("msg USER hello there"),
            Ok(Command::Msg { role: "user".into(), content: "hello there".into() })
        );
        assert_eq!(
            parse_command("mem deadline = 1 May"),
            Ok(Command::Mem { key: "deadline".into(), value: "1 May".into() })
        );
        assert_eq!(
            parse_command("res paper Attention | arxiv 1706.03762"),
            Ok(Command::Res { kind: "paper".into(), title: "Attention".into(), content: "arxiv 1706.03762".into() })
        );
        assert_eq!(parse_command("drop 12"), Ok(Command::Drop(12)));
        assert_eq!(parse_command("forget deadline"), Ok(Command::Forget("deadline".into())));
    }

    #[test]
    fn bad_commands_are_rejected_locally() {
        assert!(parse_command("new   ").is_err());
        assert!(parse_command("msg robot hi").is_err());
        assert!(parse_command("mem =value").is_err());
        assert!(parse_command("res paper | body").is_err());
        assert!(parse_command("drop x").is_err());
        assert!(parse_command("rename a").is_err());
    }

    #[test]
    fn signed_out_panel_stays_empty() {
        let h = Harness::new();
        let ctx = h.ctx(PanelKind::Workspaces);
        let mut panel = WorkspacesPanel::default();
        panel.mount(&ctx);
        assert!(!panel.signed_in);
        assert!(!panel.inflight.any_pending());
        let enter = KeyEvent::new(KeyCode::Enter, crossterm::event::KeyModifiers::NONE);
        assert_eq!(panel.on_key(enter, &ctx), PanelAction::None);
    }

    #[tokio::test]
    async fn click_activates_the_workspace() {
        let h = Harness::new().signed_in();
        let ctx = h.ctx(PanelKind::Workspaces);
        let mut panel = WorkspacesPanel::default();
        panel.mount(&ctx);
        panel.workspaces = vec![ws(3, "Thesis"), ws(7, "Grant")];
        assert_eq!(panel.on_click(2, &ctx), PanelAction::UseWorkspace(Some((7, "Grant".into()))));
        assert_eq!(panel.active, Some((7, "Grant".into())));
        assert!(panel.inflight.is_pending(SECTION));
        assert_eq!(panel.on_click(5, &ctx), PanelAction::None);
    }

    #[tokio::test]
    async fn deleting_the_active_workspace_clears_it() {
        let h = Harness::new().signed_in().with_workspace(3, "Thesis");
        let ctx = h.ctx(PanelKind::Workspaces);
        let mut panel = WorkspacesPanel::default();
        panel.mount(&ctx);
        panel.workspaces = vec![ws(3, "Thesis"), ws(7, "Grant")];
        panel.deleting = Some(3);
        let action = panel.apply(DELETE, Reply::Done(Ok(())), &ctx);
        assert_eq!(action, PanelAction::UseWorkspace(None));
        assert_eq!(panel.workspaces, vec![ws(7, "Grant")]);
        assert_eq!(panel.contents, Contents::Empty);
    }

    #[test]
    fn contents_render_per_section() {
        let memory = Contents::Memory(vec![MemoryItem {
            id: Some(1),
            workspace_id: 3,
            key: "deadline".into(),
            value: "1 May".into(),
            created_at: String::new(),
        }]);
        assert_eq!(memory.lines(), vec!["deadline = 1 May"]);
        assert_eq!(Contents::Items(vec![]).lines(), vec!["Nothing here yet."]);
    }
}
