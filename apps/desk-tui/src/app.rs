use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use paperclip_api::{ApiClient, ApiResult, ChatExport, User};
use paperclip_wm as wm;
use paperclip_wm::{FrameLayout, PanelKind, Point, PointerOutcome, WindowHost};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::chrome;
use crate::config::Config;
use crate::desktop;
use crate::events::{Completion, Ctx};
use crate::keymap::{self, Hotkey};
use crate::panels::{Panel, PanelAction, ToastKind};
use crate::session::{Session, SessionStore};
use crate::theme;

const TOAST_TTL: Duration = Duration::from_millis(3500);
const TOAST_KEEP: usize = 50;

struct Toast {
    msg: String,
    kind: ToastKind,
    at: Instant,
}

pub struct App {
    host: WindowHost,
    /// Content state for every open window, keyed by kind.
    panels: HashMap<PanelKind, Panel>,
    api: ApiClient,
    user: Option<User>,
    workspace: Option<(i64, String)>,
    sessions: SessionStore,
    home: PathBuf,
    stats_poll: Duration,
    toasts: Vec<Toast>,
    show_help: bool,
    quit: bool,
    /// Last drawn frame size; pointer hit testing uses the same geometry.
    screen: Rect,
    tickets: AtomicU64,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl App {
    pub fn new(api: ApiClient, home: PathBuf, stats_poll: Duration) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            host: WindowHost::new(),
            panels: HashMap::new(),
            api,
            user: None,
            workspace: None,
            sessions: SessionStore::new(&home),
            home,
            stats_poll,
            toasts: vec![],
            show_help: false,
            quit: false,
            screen: Rect::default(),
            tickets: AtomicU64::new(0),
            tx,
            rx,
        }
    }

    fn push_toast(&mut self, kind: ToastKind, msg: impl Into<String>) {
        let msg = msg.into();
        match kind {
            ToastKind::Error => error!(toast = %msg),
            ToastKind::Warn => warn!(toast = %msg),
            ToastKind::Info | ToastKind::Success => info!(toast = %msg),
        }
        self.toasts.push(Toast { msg, kind, at: Instant::now() });
        if self.toasts.len() > TOAST_KEEP {
            self.toasts.drain(0..self.toasts.len() - TOAST_KEEP);
        }
    }

    /// Runs `f` against the panel for `kind` with a context borrowed from the
    /// app's shared state. `None` when no such window is open.
    fn with_panel<R>(&mut self, kind: &PanelKind, f: impl FnOnce(&mut Panel, &Ctx) -> R) -> Option<R> {
        let panel = self.panels.get_mut(kind)?;
        let ctx = Ctx::new(
            kind.clone(),
            &self.api,
            self.user.as_ref(),
            self.workspace.as_ref(),
            self.stats_poll,
            &self.tx,
            &self.tickets,
        );
        Some(f(panel, &ctx))
    }

    fn each_panel(&mut self, mut f: impl FnMut(&mut Panel, &Ctx)) {
        let kinds: Vec<PanelKind> = self.panels.keys().cloned().collect();
        for kind in kinds {
            self.with_panel(&kind, &mut f);
        }
    }

    /// Picks up a stored token and asks the server who it belongs to. The
    /// user counts as signed in only once `/auth/me` answers.
    pub fn restore_session(&mut self) {
        let session = match self.sessions.load() {
            Ok(Some(s)) => s,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, path = %self.sessions.path().display(), "ignoring unreadable session file");
                return;
            }
        };
        self.api.set_token(Some(session.token.clone()));
        let api = self.api.clone();
        let tx = self.tx.clone();
        info!("validating stored session");
        tokio::spawn(async move {
            let result = api.me().await;
            let _ = tx.send(Completion::Session { token: session.token, result });
        });
    }

    fn open(&mut self, kind: PanelKind) {
        let id = self.host.open(kind.clone());
        if !self.panels.contains_key(&kind) {
            info!(window = %id, "window opened");
            self.panels.insert(kind.clone(), Panel::for_kind(&kind));
            self.with_panel(&kind, |p, ctx| p.mount(ctx));
        }
    }

    /// Drops panel state for windows the host no longer has.
    fn sync_panels(&mut self) {
        let host = &self.host;
        self.panels.retain(|kind, _| host.find_kind(kind).is_some());
    }

    fn handle_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::None => {}
            PanelAction::Open(kind) => self.open(kind),
            PanelAction::SignedIn(auth) => {
                self.api.set_token(Some(auth.access_token.clone()));
                let session = Session { token: auth.access_token, user: Some(auth.user.clone()) };
                if let Err(e) = self.sessions.save(&session) {
                    warn!(error = %e, "could not persist session");
                    self.push_toast(ToastKind::Warn, format!("Signed in, but the session was not saved: {e}"));
                }
                self.set_user(Some(auth.user));
            }
            PanelAction::Logout => self.logout(),
            PanelAction::UseWorkspace(ws) => {
                if ws == self.workspace {
                    return;
                }
                match &ws {
                    Some((id, name)) => self.push_toast(ToastKind::Info, format!("Workspace: {name} (#{id})")),
                    None => self.push_toast(ToastKind::Info, "Workspace cleared"),
                }
                self.workspace = ws;
                self.each_panel(|p, ctx| p.workspace_changed(ctx));
            }
            PanelAction::SaveExport(export) => match self.save_export(&export) {
                Ok(path) => self.push_toast(ToastKind::Success, format!("Chat saved to {}", path.display())),
                Err(e) => self.push_toast(ToastKind::Error, format!("Export failed: {e}")),
            },
            PanelAction::Toast(kind, msg) => self.push_toast(kind, msg),
        }
    }

    fn set_user(&mut self, user: Option<User>) {
        if let Some(u) = &user {
            info!(user = u.id, "signed in");
            self.push_toast(ToastKind::Success, format!("Signed in as {}", u.display_name()));
        }
        self.user = user;
        self.each_panel(|p, ctx| p.auth_changed(ctx));
    }

    fn logout(&mut self) {
        if self.user.is_none() && !self.api.is_authenticated() {
            self.push_toast(ToastKind::Info, "Not signed in");
            return;
        }
        self.api.set_token(None);
        if let Err(e) = self.sessions.clear() {
            warn!(error = %e, "could not remove session file");
        }
        self.user = None;
        self.workspace = None;
        // every window goes, along with its panel state and pending tickets
        self.host.reset();
        self.panels.clear();
        info!("signed out");
        self.push_toast(ToastKind::Info, "Signed out");
    }

    fn save_export(&self, export: &ChatExport) -> anyhow::Result<PathBuf> {
        let dir = self.home.join("exports");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("chat-{}.json", chrono::Local::now().format("%Y%m%d-%H%M%S")));
        std::fs::write(&path, serde_json::to_string_pretty(export)?)?;
        info!(path = %path.display(), messages = export.message_count, "chat exported");
        Ok(path)
    }

    /// Applies the `/auth/me` answer for `token`. Dropped when the user has
    /// signed out or in with another token since the check started.
    fn on_session(&mut self, token: String, res: ApiResult<User>) {
        if self.api.token() != Some(token.as_str()) {
            debug!("session check outdated; reply dropped");
            return;
        }
        match res {
            Ok(user) => {
                if let Err(e) = self.sessions.save(&Session { token, user: Some(user.clone()) }) {
                    warn!(error = %e, "could not refresh session file");
                }
                self.set_user(Some(user));
            }
            Err(e) if e.is_unauthorized() => {
                self.api.set_token(None);
                if let Err(e) = self.sessions.clear() {
                    warn!(error = %e, "could not remove session file");
                }
                self.push_toast(ToastKind::Warn, "Session expired; sign in again (F8)");
            }
            Err(e) => {
                // keep the stored token for the next start, but stay signed out
                self.api.set_token(None);
                self.push_toast(ToastKind::Warn, format!("Could not verify session: {e}"));
            }
        }
    }

    pub fn on_completion(&mut self, c: Completion) {
        match c {
            Completion::Panel { kind, slot, ticket, reply } => {
                match self.with_panel(&kind, |p, ctx| p.apply(slot, ticket, reply, ctx)) {
                    Some(action) => self.handle_action(action),
                    None => debug!(panel = %kind.slug(), slot, ticket, "reply for closed window dropped"),
                }
            }
            Completion::Session { token, result } => self.on_session(token, result),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.each_panel(|p, ctx| p.tick(now, ctx));
    }

    fn focused_kind(&self) -> Option<PanelKind> {
        self.host.focused_window().map(|w| w.kind.clone())
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match keymap::resolve(key) {
            Hotkey::Quit => self.quit = true,
            Hotkey::CloseWindow => {
                if let Some(id) = self.host.focused().cloned() {
                    self.host.close(&id);
                    self.sync_panels();
                }
            }
            Hotkey::MinimizeWindow => {
                if let Some(id) = self.host.focused().cloned() {
                    self.host.minimize(&id);
                }
            }
            Hotkey::MaximizeWindow => {
                if let Some(id) = self.host.focused().cloned() {
                    self.host.maximize(&id);
                }
            }
            Hotkey::CycleFocus => self.host.cycle_focus(),
            Hotkey::Launch(ix) => {
                if let Some(kind) = PanelKind::LAUNCHERS.get(ix) {
                    self.open(kind.clone());
                }
            }
            Hotkey::ToggleHelp => self.show_help = !self.show_help,
            Hotkey::ToggleTheme => {
                theme::toggle_mode();
                self.push_toast(ToastKind::Info, format!("Theme: {}", theme::mode_name()));
            }
            Hotkey::Logout => self.logout(),
            Hotkey::None => {
                if self.show_help {
                    if key.code == KeyCode::Esc {
                        self.show_help = false;
                    }
                    return;
                }
                let Some(kind) = self.focused_kind() else { return };
                if let Some(action) = self.with_panel(&kind, |p, ctx| p.on_key(key, ctx)) {
                    self.handle_action(action);
                }
            }
        }
    }

    fn right_label(&self) -> String {
        let who = self.user.as_ref().map_or("guest", |u| u.display_name());
        let ws = self.workspace.as_ref().map(|(_, name)| format!(" · {name}")).unwrap_or_default();
        let busy = if self.panels.values().any(Panel::busy) { "⏳ " } else { "" };
        format!("{busy}{who}{ws} · {} · Ctrl-H help", theme::mode_name())
    }

    pub fn on_mouse(&mut self, ev: MouseEvent, now: Instant) {
        let p = Point::new(i32::from(ev.column), i32::from(ev.row));
        let work = chrome::work_area(self.screen);
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_down(p, work, now),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.host.pointer_moved(p);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(g) = self.host.pointer_up() {
                    debug!(window = %g.window(), "gesture ended");
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let up = ev.kind == MouseEventKind::ScrollUp;
                if let Some(kind) = self.host.window_at(p, work).map(|w| w.kind.clone()) {
                    self.with_panel(&kind, |panel, _| panel.on_scroll(up));
                }
            }
            _ => {}
        }
    }

    fn pointer_down(&mut self, p: Point, work: wm::Rect, now: Instant) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        let bar = chrome::taskbar_area(self.screen);
        let bar = wm::Rect::new(i32::from(bar.x), i32::from(bar.y), bar.width, bar.height);
        if bar.contains(p) {
            let reserved = desktop::label_reserve(&self.right_label());
            if let Some(id) = desktop::task_at(&self.host.taskbar(), bar, reserved, p) {
                self.host.toggle_from_taskbar(&id);
            }
            return;
        }
        match self.host.pointer_down(p, work, now) {
            PointerOutcome::Missed => {
                if let Some(kind) = desktop::icon_at(p, work) {
                    self.open(kind);
                }
            }
            PointerOutcome::Closed(_) => self.sync_panels(),
            PointerOutcome::Focused(id) => {
                let Some(w) = self.host.get(&id) else { return };
                let body = FrameLayout::for_window(w, work).body;
                if !body.contains(p) {
                    return;
                }
                let kind = w.kind.clone();
                let row = u16::try_from(p.y - body.y).unwrap_or(0);
                if let Some(action) = self.with_panel(&kind, |panel, ctx| panel.on_click(row, ctx)) {
                    self.handle_action(action);
                }
            }
            PointerOutcome::Dragging(_)
            | PointerOutcome::Resizing(_)
            | PointerOutcome::Minimized(_)
            | PointerOutcome::MaximizeToggled(_) => {}
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let screen = f.area();
    let work = chrome::work_area(screen);
    desktop::draw_desktop(f, work);
    let focused = app.host.focused();
    for w in app.host.stacking_order() {
        chrome::draw_window(f, w, work, focused == Some(&w.id), app.panels.get(&w.kind));
    }
    desktop::draw_taskbar(f, chrome::taskbar_area(screen), &app.host.taskbar(), &app.right_label());
    draw_toasts(f, app, screen);
    if app.show_help {
        draw_help(f, screen);
    }
}

// Toasts overlay (bottom-right), show recent, colored by kind
fn draw_toasts(f: &mut Frame, app: &App, screen: Rect) {
    let now = Instant::now();
    let active: Vec<&Toast> = app.toasts.iter().filter(|t| now.duration_since(t.at) < TOAST_TTL).collect();
    if active.is_empty() {
        return;
    }
    let shown = &active[active.len().saturating_sub(3)..];
    let width = 52u16.min(screen.width);
    let height = u16::try_from(shown.len()).unwrap_or(3) + 2;
    let area = Rect {
        x: screen.x + screen.width.saturating_sub(width + 2),
        y: screen.y + screen.height.saturating_sub(height + chrome::TASKBAR_HEIGHT + 1),
        width,
        height: height.min(screen.height),
    };
    let lines: Vec<Line> = shown
        .iter()
        .map(|t| {
            let style = match t.kind {
                ToastKind::Info => Style::default().fg(Color::Cyan),
                ToastKind::Success => theme::status_ok(),
                ToastKind::Warn => theme::status_warn(),
                ToastKind::Error => theme::status_err(),
            };
            Line::from(t.msg.as_str()).style(style)
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Notifications")
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(theme::body());
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(f: &mut Frame, screen: Rect) {
    let area = centered_rect(70, 60, screen);
    let mut lines = vec![Line::styled("PaperClip Desk", theme::title_focused()), Line::from("")];
    for (keys, what) in keymap::HELP {
        lines.push(Line::from(vec![Span::styled(format!("{keys:<18}"), theme::selected()), Span::raw(*what)]));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("Esc or click to close", theme::label()));
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(theme::body());
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn centered_rect(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default().direction(Direction::Vertical).constraints([
        Constraint::Percentage((100 - pct_y) / 2), Constraint::Percentage(pct_y), Constraint::Percentage((100 - pct_y) / 2),]).split(r);
    Layout::default().direction(Direction::Horizontal).constraints([
        Constraint::Percentage((100 - pct_x) / 2), Constraint::Percentage(pct_x), Constraint::Percentage((100 - pct_x) / 2),]).split(popup_layout[1])[1]
}

pub async fn run(cfg: Config) -> anyhow::Result<()> {
    let api = ApiClient::new(&cfg.api.base_url, cfg.timeout())?;
    info!(base_url = %api.base_url(), "starting desk");
    let mut app = App::new(api, cfg.home_dir(), cfg.stats_poll());
    app.restore_session();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::event::EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = loop {
        if let Err(e) = terminal.draw(|f| {
            app.screen = f.area();
            ui(f, &app);
        }) {
            break Err(e.into());
        }
        // Drain background completions before reading input
        while let Ok(c) = app.rx.try_recv() {
            app.on_completion(c);
        }
        app.tick(Instant::now());
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => app.on_key(key),
                Ok(Event::Mouse(m)) => app.on_mouse(m, Instant::now()),
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        if app.quit {
            break Ok(());
        }
    };

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::event::DisableMouseCapture, crossterm::terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("desk closed");
    res
}
