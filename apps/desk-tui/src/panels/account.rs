use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use paperclip_api::{validate, ApiError, ApiResult};
use ratatui::{prelude::*, widgets::*};

use super::widgets::{Form, Status};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const AUTH: Slot = "auth";

const EMAIL: usize = 0;
const PASSWORD: usize = 1;
const NAME: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    email: String,
    password: String,
    name: Option<String>,
}

/// Sign in, register and sign out.
pub struct AccountPanel {
    pub(super) inflight: Inflight,
    form: Form,
    register: bool,
    /// Display name while signed in.
    signed_in_as: Option<String>,
    status: Status,
}

impl Default for AccountPanel {
    fn default() -> Self {
        let mut form = Form::new(&["Email", "Password", "Name"]).masked(PASSWORD);
        form.set_visible(NAME, false);
        Self { inflight: Inflight::default(), form, register: false, signed_in_as: None, status: Status::Idle }
    }
}

impl AccountPanel {
    pub fn mount(&mut self, ctx: &Ctx) {
        self.auth_changed(ctx);
    }

    pub fn auth_changed(&mut self, ctx: &Ctx) {
        self.signed_in_as = ctx.user.map(|u| u.display_name().to_string());
        self.form.fields[PASSWORD].input.clear();
        self.status = Status::Idle;
    }

    fn toggle_mode(&mut self) {
        self.register = !self.register;
        self.form.set_visible(NAME, self.register);
        self.status = Status::Idle;
    }

    fn credentials(&self) -> ApiResult<Credentials> {
        let email = validate::required("email", self.form.value(EMAIL))?.to_lowercase();
        if !email.split_once('@').is_some_and(|(user, host)| !user.is_empty() && host.contains('.')) {
            return Err(ApiError::Invalid(format!("'{email}' is not an email address")));
        }
        let password = self.form.value(PASSWORD);
        if password.is_empty() {
            return Err(ApiError::Invalid("password is required".into()));
        }
        let name = if self.register { validate::optional(self.form.value(NAME)) } else { None };
        Ok(Credentials { email, password: password.to_string(), name })
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        if self.signed_in_as.is_some() {
            return match key.code {
                KeyCode::Enter => PanelAction::Logout,
                _ => PanelAction::None,
            };
        }
        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.toggle_mode();
            return PanelAction::None;
        }
        if key.code == KeyCode::Enter {
            return self.submit(ctx);
        }
        self.form.handle(key);
        PanelAction::None
    }

    pub fn on_scroll(&mut self, _up: bool) {}

    fn submit(&mut self, ctx: &Ctx) -> PanelAction {
        if self.inflight.is_pending(AUTH) {
            return PanelAction::None;
        }
        let creds = match self.credentials() {
            Ok(c) => c,
            Err(e) => {
                self.status = Status::error(&e);
                return PanelAction::None;
            }
        };
        let api = ctx.api.clone();
        if self.register {
            self.status = Status::loading("creating account");
            ctx.spawn(&mut self.inflight, AUTH, async move {
                Reply::Auth(api.register(&creds.email, &creds.password, creds.name.as_deref()).await)
            });
        } else {
            self.status = Status::loading("signing in");
            ctx.spawn(&mut self.inflight, AUTH, async move { Reply::Auth(api.login(&creds.email, &creds.password).await) });
        }
        PanelAction::None
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Auth(Ok(auth)) => {
                self.form.fields[PASSWORD].input.clear();
                self.status = Status::Idle;
                PanelAction::SignedIn(auth)
            }
            Reply::Auth(Err(e)) => {
                self.form.fields[PASSWORD].input.clear();
                self.status = Status::error(&e);
                let what = if self.register { "Registration failed" } else { "Sign-in failed" };
                PanelAction::Toast(ToastKind::Error, format!("{what}: {e}"))
            }
            _ => PanelAction::None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        if let Some(name) = &self.signed_in_as {
            let lines = vec![
                Line::from(vec![Span::styled("Signed in as ", theme::label()), Span::styled(name.clone(), theme::selected())]),
                Line::from(""),
                Line::styled("Workspaces and saved results are available.", theme::label()),
                Line::styled("Enter or Ctrl-L signs out.", theme::label()),
            ];
            f.render_widget(Paragraph::new(lines), area);
            return;
        }
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(self.form.height()),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
        let title = if self.register { "Create an account" } else { "Sign in" };
        f.render_widget(Paragraph::new(Line::styled(title, theme::title_focused())), rows[0]);
        f.render_widget(Paragraph::new(self.form.lines(rows[1].width, focused)), rows[1]);
        f.render_widget(Paragraph::new(self.status.line()), rows[2]);
        let other = if self.register { "Ctrl-R: sign in instead" } else { "Ctrl-R: register instead" };
        f.render_widget(Paragraph::new(Line::styled(format!("Enter to submit · {other}"), theme::label())), rows[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::harness::Harness;
    use paperclip_api::{AuthResponse, User};
    use paperclip_wm::PanelKind;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fill(panel: &mut AccountPanel, email: &str, password: &str) {
        panel.form.fields[EMAIL].input.set(email);
        panel.form.fields[PASSWORD].input.set(password);
    }

    #[test]
    fn credentials_are_checked_locally() {
        let mut panel = AccountPanel::default();
        fill(&mut panel, " Ada@Example.org ", "s3cret pass");
        assert_eq!(
            panel.credentials().unwrap(),
            Credentials { email: "ada@example.org".into(), password: "s3cret pass".into(), name: None }
        );
        fill(&mut panel, "ada", "x");
        assert!(panel.credentials().is_err());
        fill(&mut panel, "ada@example.org", "");
        assert!(panel.credentials().is_err());
    }

    #[test]
    fn register_mode_shows_the_name_field() {
        let h = Harness::new();
        let ctx = h.ctx(PanelKind::Account);
        let mut panel = AccountPanel::default();
        assert_eq!(panel.form.height(), 2);
        panel.on_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL), &ctx);
        assert!(panel.register);
        assert_eq!(panel.form.height(), 3);
        fill(&mut panel, "ada@example.org", "pw");
        panel.form.fields[NAME].input.set("Ada");
        assert_eq!(panel.credentials().unwrap().name.as_deref(), Some("Ada"));
    }

    #[test]
    fn signed_in_enter_logs_out() {
        let h = Harness::new().signed_in();
        let ctx = h.ctx(PanelKind::Account);
        let mut panel = AccountPanel::default();
        panel.mount(&ctx);
        assert_eq!(panel.signed_in_as.as_deref(), Some("Ada"));
        assert_eq!(panel.on_key(key(KeyCode::Char('x')), &ctx), PanelAction::None);
        assert_eq!(panel.on_key(key(KeyCode::Enter), &ctx), PanelAction::Logout);
    }

    #[test]
    fn successful_auth_is_handed_to_the_desktop() {
        let h = Harness::new();
        let ctx = h.ctx(PanelKind::Account);
        let mut panel = AccountPanel::default();
        fill(&mut panel, "ada@example.org", "pw");
        let auth = AuthResponse {
            access_token: "tok".into(),
            token_type: "bearer".into(),
            user: User { id: 1, email: "ada@example.org".into(), name: None },
        };
        assert_eq!(panel.apply(AUTH, Reply::Auth(Ok(auth.clone())), &ctx), PanelAction::SignedIn(auth));
        assert_eq!(panel.form.value(PASSWORD), "");
    }
}
