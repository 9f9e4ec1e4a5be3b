use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{validate, ApiResult, ExperimentRequest, ExperimentResponse};
use ratatui::{prelude::*, widgets::*};

use super::widgets::{draw_output, scroll_by, value_lines, Form, Status};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const RUN: Slot = "run";

const TOPIC: usize = 0;
const IDEA: usize = 1;
const CONSTRAINTS: usize = 2;

pub struct ExperimentPanel {
    pub(super) inflight: Inflight,
    form: Form,
    output: Vec<String>,
    status: Status,
    scroll: u16,
}

impl Default for ExperimentPanel {
    fn default() -> Self {
        Self {
            inflight: Inflight::default(),
            form: Form::new(&["Topic", "Idea", "Constraints"]),
            output: vec![],
            status: Status::Idle,
            scroll: 0,
        }
    }
}

impl ExperimentPanel {
    fn request(&self, workspace_id: Option<i64>) -> ApiResult<ExperimentRequest> {
        Ok(ExperimentRequest {
            topic: validate::required("topic", self.form.value(TOPIC))?,
            idea: validate::optional(self.form.value(IDEA)),
            constraints: validate::optional(self.form.value(CONSTRAINTS)),
            workspace_id,
        })
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        match key.code {
            KeyCode::Enter => return self.run(ctx),
            KeyCode::PageUp => scroll_by(&mut self.scroll, true),
            KeyCode::PageDown => scroll_by(&mut self.scroll, false),
            _ => {
                self.form.handle(key);
            }
        }
        PanelAction::None
    }

    pub fn on_scroll(&mut self, up: bool) {
        scroll_by(&mut self.scroll, up);
    }

    fn run(&mut self, ctx: &Ctx) -> PanelAction {
        let req = match self.request(ctx.workspace_id()) {
            Ok(r) => r,
            Err(e) => {
                self.status = Status::error(&e);
                return PanelAction::None;
            }
        };
        let api = ctx.api.clone();
        self.status = Status::loading("designing experiment");
        self.scroll = 0;
        ctx.spawn(&mut self.inflight, RUN, async move { Reply::Experiment(api.experiment_design(&req).await) });
        PanelAction::None
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Experiment(Ok(resp)) => {
                self.output = render(&resp);
                self.status = Status::Idle;
                match resp.saved {
                    Some(item) => PanelAction::Toast(ToastKind::Success, format!("Plan saved to workspace #{}", item.workspace_id)),
                    None => PanelAction::None,
                }
            }
            Reply::Experiment(Err(e)) => {
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, e.to_string())
            }
            _ => PanelAction::None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let rows = Layout::vertical([Constraint::Length(self.form.height()), Constraint::Length(1), Constraint::Min(2)]).split(area);
        f.render_widget(Paragraph::new(self.form.lines(rows[0].width, focused)), rows[0]);
        f.render_widget(Paragraph::new(Line::styled("Enter to design · Tab next field", theme::label())), rows[1]);
        draw_output(f, rows[2], &self.status, &self.output, self.scroll, "Describe a topic and an idea to get an experiment plan.");
    }
}

fn render(resp: &ExperimentResponse) -> Vec<String> {
    let mut out = vec![format!("# Experiment plan: {}", resp.topic)];
    if let Some(idea) = resp.experiment.idea.as_deref() {
        out.push(format!("Idea: {idea}"));
    }
    let plan = value_lines(&resp.experiment.plan);
    if plan.is_empty() {
        out.push("No plan returned.".into());
    } else {
        out.push(String::new());
        out.extend(plan);
    }
    out
}
