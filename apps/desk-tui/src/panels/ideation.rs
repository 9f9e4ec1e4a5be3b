use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{validate, ApiResult, IdeationRequest, IdeationResponse};
use ratatui::{prelude::*, widgets::*};
use serde_json::Value;

use super::widgets::{draw_output, scroll_by, value_lines, Form, Status};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const RUN: Slot = "run";

const TOPIC: usize = 0;
const GOAL: usize = 1;
const CONSTRAINTS: usize = 2;

pub struct IdeationPanel {
    pub(super) inflight: Inflight,
    form: Form,
    output: Vec<String>,
    status: Status,
    scroll: u16,
}

impl Default for IdeationPanel {
    fn default() -> Self {
        Self {
            inflight: Inflight::default(),
            form: Form::new(&["Topic", "Goal", "Constraints"]),
            output: vec![],
            status: Status::Idle,
            scroll: 0,
        }
    }
}

impl IdeationPanel {
    fn request(&self, workspace_id: Option<i64>) -> ApiResult<IdeationRequest> {
        Ok(IdeationRequest {
            topic: validate::required("topic", self.form.value(TOPIC))?,
            goal: validate::optional(self.form.value(GOAL)),
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
        self.status = Status::loading("brainstorming");
        self.scroll = 0;
        ctx.spawn(&mut self.inflight, RUN, async move { Reply::Ideation(api.ideation(&req).await) });
        PanelAction::None
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Ideation(Ok(resp)) => {
                self.output = render(&resp);
                self.status = Status::Idle;
                match resp.saved {
                    Some(item) => PanelAction::Toast(ToastKind::Success, format!("Ideas saved to workspace #{}", item.workspace_id)),
                    None => PanelAction::None,
                }
            }
            Reply::Ideation(Err(e)) => {
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, e.to_string())
            }
            _ => PanelAction::None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let rows = Layout::vertical([Constraint::Length(self.form.height()), Constraint::Length(1), Constraint::Min(2)]).split(area);
        f.render_widget(Paragraph::new(self.form.lines(rows[0].width, focused)), rows[0]);
        f.render_widget(Paragraph::new(Line::styled("Enter to generate · Tab next field", theme::label())), rows[1]);
        draw_output(f, rows[2], &self.status, &self.output, self.scroll, "Describe a topic to get research ideas.");
    }
}

fn render(resp: &IdeationResponse) -> Vec<String> {
    let mut out = vec![format!("# Ideas for {}", resp.topic)];
    let ideation = &resp.ideation;
    if ideation.ideas.is_empty() {
        match ideation.raw.as_deref() {
            Some(raw) => out.extend(raw.lines().map(str::to_string)),
            None => out.push("No ideas returned.".into()),
        }
        return out;
    }
    for (i, idea) in ideation.ideas.iter().enumerate() {
        out.push(String::new());
        match idea {
            Value::Object(map) => {
                let title = map.get("title").and_then(Value::as_str).unwrap_or("Untitled idea");
                out.push(format!("{}. {title}", i + 1));
                let mut rest = map.clone();
                rest.remove("title");
                out.extend(value_lines(&Value::Object(rest)).into_iter().map(|l| format!("   {l}")));
            }
            other => out.extend(value_lines(other).into_iter().map(|l| format!("{}. {l}", i + 1))),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ideas_are_numbered_with_details() {
        let resp: IdeationResponse = serde_json::from_value(json!({
            "topic": "GNNs",
            "ideation": {"ideas": [{"title": "Sparse passing", "novelty": "high"}, "Plain idea"]}
        }))
        .unwrap();
        assert_eq!(
            render(&resp),
            vec!["# Ideas for GNNs", "", "1. Sparse passing", "   novelty: high", "", "2. Plain idea"]
        );
    }

    #[test]
    fn raw_output_is_shown_when_unparsed() {
        let resp: IdeationResponse =
            serde_json::from_value(json!({"topic": "RL", "ideation": {"ideas": [], "raw": "free text"}})).unwrap();
        assert_eq!(render(&resp), vec!["# Ideas for RL", "free text"]);
    }

    #[test]
    fn blank_optionals_are_dropped() {
        let mut panel = IdeationPanel::default();
        panel.form.fields[TOPIC].input.set("graph learning");
        panel.form.fields[GOAL].input.set("   ");
        let req = panel.request(Some(4)).unwrap();
        assert_eq!(req.goal, None);
        assert_eq!(req.workspace_id, Some(4));
        panel.form.fields[TOPIC].input.set(" ");
        assert!(panel.request(None).is_err());
    }
}
