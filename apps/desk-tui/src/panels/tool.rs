use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{validate, ApiResult, QueryRequest};
use paperclip_wm::ToolKind;
use ratatui::{prelude::*, widgets::*};

use super::widgets::{draw_output, scroll_by, Form, Status};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const RUN: Slot = "run";

const TOPIC: usize = 0;
const UNIVERSITY: usize = 1;
const MODEL: usize = 2;

/// Form window for one research tool, invoked through `/query` with an
/// explicit command.
pub struct ToolPanel {
    pub(super) inflight: Inflight,
    tool: ToolKind,
    form: Form,
    output: Vec<String>,
    status: Status,
    scroll: u16,
}

fn blurb(tool: &ToolKind) -> &'static str {
    match tool {
        ToolKind::DomainDiscovery => "Map a research area: subfields, open problems, key venues.",
        ToolKind::PaperSummarizer => "Find and summarize recent papers on a topic.",
        ToolKind::ProfessorFinder => "Find professors working on a topic at a university.",
        ToolKind::DatasetHub => "Find datasets for a topic.",
        ToolKind::PretrainedModels => "Find pretrained models for a task.",
        ToolKind::GenerateCode => "Generate starter code for a topic with a given model.",
        ToolKind::Other(_) => "Run this tool on a topic.",
    }
}

impl ToolPanel {
    pub fn new(tool: ToolKind) -> Self {
        let label = if tool == ToolKind::GenerateCode { "Task" } else { "Topic" };
        let mut form = Form::new(&[label, "University", "Model"]);
        form.set_visible(UNIVERSITY, tool == ToolKind::ProfessorFinder);
        form.set_visible(MODEL, tool == ToolKind::GenerateCode);
        Self { inflight: Inflight::default(), tool, form, output: vec![], status: Status::Idle, scroll: 0 }
    }

    fn request(&self) -> ApiResult<QueryRequest> {
        let mut req = QueryRequest::new(validate::required("topic", self.form.value(TOPIC))?);
        req.command = Some(self.tool.name().to_string());
        req.tool_type = Some(self.tool.name().to_string());
        match self.tool {
            ToolKind::ProfessorFinder => {
                req.university = Some(validate::required("university", self.form.value(UNIVERSITY))?);
            }
            ToolKind::GenerateCode => {
                req.model_name = Some(validate::required("model", self.form.value(MODEL))?);
            }
            _ => {}
        }
        Ok(req)
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
        let mut req = match self.request() {
            Ok(r) => r,
            Err(e) => {
                self.status = Status::error(&e);
                return PanelAction::None;
            }
        };
        req.workspace_id = ctx.workspace_id();
        let api = ctx.api.clone();
        self.status = Status::loading(format!("running {}", self.tool.label()));
        self.scroll = 0;
        ctx.spawn(&mut self.inflight, RUN, async move { Reply::Text(api.query(&req).await) });
        PanelAction::None
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Text(Ok(text)) => {
                self.output = text.lines().map(str::to_string).collect();
                self.status = Status::Idle;
                PanelAction::None
            }
            Reply::Text(Err(e)) => {
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, format!("{}: {e}", self.tool.label()))
            }
            _ => PanelAction::None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(self.form.height()), Constraint::Min(2)])
            .split(area);
        f.render_widget(Paragraph::new(Line::styled(blurb(&self.tool), theme::label())), rows[0]);
        f.render_widget(Paragraph::new(self.form.lines(rows[1].width, focused)), rows[1]);
        draw_output(f, rows[2], &self.status, &self.output, self.scroll, "Fill in the form and press Enter.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn type_into(panel: &mut ToolPanel, text: &str) {
        for c in text.chars() {
            panel.form.handle(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn tab(panel: &mut ToolPanel) {
        panel.form.handle(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
    }

    #[test]
    fn professor_finder_needs_a_university() {
        let mut panel = ToolPanel::new(ToolKind::ProfessorFinder);
        type_into(&mut panel, "robotics");
        assert!(panel.request().is_err());
        tab(&mut panel);
        type_into(&mut panel, "MIT");
        let req = panel.request().unwrap();
        assert_eq!(req.command.as_deref(), Some("professor_finder"));
        assert_eq!(req.university.as_deref(), Some("MIT"));
        assert_eq!(req.model_name, None);
    }

    #[test]
    fn code_generation_skips_the_university_field() {
        let mut panel = ToolPanel::new(ToolKind::GenerateCode);
        type_into(&mut panel, "image classifier");
        tab(&mut panel);
        type_into(&mut panel, "resnet50");
        let req = panel.request().unwrap();
        assert_eq!(req.query, "image classifier");
        assert_eq!(req.model_name.as_deref(), Some("resnet50"));
        assert_eq!(req.university, None);
    }

    #[test]
    fn unknown_tools_send_their_own_name() {
        let mut panel = ToolPanel::new(ToolKind::Other("citation_graph".into()));
        assert_eq!(panel.form.height(), 1);
        type_into(&mut panel, "transformers");
        assert_eq!(panel.request().unwrap().command.as_deref(), Some("citation_graph"));
    }
}
