use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::ToolInfo;
use paperclip_wm::{PanelKind, ToolKind};
use ratatui::{prelude::*, widgets::*};

use super::widgets::{move_selection, Status};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const LIST: Slot = "list";
/// The list starts below the status line.
const LIST_TOP: u16 = 1;

#[derive(Default)]
pub struct ToolsPanel {
    pub(super) inflight: Inflight,
    tools: Vec<ToolInfo>,
    sel: usize,
    status: Status,
}

impl ToolsPanel {
    pub fn mount(&mut self, ctx: &Ctx) {
        self.refresh(ctx);
    }

    fn refresh(&mut self, ctx: &Ctx) {
        let api = ctx.api.clone();
        self.status = Status::loading("loading tools");
        ctx.spawn(&mut self.inflight, LIST, async move { Reply::Tools(api.tools().await) });
    }

    fn launch(&self) -> PanelAction {
        match self.tools.get(self.sel) {
            Some(t) => PanelAction::Open(PanelKind::Tool(ToolKind::from_name(&t.name))),
            None => PanelAction::None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        match key.code {
            KeyCode::Up => self.sel = move_selection(self.sel, self.tools.len(), false),
            KeyCode::Down => self.sel = move_selection(self.sel, self.tools.len(), true),
            KeyCode::Enter => return self.launch(),
            KeyCode::Char('r') => self.refresh(ctx),
            _ => {}
        }
        PanelAction::None
    }

    /// A click on a tool row launches it.
    pub fn on_click(&mut self, row: u16) -> PanelAction {
        let Some(ix) = row.checked_sub(LIST_TOP).map(usize::from) else { return PanelAction::None };
        if ix < self.tools.len() {
            self.sel = ix;
            self.launch()
        } else {
            PanelAction::None
        }
    }

    pub fn on_scroll(&mut self, up: bool) {
        self.sel = move_selection(self.sel, self.tools.len(), !up);
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Tools(Ok(catalog)) => {
                self.status = Status::Note(format!("{} tools · Enter or click to open · r refresh", catalog.tools.len()));
                self.tools = catalog.tools;
                self.sel = self.sel.min(self.tools.len().saturating_sub(1));
                PanelAction::None
            }
            Reply::Tools(Err(e)) => {
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, e.to_string())
            }
            _ => PanelAction::None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let rows = Layout::vertical([Constraint::Length(LIST_TOP), Constraint::Min(0)]).split(area);
        f.render_widget(Paragraph::new(self.status.line()), rows[0]);
        let items: Vec<ListItem> = self
            .tools
            .iter()
            .map(|t| {
                let label = ToolKind::from_name(&t.name).label();
                let desc = if t.description.is_empty() { String::new() } else { format!(" · {}", t.description) };
                ListItem::new(Line::from(vec![Span::raw(label), Span::styled(desc, theme::label())]))
            })
            .collect();
        let mut state = ListState::default();
        if !self.tools.is_empty() {
            state.select(Some(self.sel));
        }
        let highlight = if focused { theme::selected() } else { Style::default() };
        f.render_stateful_widget(List::new(items).highlight_style(highlight), rows[1], &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::harness::Harness;
    use paperclip_api::ToolCatalog;
    use pretty_assertions::assert_eq;

    fn loaded(names: &[&str]) -> ToolsPanel {
        let mut panel = ToolsPanel::default();
        panel.tools = names
            .iter()
            .map(|n| ToolInfo { name: n.to_string(), description: String::new(), capabilities: vec![] })
            .collect();
        panel
    }

    #[test]
    fn click_opens_the_tool_under_the_pointer() {
        let mut panel = loaded(&["domain_discovery", "dataset_hub", "citation_graph"]);
        assert_eq!(panel.on_click(0), PanelAction::None);
        assert_eq!(panel.on_click(2), PanelAction::Open(PanelKind::Tool(ToolKind::DatasetHub)));
        assert_eq!(panel.on_click(3), PanelAction::Open(PanelKind::Tool(ToolKind::Other("citation_graph".into()))));
        assert_eq!(panel.on_click(9), PanelAction::None);
    }

    #[test]
    fn empty_list_launches_nothing() {
        let panel = ToolsPanel::default();
        assert_eq!(panel.launch(), PanelAction::None);
    }

    #[test]
    fn reload_clamps_selection() {
        let mut panel = loaded(&["a", "b", "c"]);
        panel.sel = 2;
        let catalog = ToolCatalog { tools: loaded(&["a"]).tools, total_count: 1 };
        let h = Harness::new();
        let ctx = h.ctx(PanelKind::Tools);
        panel.apply(LIST, Reply::Tools(Ok(catalog)), &ctx);
        assert_eq!(panel.sel, 0);
    }
}
