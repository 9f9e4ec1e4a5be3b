use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{Health, Stats};
use ratatui::{prelude::*, widgets::*};

use super::widgets::Status;
use super::PanelAction;
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const STATS: Slot = "stats";
const HEALTH: Slot = "health";

/// Usage counters and service health, refreshed on a timer while open.
#[derive(Default)]
pub struct StatsPanel {
    pub(super) inflight: Inflight,
    stats: Option<Stats>,
    health: Option<Result<Health, String>>,
    status: Status,
    last_poll: Option<Instant>,
}

impl StatsPanel {
    pub fn mount(&mut self, ctx: &Ctx, now: Instant) {
        self.poll(ctx, now);
    }

    fn poll(&mut self, ctx: &Ctx, now: Instant) {
        self.last_poll = Some(now);
        if !self.inflight.is_pending(STATS) {
            let api = ctx.api.clone();
            ctx.spawn(&mut self.inflight, STATS, async move { Reply::Stats(api.stats().await) });
        }
        if !self.inflight.is_pending(HEALTH) {
            let api = ctx.api.clone();
            ctx.spawn(&mut self.inflight, HEALTH, async move { Reply::Health(api.health().await) });
        }
    }

    pub fn tick(&mut self, now: Instant, ctx: &Ctx) {
        let due = self.last_poll.map_or(true, |t| now.saturating_duration_since(t) >= ctx.stats_poll);
        if due {
            self.poll(ctx, now);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        if key.code == KeyCode::Char('r') {
            self.poll(ctx, Instant::now());
        }
        PanelAction::None
    }

    pub fn on_scroll(&mut self, _up: bool) {}

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Stats(Ok(stats)) => {
                self.stats = Some(stats);
                self.status = Status::Idle;
            }
            // polled: keep the last good numbers and only note the failure
            Reply::Stats(Err(e)) => self.status = Status::error(&e),
            Reply::Health(res) => self.health = Some(res.map_err(|e| e.to_string())),
            _ => {}
        }
        PanelAction::None
    }

    fn rows(&self) -> Vec<(String, String)> {
        let Some(s) = &self.stats else { return vec![] };
        let mut rows = vec![
            ("Queries".to_string(), s.total_queries.to_string()),
            ("Papers found".to_string(), s.papers_found.to_string()),
            ("Code snippets".to_string(), s.code_snippets.to_string()),
            ("Avg response".to_string(), format!("{:.1}s", s.avg_response_time)),
        ];
        let catalog = [
            ("Research papers", &s.research_papers),
            ("Datasets", &s.datasets),
            ("Models", &s.models),
            ("Universities", &s.universities),
            ("Researchers", &s.active_researchers),
        ];
        rows.extend(catalog.into_iter().filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone()))));
        rows
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, _focused: bool) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).split(area);
        let health = match &self.health {
            None => Line::styled("Service: checking…", theme::status()),
            Some(Ok(h)) if h.is_ok() => {
                let version = h.version.as_deref().map(|v| format!(" v{v}")).unwrap_or_default();
                let tools = h.tools_available.map(|n| format!(" · {n} tools")).unwrap_or_default();
                Line::styled(format!("Service: {}{version}{tools}", h.status), theme::status_ok())
            }
            Some(Ok(h)) => Line::styled(format!("Service: {}", h.status), theme::status_warn()),
            Some(Err(e)) => Line::styled(format!("Service: unreachable ({e})"), theme::status_err()),
        };
        f.render_widget(Paragraph::new(health), rows[0]);
        f.render_widget(Paragraph::new(self.status.line()), rows[1]);
        let table_rows: Vec<Row> = self
            .rows()
            .into_iter()
            .map(|(k, v)| Row::new(vec![Cell::from(Span::styled(k, theme::label())), Cell::from(v)]))
            .collect();
        let table = Table::new(table_rows, [Constraint::Length(18), Constraint::Min(8)]);
        f.render_widget(table, rows[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::harness::Harness;
    use paperclip_wm::PanelKind;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[tokio::test]
    async fn polls_again_only_after_the_interval() {
        let h = Harness::new();
        let ctx = h.ctx(PanelKind::Stats);
        let mut panel = StatsPanel::default();
        let t0 = Instant::now();
        panel.mount(&ctx, t0);
        let first = h.tickets.load(std::sync::atomic::Ordering::Relaxed);
        assert_eq!(first, 2);
        panel.tick(t0 + Duration::from_secs(3), &ctx);
        assert_eq!(h.tickets.load(std::sync::atomic::Ordering::Relaxed), 2);
        // still in flight, so nothing new is issued even when due
        panel.tick(t0 + Duration::from_secs(10), &ctx);
        assert_eq!(h.tickets.load(std::sync::atomic::Ordering::Relaxed), 2);
        assert_eq!(panel.last_poll, Some(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn failed_poll_keeps_previous_numbers() {
        let h = Harness::new();
        let ctx = h.ctx(PanelKind::Stats);
        let mut panel = StatsPanel::default();
        panel.apply(STATS, Reply::Stats(Ok(Stats { total_queries: 4, ..Stats::default() })), &ctx);
        panel.apply(STATS, Reply::Stats(Err(paperclip_api::ApiError::Transport("refused".into()))), &ctx);
        assert_eq!(panel.rows()[0], ("Queries".to_string(), "4".to_string()));
        assert_eq!(panel.status, Status::Error("refused".into()));
    }
}
