use crossterm::event::{KeyCode, KeyEvent};
use paperclip_api::{validate, Citations, MindMap, Paper, PodcastScript, PopularTopic, QuickSearch, ResearchBundle};
use ratatui::{prelude::*, widgets::*};

use super::widgets::{draw_output, move_selection, scroll_by, value_lines, Status, TextInput};
use super::{PanelAction, ToastKind};
use crate::events::{Ctx, Inflight, Reply, Slot};
use crate::theme;

const RUN: Slot = "run";
const TOPICS: Slot = "topics";

const TOPIC_ROWS: usize = 8;
/// Rows above the popular-topic list: topic input, mode tabs, list header.
const LIST_TOP: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Suite,
    MindMap,
    Podcast,
    Citations,
    QuickSearch,
}

impl Mode {
    const ALL: [Mode; 5] = [Mode::Suite, Mode::MindMap, Mode::Podcast, Mode::Citations, Mode::QuickSearch];

    fn label(self) -> &'static str {
        match self {
            Mode::Suite => "Suite",
            Mode::MindMap => "Mind map",
            Mode::Podcast => "Podcast",
            Mode::Citations => "Citations",
            Mode::QuickSearch => "Quick search",
        }
    }

    fn cycle(self, forward: bool) -> Mode {
        let n = Self::ALL.len();
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[if forward { (i + 1) % n } else { (i + n - 1) % n }]
    }
}

#[derive(Default)]
pub struct ResearchPanel {
    pub(super) inflight: Inflight,
    topic: TextInput,
    mode: Mode,
    topics: Vec<PopularTopic>,
    topic_sel: Option<usize>,
    output: Vec<String>,
    status: Status,
    scroll: u16,
}

impl ResearchPanel {
    pub fn mount(&mut self, ctx: &Ctx) {
        let api = ctx.api.clone();
        ctx.spawn(&mut self.inflight, TOPICS, async move { Reply::Topics(api.popular_topics().await) });
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> PanelAction {
        match key.code {
            KeyCode::Enter => return self.run(ctx),
            KeyCode::Tab => self.mode = self.mode.cycle(true),
            KeyCode::BackTab => self.mode = self.mode.cycle(false),
            KeyCode::Up | KeyCode::Down => {
                let next = match self.topic_sel {
                    None => 0,
                    Some(sel) => move_selection(sel, self.topics.len(), key.code == KeyCode::Down),
                };
                self.pick_topic(next);
            }
            KeyCode::PageUp => scroll_by(&mut self.scroll, true),
            KeyCode::PageDown => scroll_by(&mut self.scroll, false),
            _ => {
                self.topic.handle(key);
            }
        }
        PanelAction::None
    }

    pub fn on_click(&mut self, row: u16) {
        if row >= LIST_TOP {
            let ix = usize::from(row - LIST_TOP);
            if ix < self.topics.len().min(TOPIC_ROWS) {
                self.pick_topic(ix);
            }
        }
    }

    pub fn on_scroll(&mut self, up: bool) {
        scroll_by(&mut self.scroll, up);
    }

    fn pick_topic(&mut self, ix: usize) {
        if let Some(t) = self.topics.get(ix) {
            self.topic_sel = Some(ix);
            self.topic.set(t.name.clone());
        }
    }

    fn run(&mut self, ctx: &Ctx) -> PanelAction {
        let topic = match validate::topic(self.topic.value()) {
            Ok(t) => t,
            Err(e) => {
                self.status = Status::error(&e);
                return PanelAction::None;
            }
        };
        let api = ctx.api.clone();
        let mode = self.mode;
        self.status = Status::loading(format!("{} for \"{topic}\"", mode.label()));
        self.scroll = 0;
        ctx.spawn(&mut self.inflight, RUN, async move {
            let text = match mode {
                Mode::Suite => api.research_suite(&topic).await.map(|b| render_bundle(&b)),
                Mode::MindMap => api.mindmap(&topic).await.map(|m| render_mindmap(&m)),
                Mode::Podcast => api.podcast(&topic).await.map(|p| render_podcast(&p)),
                Mode::Citations => api.citations(&topic).await.map(|c| render_citations(&c)),
                Mode::QuickSearch => api.quick_search(&topic).await.map(|q| render_quick_search(&q)),
            };
            Reply::Text(text.map(|lines| lines.join("\n")))
        });
        PanelAction::None
    }

    pub fn apply(&mut self, _slot: Slot, reply: Reply, _ctx: &Ctx) -> PanelAction {
        match reply {
            Reply::Topics(Ok(topics)) => {
                self.topics = topics;
                PanelAction::None
            }
            // the list is a convenience; stay quiet if it is unavailable
            Reply::Topics(Err(e)) => {
                tracing::debug!(error = %e, "popular topics unavailable");
                PanelAction::None
            }
            Reply::Text(Ok(text)) => {
                self.output = text.lines().map(str::to_string).collect();
                self.status = Status::Idle;
                PanelAction::None
            }
            Reply::Text(Err(e)) => {
                self.status = Status::error(&e);
                PanelAction::Toast(ToastKind::Error, e.to_string())
            }
            _ => PanelAction::None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let list_rows = u16::try_from(self.topics.len().min(TOPIC_ROWS)).unwrap_or(0);
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(list_rows),
            Constraint::Min(2),
        ])
        .split(area);

        let mut topic = vec![Span::styled("Topic: ", theme::label())];
        topic.extend(self.topic.line(rows[0].width.saturating_sub(7), focused).spans);
        f.render_widget(Paragraph::new(Line::from(topic)), rows[0]);

        let mut tabs = vec![Span::styled("Mode: ", theme::label())];
        for m in Mode::ALL {
            let style = if m == self.mode { theme::selected() } else { theme::label() };
            tabs.push(Span::styled(format!("[{}] ", m.label()), style));
        }
        f.render_widget(Paragraph::new(Line::from(tabs)), rows[1]);

        let header = if self.topics.is_empty() { "" } else { "Popular topics (↑/↓ or click)" };
        f.render_widget(Paragraph::new(Line::styled(header, theme::label())), rows[2]);
        let items: Vec<Line> = self
            .topics
            .iter()
            .take(TOPIC_ROWS)
            .enumerate()
            .map(|(i, t)| {
                let style = if self.topic_sel == Some(i) { theme::selected() } else { Style::default() };
                Line::styled(format!("  {}  · {} {}", t.name, t.category, t.trend), style)
            })
            .collect();
        f.render_widget(Paragraph::new(items), rows[3]);

        draw_output(f, rows[4], &self.status, &self.output, self.scroll, "Enter runs the selected mode; Tab switches mode.");
    }
}

fn push_papers(out: &mut Vec<String>, papers: &[Paper]) {
    for (i, p) in papers.iter().enumerate() {
        out.push(format!("{}. {}", i + 1, p.title));
        if !p.authors.is_empty() {
            out.push(format!("   {}", p.authors.join(", ")));
        }
        if let Some(url) = p.pdf_url.as_deref().or(p.doi.as_deref()) {
            out.push(format!("   {url}"));
        }
    }
}

fn push_section(out: &mut Vec<String>, title: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    out.push(String::new());
    out.push(format!("## {title}"));
    out.extend(body.lines().map(str::to_string));
}

fn render_bundle(b: &ResearchBundle) -> Vec<String> {
    let mut out = vec![format!("# {}", b.topic), format!("Papers ({})", b.papers.len())];
    push_papers(&mut out, &b.papers);
    let summaries = value_lines(&b.summaries);
    if !summaries.is_empty() {
        out.push(String::new());
        out.push("## Summaries".into());
        out.extend(summaries);
    }
    push_section(&mut out, "Mind map", &b.mind_map);
    push_section(&mut out, "Podcast script", &b.podcast_script);
    push_section(&mut out, "Code", &b.code_snippet);
    push_section(&mut out, "Experiment plan", &b.experiment_plan);
    push_section(&mut out, "Writing outline", &b.writing_outline);
    out
}

fn render_mindmap(m: &MindMap) -> Vec<String> {
    let mut out = vec![format!("# Mind map: {} ({} papers)", m.topic, m.papers_count)];
    out.extend(m.mermaid_code.lines().map(str::to_string));
    out
}

fn render_podcast(p: &PodcastScript) -> Vec<String> {
    let mut out = vec![format!("# Podcast: {} ({} papers)", p.topic, p.papers_count)];
    out.extend(p.script.lines().map(str::to_string));
    out
}

fn render_citations(c: &Citations) -> Vec<String> {
    let mut out = vec![format!("# Citations: {} ({} papers)", c.topic, c.total_papers)];
    push_papers(&mut out, &c.papers);
    push_section(&mut out, "Summary", &c.summary_with_citations);
    if !c.bibtex_entries.is_empty() {
        out.push(String::new());
        out.push("## BibTeX".into());
        for entry in &c.bibtex_entries {
            out.extend(entry.lines().map(str::to_string));
        }
    }
    out
}

fn render_quick_search(q: &QuickSearch) -> Vec<String> {
    let mut out = vec![format!("# Quick search: {}", q.topic)];
    let lines = value_lines(&q.suggestions);
    if lines.is_empty() {
        out.push("No suggestions.".into());
    } else {
        out.extend(lines);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn mode_cycles_both_ways() {
        assert_eq!(Mode::Suite.cycle(true), Mode::MindMap);
        assert_eq!(Mode::QuickSearch.cycle(true), Mode::Suite);
        assert_eq!(Mode::Suite.cycle(false), Mode::QuickSearch);
    }

    #[test]
    fn citations_list_papers_and_bibtex() {
        let c = Citations {
            topic: "GNNs".into(),
            papers: vec![Paper {
                title: "Graph Attention Networks".into(),
                authors: vec!["Veličković".into(), "Cucurull".into()],
                summary: String::new(),
                pdf_url: Some("https://arxiv.org/pdf/1710.10903".into()),
                doi: None,
                published: None,
            }],
            summary_with_citations: "GATs use attention [1].".into(),
            bibtex_entries: vec!["@article{gat,\n  title={GAT}\n}".into()],
            total_papers: 1,
        };
        assert_eq!(
            render_citations(&c),
            vec![
                "# Citations: GNNs (1 papers)",
                "1. Graph Attention Networks",
                "   Veličković, Cucurull",
                "   https://arxiv.org/pdf/1710.10903",
                "",
                "## Summary",
                "GATs use attention [1].",
                "",
                "## BibTeX",
                "@article{gat,",
                "  title={GAT}",
                "}",
            ]
        );
    }

    #[test]
    fn quick_search_accepts_any_shape() {
        let q = QuickSearch { topic: "qc".into(), suggestions: json!("1. Error correction\n2. Qubits") };
        assert_eq!(render_quick_search(&q), vec!["# Quick search: qc", "1. Error correction", "2. Qubits"]);
        let empty = QuickSearch { topic: "qc".into(), suggestions: json!([]) };
        assert_eq!(render_quick_search(&empty), vec!["# Quick search: qc", "No suggestions."]);
    }

    #[test]
    fn bundle_skips_empty_sections() {
        let b: ResearchBundle = serde_json::from_value(json!({
            "topic": "RL", "papers": [], "mind_map": "graph TD; A-->B", "podcast_script": ""
        }))
        .unwrap();
        assert_eq!(render_bundle(&b), vec!["# RL", "Papers (0)", "", "## Mind map", "graph TD; A-->B"]);
    }
}
