//! Small building blocks shared by the panels: a single-line editor, a
//! labelled form, a status line and text helpers.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use paperclip_api::ApiError;
use ratatui::{prelude::*, widgets::*};
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme;

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Cursor position in chars.
    cursor: usize,
    masked: bool,
}

impl TextInput {
    pub fn masked() -> Self {
        Self { masked: true, ..Self::default() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, v: impl Into<String>) {
        self.value = v.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    fn byte_at(&self, char_ix: usize) -> usize {
        self.value.char_indices().nth(char_ix).map(|(b, _)| b).unwrap_or(self.value.len())
    }

    /// Applies an editing key. Returns false for keys it does not handle.
    pub fn handle(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Char(c) => {
                let at = self.byte_at(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_at(self.cursor);
                self.value.remove(at);
            }
            KeyCode::Delete if self.cursor < len => {
                let at = self.byte_at(self.cursor);
                self.value.remove(at);
            }
            KeyCode::Backspace | KeyCode::Delete => {}
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }

    /// Renders the value, scrolled so the cursor stays within `width` cells.
    pub fn line(&self, width: u16, focused: bool) -> Line<'static> {
        let shown: String = if self.masked { "•".repeat(self.value.chars().count()) } else { self.value.clone() };
        let chars: Vec<char> = shown.chars().collect();
        let width = usize::from(width.max(1));
        // keep one cell for the cursor
        let mut start = 0;
        let mut used: usize = chars[..self.cursor.min(chars.len())].iter().map(|c| c.width().unwrap_or(0)).sum();
        while used >= width && start < self.cursor {
            used -= chars[start].width().unwrap_or(0);
            start += 1;
        }
        let before: String = chars[start..self.cursor.min(chars.len())].iter().collect();
        let at: String = chars.get(self.cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".into());
        let after: String = chars.iter().skip(self.cursor + 1).collect();
        if focused {
            Line::from(vec![Span::raw(before), Span::styled(at, theme::cursor()), Span::raw(after)])
        } else {
            Line::from(chars[start..].iter().collect::<String>())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub input: TextInput,
    pub visible: bool,
}

/// A column of labelled inputs. Tab / Shift-Tab / Up / Down move between
/// visible fields.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(labels: &[&'static str]) -> Self {
        let fields = labels.iter().map(|&label| Field { label, input: TextInput::default(), visible: true }).collect();
        Self { fields, focus: 0 }
    }

    pub fn masked(mut self, ix: usize) -> Self {
        if let Some(f) = self.fields.get_mut(ix) {
            f.input = TextInput::masked();
        }
        self
    }

    pub fn value(&self, ix: usize) -> &str {
        self.fields.get(ix).map(|f| f.input.value()).unwrap_or("")
    }

    pub fn set_visible(&mut self, ix: usize, visible: bool) {
        if let Some(f) = self.fields.get_mut(ix) {
            f.visible = visible;
        }
        if !self.fields.get(self.focus).is_some_and(|f| f.visible) {
            self.focus = 0;
        }
    }

    fn step(&mut self, forward: bool) {
        let n = self.fields.len();
        if n == 0 {
            return;
        }
        for i in 1..=n {
            let ix = if forward { (self.focus + i) % n } else { (self.focus + n - i) % n };
            if self.fields[ix].visible {
                self.focus = ix;
                return;
            }
        }
    }

    /// Navigation and editing; Enter is left to the caller.
    pub fn handle(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.step(true),
            KeyCode::BackTab | KeyCode::Up => self.step(false),
            _ => {
                return self.fields.get_mut(self.focus).is_some_and(|f| f.input.handle(key));
            }
        }
        true
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.fields.iter().filter(|f| f.visible).count()).unwrap_or(u16::MAX)
    }

    pub fn lines(&self, width: u16, focused: bool) -> Vec<Line<'static>> {
        let label_w = self.fields.iter().map(|f| f.label.width()).max().unwrap_or(0) + 2;
        let input_w = width.saturating_sub(u16::try_from(label_w).unwrap_or(width));
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.visible)
            .map(|(i, f)| {
                let here = focused && i == self.focus;
                let label_style = if here { theme::selected() } else { theme::label() };
                let mut spans = vec![Span::styled(format!("{:<w$}", format!("{}:", f.label), w = label_w), label_style)];
                spans.extend(f.input.line(input_w, here).spans);
                Line::from(spans)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading(String),
    Error(String),
    Note(String),
}

impl Status {
    pub fn loading(what: impl Into<String>) -> Self {
        Status::Loading(what.into())
    }

    pub fn error(e: &ApiError) -> Self {
        Status::Error(e.to_string())
    }

    pub fn line(&self) -> Line<'static> {
        match self {
            Status::Idle => Line::from(""),
            Status::Loading(what) => Line::styled(format!("⏳ {what}…"), theme::status_warn()),
            Status::Error(msg) => Line::styled(format!("✗ {msg}"), theme::status_err()),
            Status::Note(msg) => Line::styled(msg.clone(), theme::status_ok()),
        }
    }
}

pub fn wrap_text_lines(text: &str, inner_width: u16) -> Vec<String> {
    if inner_width == 0 { return vec![String::new()]; }
    let w = inner_width as usize;
    let mut out: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let mut cur = String::new();
        let mut cur_w = 0usize;
        for ch in raw.chars() {
            let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
            if cur_w > 0 && cur_w + cw > w {
                out.push(std::mem::take(&mut cur));
                cur_w = 0;
            }
            cur.push(ch);
            cur_w += cw;
        }
        out.push(cur);
    }
    out
}

/// Indented plain-text rendering of loosely structured model output.
pub fn value_lines(v: &Value) -> Vec<String> {
    let mut out = Vec::new();
    push_value(&mut out, v, 0);
    out
}

fn push_value(out: &mut Vec<String>, v: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Null => {}
        Value::String(s) => out.extend(s.lines().map(|l| format!("{pad}{l}"))),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        push_value(out, item, indent);
                        out.push(String::new());
                    }
                    other => out.push(format!("{pad}• {}", scalar(other))),
                }
            }
        }
        Value::Object(map) => {
            for (k, val) in map {
                let key = k.replace('_', " ");
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        out.push(format!("{pad}{key}:"));
                        push_value(out, val, indent + 1);
                    }
                    Value::String(s) if s.contains('\n') => {
                        out.push(format!("{pad}{key}:"));
                        push_value(out, val, indent + 1);
                    }
                    Value::Null => {}
                    other => out.push(format!("{pad}{key}: {}", scalar(other))),
                }
            }
        }
        other => out.push(format!("{pad}{}", scalar(other))),
    }
}

fn scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Scrollable, wrapped text block with a status line on top.
pub fn draw_output(f: &mut Frame, area: Rect, status: &Status, text: &[String], scroll: u16, placeholder: &str) {
    if area.height == 0 {
        return;
    }
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);
    f.render_widget(Paragraph::new(status.line()), rows[0]);
    let lines: Vec<Line> = if text.is_empty() {
        vec![Line::styled(placeholder.to_string(), theme::label())]
    } else {
        text.iter().map(|l| Line::from(l.clone())).collect()
    };
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)), rows[1]);
}

pub fn scroll_by(scroll: &mut u16, up: bool) {
    *scroll = if up { scroll.saturating_sub(3) } else { scroll.saturating_add(3) };
}

/// Selection index after moving `delta` within a list of `len` items.
pub fn move_selection(sel: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        0
    } else if down {
        (sel + 1).min(len - 1)
    } else {
        sel.saturating_sub(1)
    }
}
