use ratatui::style::{Color, Modifier, Style};
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode { AmberDark = 0, Default = 1 }

static MODE: AtomicU8 = AtomicU8::new(Mode::AmberDark as u8);

pub fn set_mode(m: Mode) { MODE.store(m as u8, Ordering::Relaxed); }
pub fn toggle_mode() {
    let next = if mode() == Mode::AmberDark { Mode::Default } else { Mode::AmberDark };
    set_mode(next);
}
fn mode() -> Mode { if MODE.load(Ordering::Relaxed) == Mode::AmberDark as u8 { Mode::AmberDark } else { Mode::Default } }
pub fn mode_name() -> &'static str { match mode() { Mode::AmberDark => "AmberDark", Mode::Default => "Default" } }

/// Config value to mode; anything unrecognised keeps amber.
pub fn mode_from_name(name: &str) -> Mode {
    match name.trim().to_ascii_lowercase().as_str() {
        "default" | "plain" => Mode::Default,
        _ => Mode::AmberDark,
    }
}

// Palette
pub fn bg() -> Color { match mode() { Mode::AmberDark => Color::Rgb(10,10,10), Mode::Default => Color::Black } }
pub fn fg() -> Color { match mode() { Mode::AmberDark => Color::Rgb(220,220,220), Mode::Default => Color::White } }
pub fn accent() -> Color { match mode() { Mode::AmberDark => Color::Rgb(255,179,0), Mode::Default => Color::Cyan } }
pub fn muted() -> Color { match mode() { Mode::AmberDark => Color::Rgb(150,150,150), Mode::Default => Color::Gray } }
pub fn desktop_bg() -> Color { match mode() { Mode::AmberDark => Color::Rgb(18,14,6), Mode::Default => Color::Rgb(0,40,60) } }

// Windows use a slightly lighter bg than the desktop for contrast
pub fn panel_bg() -> Color {
    match mode() {
        Mode::AmberDark => Color::Rgb(22, 22, 22),
        Mode::Default => Color::Rgb(30, 30, 30),
    }
}

// Common styles
pub fn desktop() -> Style { Style::default().bg(desktop_bg()).fg(muted()) }
pub fn body() -> Style { Style::default().bg(panel_bg()).fg(fg()) }
pub fn border_focused() -> Style { Style::default().fg(accent()).bg(panel_bg()) }
pub fn border_unfocused() -> Style { Style::default().fg(muted()).bg(panel_bg()) }
pub fn title_focused() -> Style { Style::default().fg(accent()).add_modifier(Modifier::BOLD) }
pub fn title_unfocused() -> Style { Style::default().fg(muted()) }
pub fn button() -> Style { Style::default().fg(fg()).bg(panel_bg()) }
pub fn button_close() -> Style { Style::default().fg(Color::Red).bg(panel_bg()) }
pub fn selected() -> Style { Style::default().fg(accent()).add_modifier(Modifier::BOLD) }
pub fn label() -> Style { Style::default().fg(muted()) }
pub fn cursor() -> Style { Style::default().add_modifier(Modifier::REVERSED) }
pub fn icon() -> Style { Style::default().fg(fg()).bg(desktop_bg()) }
pub fn taskbar() -> Style { Style::default().bg(Color::Rgb(34, 34, 34)).fg(fg()) }
pub fn task_active() -> Style { Style::default().bg(accent()).fg(Color::Black).add_modifier(Modifier::BOLD) }
pub fn task_minimized() -> Style { Style::default().bg(Color::Rgb(34, 34, 34)).fg(muted()).add_modifier(Modifier::ITALIC) }
pub fn task_inactive() -> Style { Style::default().bg(Color::Rgb(50, 50, 50)).fg(fg()) }
pub fn status() -> Style { Style::default().fg(muted()) }
pub fn status_ok() -> Style { Style::default().fg(Color::Green) }
pub fn status_warn() -> Style { Style::default().fg(Color::Yellow) }
pub fn status_err() -> Style { Style::default().fg(Color::Red) }
