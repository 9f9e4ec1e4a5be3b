//! Drawing window frames. Geometry comes from `paperclip_wm` in signed cells,
//! so windows may hang off any screen edge; everything here clips to the
//! visible area before touching the frame buffer.

use paperclip_wm as wm;
use paperclip_wm::{FrameLayout, WindowRecord};
use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::panels::Panel;
use crate::theme;

pub const TASKBAR_HEIGHT: u16 = 1;

/// Screen minus the taskbar row.
pub fn work_area(screen: Rect) -> wm::Rect {
    wm::Rect::new(
        i32::from(screen.x),
        i32::from(screen.y),
        screen.width,
        screen.height.saturating_sub(TASKBAR_HEIGHT),
    )
}

pub fn taskbar_area(screen: Rect) -> Rect {
    let h = TASKBAR_HEIGHT.min(screen.height);
    Rect::new(screen.x, screen.y + screen.height - h, screen.width, h)
}

pub fn to_screen(r: wm::Rect) -> Rect {
    clip(r, Rect::new(0, 0, u16::MAX, u16::MAX)).unwrap_or_default()
}

/// Visible part of `r` inside `bounds`, or `None` when nothing is visible.
pub fn clip(r: wm::Rect, bounds: Rect) -> Option<Rect> {
    let x0 = r.x.max(i32::from(bounds.x));
    let y0 = r.y.max(i32::from(bounds.y));
    let x1 = r.right().min(i32::from(bounds.x) + i32::from(bounds.width));
    let y1 = r.bottom().min(i32::from(bounds.y) + i32::from(bounds.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        u16::try_from(x0).ok()?,
        u16::try_from(y0).ok()?,
        u16::try_from(x1 - x0).ok()?,
        u16::try_from(y1 - y0).ok()?,
    ))
}

/// Borders of `outer` that fall inside `bounds`.
fn visible_borders(outer: wm::Rect, bounds: Rect) -> Borders {
    let mut b = Borders::NONE;
    if outer.y >= i32::from(bounds.y) {
        b |= Borders::TOP;
    }
    if outer.x >= i32::from(bounds.x) {
        b |= Borders::LEFT;
    }
    if outer.right() <= i32::from(bounds.x) + i32::from(bounds.width) {
        b |= Borders::RIGHT;
    }
    if outer.bottom() <= i32::from(bounds.y) + i32::from(bounds.height) {
        b |= Borders::BOTTOM;
    }
    b
}

fn truncate_to(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    for c in s.chars() {
        if out.width() + unicode_width::UnicodeWidthChar::width(c).unwrap_or(0) + 1 > width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

/// Paints one window: clears its area, draws the visible border pieces,
/// the title and the `[_][□][x]` buttons, then lets the panel fill the body.
pub fn draw_window(f: &mut Frame, w: &WindowRecord, work: wm::Rect, focused: bool, panel: Option<&Panel>) {
    let bounds = to_screen(work);
    let layout = FrameLayout::for_window(w, work);
    let Some(outer) = clip(layout.outer, bounds) else { return };

    let borders = visible_borders(layout.outer, bounds);
    let border_style = if focused { theme::border_focused() } else { theme::border_unfocused() };
    f.render_widget(Clear, outer);
    f.render_widget(Block::default().borders(borders).border_type(BorderType::Plain).border_style(border_style).style(theme::body()), outer);

    if borders.contains(Borders::TOP) {
        let title_x = layout.outer.x + 2;
        let room = usize::try_from(layout.minimize.x - title_x - 1).unwrap_or(0);
        if room > 2 {
            let text = format!(" {} ", truncate_to(&w.title, room - 2));
            let title_style = if focused { theme::title_focused() } else { theme::title_unfocused() };
            let area = wm::Rect::new(title_x, layout.outer.y, u16::try_from(text.width()).unwrap_or(0), 1);
            if let Some(r) = clip(area, bounds) {
                f.render_widget(Paragraph::new(Span::styled(text, title_style)), r);
            }
        }
        for (rect, label, style) in [
            (layout.minimize, "[_]", theme::button()),
            (layout.maximize, if w.maximized { "[❐]" } else { "[□]" }, theme::button()),
            (layout.close, "[x]", theme::button_close()),
        ] {
            // buttons are drawn only when fully on screen
            if let Some(r) = clip(rect, bounds).filter(|r| r.width == rect.width) {
                f.render_widget(Paragraph::new(Span::styled(label, style)), r);
            }
        }
    }

    if let (Some(body), Some(panel)) = (clip(layout.body, bounds), panel) {
        panel.draw(f, body, focused);
    }
}
