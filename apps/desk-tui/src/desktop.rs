//! Desktop background: launcher icons down the left edge and the taskbar
//! along the bottom row.

use paperclip_wm as wm;
use paperclip_wm::{PanelKind, Point, TaskbarEntry, WindowId};
use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::chrome::clip;
use crate::theme;

const ICON_WIDTH: u16 = 16;
const TASK_MAX_TITLE: usize = 18;

/// Icon hit boxes in launcher order; icons that do not fit are dropped.
pub fn icon_rects(work: wm::Rect) -> Vec<(PanelKind, wm::Rect)> {
    PanelKind::LAUNCHERS
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let y = work.y + 1 + 2 * i32::try_from(i).unwrap_or(0);
            (kind.clone(), wm::Rect::new(work.x + 1, y, ICON_WIDTH, 1))
        })
        .filter(|(_, r)| r.bottom() <= work.bottom())
        .collect()
}

pub fn icon_at(p: Point, work: wm::Rect) -> Option<PanelKind> {
    icon_rects(work).into_iter().find(|(_, r)| r.contains(p)).map(|(k, _)| k)
}

fn icon_text(kind: &PanelKind, hotkey: usize) -> String {
    format!("[F{hotkey}] {}", kind.icon_label())
}

pub fn draw_desktop(f: &mut Frame, work: wm::Rect) {
    let Some(area) = clip(work, f.area()) else { return };
    f.render_widget(Block::default().style(theme::desktop()), area);
    for (i, (kind, rect)) in icon_rects(work).into_iter().enumerate() {
        if let Some(r) = clip(rect, area) {
            f.render_widget(Paragraph::new(Span::styled(icon_text(&kind, i + 1), theme::icon())), r);
        }
    }
}

fn task_label(e: &TaskbarEntry) -> String {
    let title = if e.title.width() > TASK_MAX_TITLE {
        let cut: String = e.title.chars().take(TASK_MAX_TITLE - 1).collect();
        format!("{cut}…")
    } else {
        e.title.clone()
    };
    if e.minimized { format!(" ({title}) ") } else { format!(" {title} ") }
}

/// Cells kept free on the right of the taskbar for `label`.
pub fn label_reserve(label: &str) -> u16 {
    u16::try_from(label.width() + 2).unwrap_or(u16::MAX)
}

/// Taskbar buttons left to right, leaving `reserved` cells free on the right.
pub fn task_buttons(entries: &[TaskbarEntry], bar: wm::Rect, reserved: u16) -> Vec<(WindowId, wm::Rect)> {
    let limit = bar.right() - i32::from(reserved);
    let mut x = bar.x + 1;
    let mut out = Vec::new();
    for e in entries {
        let w = u16::try_from(task_label(e).width()).unwrap_or(u16::MAX);
        if x + i32::from(w) > limit {
            break;
        }
        out.push((e.id.clone(), wm::Rect::new(x, bar.y, w, 1)));
        x += i32::from(w) + 1;
    }
    out
}

pub fn task_at(entries: &[TaskbarEntry], bar: wm::Rect, reserved: u16, p: Point) -> Option<WindowId> {
    task_buttons(entries, bar, reserved).into_iter().find(|(_, r)| r.contains(p)).map(|(id, _)| id)
}

pub fn draw_taskbar(f: &mut Frame, area: Rect, entries: &[TaskbarEntry], right_label: &str) {
    f.render_widget(Block::default().style(theme::taskbar()), area);
    let bar = wm::Rect::new(i32::from(area.x), i32::from(area.y), area.width, area.height);
    let reserved = label_reserve(right_label);
    for (e, (_, rect)) in entries.iter().zip(task_buttons(entries, bar, reserved)) {
        let style = if e.focused {
            theme::task_active()
        } else if e.minimized {
            theme::task_minimized()
        } else {
            theme::task_inactive()
        };
        if let Some(r) = clip(rect, area) {
            f.render_widget(Paragraph::new(Span::styled(task_label(e), style)), r);
        }
    }
    f.render_widget(Paragraph::new(Span::styled(format!("{right_label} "), theme::status())).alignment(Alignment::Right), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperclip_wm::WindowHost;
    use pretty_assertions::assert_eq;

    const WORK: wm::Rect = wm::Rect::new(0, 0, 120, 40);

    #[test]
    fn icons_stack_every_other_row() {
        let icons = icon_rects(WORK);
        assert_eq!(icons.len(), PanelKind::LAUNCHERS.len());
        assert_eq!(icon_at(Point::new(3, 1), WORK), Some(PanelKind::Chat));
        assert_eq!(icon_at(Point::new(3, 2), WORK), None);
        assert_eq!(icon_at(Point::new(3, 15), WORK), Some(PanelKind::Account));
        assert_eq!(icon_at(Point::new(40, 1), WORK), None);
    }

    #[test]
    fn short_desktops_drop_trailing_icons() {
        let icons = icon_rects(wm::Rect::new(0, 0, 80, 6));
        assert_eq!(icons.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(), vec![PanelKind::Chat, PanelKind::Research, PanelKind::Tools]);
    }

    #[test]
    fn taskbar_buttons_hit_their_window() {
        let mut host = WindowHost::new();
        let chat = host.open(PanelKind::Chat);
        let stats = host.open(PanelKind::Stats);
        host.minimize(&chat);
        let bar = wm::Rect::new(0, 40, 120, 1);
        let entries = host.taskbar();
        let buttons = task_buttons(&entries, bar, 20);
        assert_eq!(buttons.len(), 2);
        // " (Research Chat) " is 17 cells wide starting at x=1
        assert_eq!(buttons[0].1, wm::Rect::new(1, 40, 17, 1));
        assert_eq!(task_at(&entries, bar, 20, Point::new(5, 40)), Some(chat));
        assert_eq!(task_at(&entries, bar, 20, Point::new(20, 40)), Some(stats));
        assert_eq!(task_at(&entries, bar, 20, Point::new(18, 40)), None);
    }

    #[test]
    fn taskbar_stops_before_the_reserved_area() {
        let mut host = WindowHost::new();
        host.open(PanelKind::Chat);
        host.open(PanelKind::Research);
        let bar = wm::Rect::new(0, 20, 40, 1);
        assert_eq!(task_buttons(&host.taskbar(), bar, 10).len(), 1);
    }
}
