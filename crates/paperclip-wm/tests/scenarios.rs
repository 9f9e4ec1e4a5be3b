use paperclip_wm::{PanelKind, Point, Rect, Size, ToolKind, WindowHost, MIN_HEIGHT, MIN_WIDTH};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn max_z(host: &WindowHost) -> u64 {
    host.windows().iter().map(|w| w.z_index).max().unwrap_or(0)
}

#[test]
fn repeated_open_never_duplicates_a_kind() {
    let mut host = WindowHost::new();
    let kinds = [
        PanelKind::Chat,
        PanelKind::Research,
        PanelKind::Chat,
        PanelKind::Tool(ToolKind::DatasetHub),
        PanelKind::Research,
        PanelKind::Tool(ToolKind::DatasetHub),
        PanelKind::Tool(ToolKind::GenerateCode),
        PanelKind::Chat,
    ];
    for kind in kinds {
        host.open(kind);
        let distinct: HashSet<_> = host.windows().iter().map(|w| w.kind.clone()).collect();
        assert_eq!(distinct.len(), host.len());
    }
    assert_eq!(host.len(), 4);
}

#[test]
fn reopen_only_touches_minimized_and_z() {
    let mut host = WindowHost::new();
    let chat = host.open(PanelKind::Chat);
    host.move_to(&chat, Point::new(30, 9));
    host.resize(&chat, Size::new(40, 12));
    let before = host.get(&chat).cloned();
    host.open(PanelKind::Research);
    let again = host.open(PanelKind::Chat);
    assert_eq!(again, chat);
    let after = host.get(&chat).cloned();
    let (before, after) = (before.expect("chat window"), after.expect("chat window"));
    assert_eq!((after.position, after.size, after.title.clone()), (before.position, before.size, before.title.clone()));
    assert!(after.z_index > before.z_index);
}

#[test]
fn focus_gives_the_maximum_z() {
    let mut host = WindowHost::new();
    let ids: Vec<_> = [PanelKind::Chat, PanelKind::Research, PanelKind::Stats, PanelKind::Tools]
        .into_iter()
        .map(|k| host.open(k))
        .collect();
    for id in ids.iter().rev().chain(ids.iter()) {
        host.focus(id);
        assert_eq!(host.get(id).map(|w| w.z_index), Some(max_z(&host)));
        assert_eq!(host.focused(), Some(id));
    }
}

#[test]
fn maximized_windows_ignore_move_and_resize() {
    let mut host = WindowHost::new();
    let w = host.open(PanelKind::Workspaces);
    host.move_to(&w, Point::new(12, 7));
    host.maximize(&w);
    let stored = host.get(&w).map(|r| (r.position, r.size));
    host.move_to(&w, Point::new(0, 0));
    host.resize(&w, Size::new(100, 40));
    assert!(!host.begin_drag(&w, Point::new(15, 7)));
    assert!(!host.begin_resize(&w, Point::new(15, 7)));
    assert_eq!(host.get(&w).map(|r| (r.position, r.size)), stored);
    assert_eq!(stored.map(|s| s.0), Some(Point::new(12, 7)));
}

#[test]
fn resize_never_goes_below_floor() {
    let mut host = WindowHost::new();
    let w = host.open(PanelKind::Chat);
    for delta in [-1_i32, -10, -1000, -100_000, i32::MIN / 2] {
        let origin = Point::new(50, 20);
        assert!(host.begin_resize(&w, origin));
        host.pointer_moved(Point::new(origin.x.saturating_add(delta), origin.y.saturating_add(delta)));
        host.pointer_up();
        let size = host.get(&w).map(|r| r.size).expect("window");
        assert!(size.width >= MIN_WIDTH && size.height >= MIN_HEIGHT, "{size:?}");
    }
    host.resize(&w, Size::new(0, 0));
    assert_eq!(host.get(&w).map(|r| r.size), Some(Size::new(MIN_WIDTH, MIN_HEIGHT)));
}

#[test]
fn close_removes_exactly_one_record() {
    let mut host = WindowHost::new();
    let a = host.open(PanelKind::Chat);
    let b = host.open(PanelKind::Research);
    let c = host.open(PanelKind::Stats);
    host.focus(&a);
    let others_before: Vec<_> = host.windows().iter().filter(|w| w.id != b).cloned().collect();
    host.close(&b);
    assert_eq!(host.len(), 2);
    assert!(host.get(&b).is_none());
    assert_eq!(host.windows().to_vec(), others_before);
    assert!(host.get(&c).is_some());
}

#[test]
fn chat_research_chat_keeps_two_windows() {
    let mut host = WindowHost::new();
    let chat = host.open(PanelKind::Chat);
    let research = host.open(PanelKind::Research);
    host.open(PanelKind::Chat);
    assert_eq!(host.len(), 2);
    let chat_z = host.get(&chat).map(|w| w.z_index);
    let research_z = host.get(&research).map(|w| w.z_index);
    assert!(chat_z > research_z);
    assert_eq!(chat_z, Some(max_z(&host)));
}

#[test]
fn minimized_chat_reopens_focused() {
    let mut host = WindowHost::new();
    let chat = host.open(PanelKind::Chat);
    host.minimize(&chat);
    assert_eq!(host.focused(), None);
    host.open(PanelKind::Chat);
    assert_eq!(host.len(), 1);
    assert_eq!(host.get(&chat).map(|w| w.minimized), Some(false));
    assert_eq!(host.focused(), Some(&chat));
}

#[test]
fn closing_a_leaves_b_focused() {
    let mut host = WindowHost::new();
    let a = host.open(PanelKind::Chat);
    let b = host.open(PanelKind::Research);
    host.close(&a);
    assert_eq!(host.focused(), Some(&b));
}

#[test]
fn closing_the_focused_window_falls_back_to_newest() {
    let mut host = WindowHost::new();
    let a = host.open(PanelKind::Chat);
    let b = host.open(PanelKind::Research);
    let c = host.open(PanelKind::Stats);
    host.focus(&a);
    let z_before: Vec<_> = host.windows().iter().filter(|w| w.id != a).map(|w| w.z_index).collect();
    host.close(&a);
    assert_eq!(host.focused(), Some(&c));
    let z_after: Vec<_> = host.windows().iter().map(|w| w.z_index).collect();
    assert_eq!(z_after, z_before);
    host.close(&c);
    assert_eq!(host.focused(), Some(&b));
    host.close(&b);
    assert_eq!(host.focused(), None);
}

#[test]
fn drag_preserves_grab_offset() {
    let mut host = WindowHost::new();
    let w = host.open(PanelKind::Chat);
    host.move_to(&w, Point::new(100, 100));
    assert!(host.begin_drag(&w, Point::new(120, 115)));
    host.pointer_moved(Point::new(200, 115));
    host.pointer_up();
    assert_eq!(host.get(&w).map(|r| r.position), Some(Point::new(180, 100)));
}

#[test]
fn move_while_maximized_keeps_prior_position() {
    let mut host = WindowHost::new();
    let w = host.open(PanelKind::Chat);
    host.move_to(&w, Point::new(33, 11));
    host.maximize(&w);
    host.move_to(&w, Point::new(0, 0));
    assert_eq!(host.get(&w).map(|r| r.position), Some(Point::new(33, 11)));
    host.maximize(&w);
    assert_eq!(host.get(&w).map(|r| r.rect()), Some(Rect::new(33, 11, 72, 22)));
}

#[test]
fn closing_mid_drag_ends_the_gesture() {
    let mut host = WindowHost::new();
    let a = host.open(PanelKind::Chat);
    let b = host.open(PanelKind::Research);
    assert!(host.begin_drag(&a, Point::new(10, 2)));
    host.close(&b);
    assert!(host.gesture().is_some());
    host.close(&a);
    assert!(host.gesture().is_none());
    assert!(!host.pointer_moved(Point::new(50, 50)));
}

#[test]
fn minimizing_or_maximizing_mid_resize_ends_the_gesture() {
    let mut host = WindowHost::new();
    let a = host.open(PanelKind::Chat);
    assert!(host.begin_resize(&a, Point::new(77, 23)));
    host.minimize(&a);
    assert!(host.gesture().is_none());
    host.restore(&a);
    assert!(host.begin_resize(&a, Point::new(77, 23)));
    host.maximize(&a);
    assert!(host.gesture().is_none());
}

#[test]
fn minimized_window_is_never_focused() {
    let mut host = WindowHost::new();
    let a = host.open(PanelKind::Chat);
    let b = host.open(PanelKind::Research);
    host.minimize(&b);
    host.minimize(&a);
    host.close(&a);
    assert_eq!(host.focused(), None);
    host.focus(&b);
    assert_eq!(host.get(&b).map(|w| w.minimized), Some(false));
    assert_eq!(host.focused(), Some(&b));
}
