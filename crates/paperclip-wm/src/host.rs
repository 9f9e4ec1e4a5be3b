use std::time::Instant;
use tracing::debug;

use crate::frame::Gesture;
use crate::model::{defaults_for, PanelKind, Point, Rect, Size, WindowId, WindowRecord, CASCADE_BASE, CASCADE_STEP};

/// One taskbar button. Every record gets one, minimized or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub id: WindowId,
    pub kind: PanelKind,
    pub title: String,
    pub focused: bool,
    pub minimized: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct TitleClick {
    pub id: WindowId,
    pub at: Instant,
}

/// Owner of the window list.
///
/// Records are kept in creation order; removal is the only operation that
/// reorders them. Stacking is tracked separately through `z_index`, and every
/// raise hands out `max + 1`. Operations on unknown ids are no-ops.
#[derive(Debug, Default)]
pub struct WindowHost {
    windows: Vec<WindowRecord>,
    focused: Option<WindowId>,
    seq: u64,
    pub(crate) gesture: Option<Gesture>,
    pub(crate) last_title_click: Option<TitleClick>,
}

impl WindowHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn get(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| &w.id == id)
    }

    pub fn find_kind(&self, kind: &PanelKind) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| &w.kind == kind)
    }

    pub fn focused(&self) -> Option<&WindowId> {
        self.focused.as_ref()
    }

    pub fn focused_window(&self) -> Option<&WindowRecord> {
        self.focused.as_ref().and_then(|id| self.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    fn get_mut(&mut self, id: &WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|w| &w.id == id)
    }

    fn next_z(&self) -> u64 {
        self.windows.iter().map(|w| w.z_index).max().unwrap_or(0) + 1
    }

    /// Opens a window for `kind`, or brings the existing one back to the front.
    pub fn open(&mut self, kind: PanelKind) -> WindowId {
        let z = self.next_z();
        if let Some(existing) = self.windows.iter_mut().find(|w| w.kind == kind) {
            existing.minimized = false;
            existing.z_index = z;
            let id = existing.id.clone();
            debug!(window = %id, z, "reopen raises existing window");
            self.focused = Some(id.clone());
            return id;
        }

        let defaults = defaults_for(&kind);
        let count = i32::try_from(self.windows.len()).unwrap_or(i32::MAX);
        let position = Point::new(
            CASCADE_BASE.x.saturating_add(CASCADE_STEP.x.saturating_mul(count)),
            CASCADE_BASE.y.saturating_add(CASCADE_STEP.y.saturating_mul(count)),
        );
        self.seq += 1;
        let id = WindowId::new(&kind, self.seq);
        debug!(window = %id, x = position.x, y = position.y, z, "window opened");
        self.windows.push(WindowRecord {
            id: id.clone(),
            kind,
            title: defaults.title,
            position,
            size: defaults.size,
            minimized: false,
            maximized: false,
            z_index: z,
        });
        self.focused = Some(id.clone());
        id
    }

    pub fn close(&mut self, id: &WindowId) {
        let before = self.windows.len();
        self.windows.retain(|w| &w.id != id);
        if self.windows.len() == before {
            return;
        }
        debug!(window = %id, "window closed");
        self.release_gesture_for(id);
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        self.reconcile_focus();
    }

    pub fn minimize(&mut self, id: &WindowId) {
        let Some(w) = self.get_mut(id) else { return };
        w.minimized = true;
        self.release_gesture_for(id);
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        self.reconcile_focus();
    }

    /// Toggles maximized. Always un-minimizes and raises.
    pub fn maximize(&mut self, id: &WindowId) {
        let z = self.next_z();
        let Some(w) = self.get_mut(id) else { return };
        w.maximized = !w.maximized;
        w.minimized = false;
        w.z_index = z;
        debug!(window = %id, maximized = w.maximized, "maximize toggled");
        self.release_gesture_for(id);
        self.focused = Some(id.clone());
    }

    pub fn restore(&mut self, id: &WindowId) {
        let z = self.next_z();
        let Some(w) = self.get_mut(id) else { return };
        w.minimized = false;
        w.z_index = z;
        self.focused = Some(id.clone());
    }

    /// Raises `id` to the top of the stack and makes it the focused window.
    pub fn focus(&mut self, id: &WindowId) {
        let z = self.next_z();
        let Some(w) = self.get_mut(id) else { return };
        // a minimized window is never the focused one
        w.minimized = false;
        w.z_index = z;
        self.focused = Some(id.clone());
    }

    pub fn move_to(&mut self, id: &WindowId, position: Point) {
        let Some(w) = self.get_mut(id) else { return };
        if w.maximized {
            return;
        }
        w.position = position;
    }

    pub fn resize(&mut self, id: &WindowId, size: Size) {
        let Some(w) = self.get_mut(id) else { return };
        if w.maximized {
            return;
        }
        w.size = size.clamped();
    }

    /// Drops every window (used on logout).
    pub fn reset(&mut self) {
        self.windows.clear();
        self.focused = None;
        self.gesture = None;
        self.last_title_click = None;
    }

    /// Taskbar click: restores a minimized window, minimizes the focused one,
    /// and focuses anything else.
    pub fn toggle_from_taskbar(&mut self, id: &WindowId) {
        let Some(w) = self.get(id) else { return };
        if w.minimized {
            self.restore(id);
        } else if self.focused.as_ref() == Some(id) {
            self.minimize(id);
        } else {
            self.focus(id);
        }
    }

    /// Focuses the lowest visible window, so repeated calls walk the whole stack.
    pub fn cycle_focus(&mut self) {
        let next = self.stacking_order().first().map(|w| w.id.clone());
        if let Some(id) = next {
            self.focus(&id);
        }
    }

    /// Visible windows from bottom to top; this is the paint order.
    pub fn stacking_order(&self) -> Vec<&WindowRecord> {
        let mut visible: Vec<&WindowRecord> = self.windows.iter().filter(|w| !w.minimized).collect();
        visible.sort_by_key(|w| w.z_index);
        visible
    }

    /// Topmost visible window whose frame covers `p`.
    pub fn window_at(&self, p: Point, work_area: Rect) -> Option<&WindowRecord> {
        self.stacking_order().into_iter().rev().find(|w| w.layout_rect(work_area).contains(p))
    }

    pub fn taskbar(&self) -> Vec<TaskbarEntry> {
        self.windows
            .iter()
            .map(|w| TaskbarEntry {
                id: w.id.clone(),
                kind: w.kind.clone(),
                title: w.title.clone(),
                focused: self.focused.as_ref() == Some(&w.id),
                minimized: w.minimized,
            })
            .collect()
    }

    fn release_gesture_for(&mut self, id: &WindowId) {
        if self.gesture.as_ref().is_some_and(|g| g.window() == id) {
            debug!(window = %id, "gesture released");
            self.gesture = None;
        }
        if self.last_title_click.as_ref().is_some_and(|c| &c.id == id) {
            self.last_title_click = None;
        }
    }

    /// When focus points at nothing usable, hands it to the newest visible
    /// window without touching anyone's stacking order. Minimize falls back
    /// the same way close does.
    fn reconcile_focus(&mut self) {
        let usable = self
            .focused
            .as_ref()
            .is_some_and(|f| self.windows.iter().any(|w| &w.id == f && !w.minimized));
        if !usable {
            self.focused = self.windows.iter().rev().find(|w| !w.minimized).map(|w| w.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ToolKind, GENERIC_SIZE, MIN_HEIGHT, MIN_WIDTH};
    use pretty_assertions::assert_eq;

    fn max_z(host: &WindowHost) -> u64 {
        host.windows().iter().map(|w| w.z_index).max().unwrap_or(0)
    }

    #[test]
    fn new_windows_cascade() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let b = host.open(PanelKind::Research);
        let c = host.open(PanelKind::Stats);
        assert_eq!(host.get(&a).map(|w| w.position), Some(CASCADE_BASE));
        assert_eq!(host.get(&b).map(|w| w.position), Some(CASCADE_BASE + CASCADE_STEP));
        assert_eq!(host.get(&c).map(|w| w.position), Some(Point::new(CASCADE_BASE.x + 2 * CASCADE_STEP.x, CASCADE_BASE.y + 2 * CASCADE_STEP.y)));
    }

    #[test]
    fn open_seeds_title_and_size_from_defaults() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Tool(ToolKind::Other("graph_walker".into())));
        let w = host.get(&id).cloned();
        assert_eq!(w.as_ref().map(|w| w.size), Some(GENERIC_SIZE));
        assert_eq!(w.map(|w| w.title), Some("Graph Walker".to_string()));
    }

    #[test]
    fn focus_on_unknown_id_is_noop() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let before = host.windows().to_vec();
        host.focus(&WindowId::new(&PanelKind::Stats, 99));
        assert_eq!(host.windows(), before.as_slice());
        assert_eq!(host.focused(), Some(&a));
    }

    #[test]
    fn minimize_moves_focus_to_newest_visible_window() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let b = host.open(PanelKind::Research);
        host.minimize(&b);
        assert_eq!(host.focused(), Some(&a));
        host.minimize(&a);
        assert_eq!(host.focused(), None);
    }

    #[test]
    fn maximize_toggles_and_restores_minimized() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let _b = host.open(PanelKind::Research);
        host.minimize(&a);
        host.maximize(&a);
        let w = host.get(&a).cloned();
        assert_eq!(w.as_ref().map(|w| (w.minimized, w.maximized)), Some((false, true)));
        assert_eq!(w.map(|w| w.z_index), Some(max_z(&host)));
        assert_eq!(host.focused(), Some(&a));
        host.maximize(&a);
        assert_eq!(host.get(&a).map(|w| w.maximized), Some(false));
    }

    #[test]
    fn restore_raises() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let _b = host.open(PanelKind::Research);
        host.minimize(&a);
        host.restore(&a);
        assert_eq!(host.get(&a).map(|w| w.z_index), Some(max_z(&host)));
        assert_eq!(host.focused(), Some(&a));
    }

    #[test]
    fn resize_clamps_to_floor() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        host.resize(&a, Size::new(3, 1));
        assert_eq!(host.get(&a).map(|w| w.size), Some(Size::new(MIN_WIDTH, MIN_HEIGHT)));
    }

    #[test]
    fn taskbar_lists_minimized_windows_in_creation_order() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let b = host.open(PanelKind::Stats);
        host.minimize(&a);
        let bar = host.taskbar();
        assert_eq!(bar.iter().map(|e| e.id.clone()).collect::<Vec<_>>(), vec![a.clone(), b.clone()]);
        assert!(bar[0].minimized);
        assert!(bar[1].focused);
    }

    #[test]
    fn taskbar_toggle_cycles_minimize_and_restore() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let b = host.open(PanelKind::Stats);
        host.toggle_from_taskbar(&a);
        assert_eq!(host.focused(), Some(&a));
        host.toggle_from_taskbar(&a);
        assert_eq!(host.get(&a).map(|w| w.minimized), Some(true));
        assert_eq!(host.focused(), Some(&b));
        host.toggle_from_taskbar(&a);
        assert_eq!(host.get(&a).map(|w| w.minimized), Some(false));
        assert_eq!(host.focused(), Some(&a));
    }

    #[test]
    fn window_at_prefers_topmost() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let b = host.open(PanelKind::Research);
        let work = Rect::new(0, 0, 200, 60);
        let overlap = Point::new(CASCADE_BASE.x + CASCADE_STEP.x + 1, CASCADE_BASE.y + CASCADE_STEP.y + 1);
        assert_eq!(host.window_at(overlap, work).map(|w| w.id.clone()), Some(b));
        host.focus(&a);
        assert_eq!(host.window_at(overlap, work).map(|w| w.id.clone()), Some(a.clone()));
        host.minimize(&a);
        assert_ne!(host.window_at(overlap, work).map(|w| w.id.clone()), Some(a));
    }

    #[test]
    fn cycle_focus_walks_the_stack() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let b = host.open(PanelKind::Research);
        let c = host.open(PanelKind::Stats);
        host.cycle_focus();
        assert_eq!(host.focused(), Some(&a));
        host.cycle_focus();
        assert_eq!(host.focused(), Some(&b));
        host.cycle_focus();
        assert_eq!(host.focused(), Some(&c));
    }

    #[test]
    fn reset_empties_everything() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        assert!(host.begin_drag(&a, Point::new(10, 2)));
        host.reset();
        assert!(host.is_empty());
        assert_eq!(host.focused(), None);
        assert!(host.gesture().is_none());
    }
}
