//! Window chrome geometry and pointer gestures.
//!
//! A frame is drawn as a bordered box: the top border row doubles as the
//! title bar and carries three 3-cell buttons at its right end, and the
//! bottom-right corner cell is the resize handle. Gestures live on the host so
//! that closing, minimizing or maximizing a window ends any drag or resize
//! that targets it.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::host::{TitleClick, WindowHost};
use crate::model::{Point, Rect, Size, WindowId, WindowRecord, MIN_HEIGHT, MIN_WIDTH};

/// Two title-bar presses on the same window within this window count as a double click.
pub const DOUBLE_CLICK: Duration = Duration::from_millis(400);

const BUTTON_WIDTH: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRegion {
    TitleBar,
    Minimize,
    Maximize,
    Close,
    ResizeHandle,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub outer: Rect,
    pub title_bar: Rect,
    pub minimize: Rect,
    pub maximize: Rect,
    pub close: Rect,
    /// Area inside the border, where the panel draws.
    pub body: Rect,
    /// Absent while maximized.
    pub resize_handle: Option<Rect>,
}

impl FrameLayout {
    pub fn for_window(w: &WindowRecord, work_area: Rect) -> Self {
        let outer = w.layout_rect(work_area);
        let title_bar = Rect::new(outer.x, outer.y, outer.width, 1);
        // buttons sit left of the top-right corner: [_][□][x]┐
        let close_x = outer.right() - 1 - i32::from(BUTTON_WIDTH);
        let close = Rect::new(close_x, outer.y, BUTTON_WIDTH, 1);
        let maximize = Rect::new(close_x - i32::from(BUTTON_WIDTH), outer.y, BUTTON_WIDTH, 1);
        let minimize = Rect::new(close_x - 2 * i32::from(BUTTON_WIDTH), outer.y, BUTTON_WIDTH, 1);
        let body = Rect::new(outer.x + 1, outer.y + 1, outer.width.saturating_sub(2), outer.height.saturating_sub(2));
        let resize_handle = (!w.maximized).then(|| Rect::new(outer.right() - 1, outer.bottom() - 1, 1, 1));
        Self { outer, title_bar, minimize, maximize, close, body, resize_handle }
    }

    pub fn region_at(&self, p: Point) -> Option<FrameRegion> {
        if !self.outer.contains(p) {
            return None;
        }
        if self.close.contains(p) {
            return Some(FrameRegion::Close);
        }
        if self.maximize.contains(p) {
            return Some(FrameRegion::Maximize);
        }
        if self.minimize.contains(p) {
            return Some(FrameRegion::Minimize);
        }
        if self.title_bar.contains(p) {
            return Some(FrameRegion::TitleBar);
        }
        if self.resize_handle.is_some_and(|h| h.contains(p)) {
            return Some(FrameRegion::ResizeHandle);
        }
        Some(FrameRegion::Body)
    }
}

/// An in-progress drag or resize. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// `offset` is the pointer position relative to the window's top-left corner.
    Dragging { id: WindowId, offset: Point },
    Resizing { id: WindowId, origin: Point, start: Size },
}

impl Gesture {
    pub fn window(&self) -> &WindowId {
        match self {
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => id,
        }
    }
}

/// What a pointer press did. The caller uses this to decide whether the
/// desktop or taskbar should see the click instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// No visible window under the pointer.
    Missed,
    /// The window was raised; the press landed in its body.
    Focused(WindowId),
    Dragging(WindowId),
    Resizing(WindowId),
    Minimized(WindowId),
    MaximizeToggled(WindowId),
    Closed(WindowId),
}

impl WindowHost {
    /// Starts dragging `id` with the pointer at `pointer`. Refused for
    /// unknown, minimized and maximized windows.
    pub fn begin_drag(&mut self, id: &WindowId, pointer: Point) -> bool {
        let Some(w) = self.get(id) else { return false };
        if w.minimized || w.maximized {
            return false;
        }
        let offset = pointer - w.position;
        self.focus(id);
        debug!(window = %id, dx = offset.x, dy = offset.y, "drag started");
        self.gesture = Some(Gesture::Dragging { id: id.clone(), offset });
        true
    }

    /// Starts resizing `id` from the handle. Refused for unknown, minimized and
    /// maximized windows.
    pub fn begin_resize(&mut self, id: &WindowId, pointer: Point) -> bool {
        let Some(w) = self.get(id) else { return false };
        if w.minimized || w.maximized {
            return false;
        }
        let start = w.size;
        self.focus(id);
        debug!(window = %id, width = start.width, height = start.height, "resize started");
        self.gesture = Some(Gesture::Resizing { id: id.clone(), origin: pointer, start });
        true
    }

    /// Feeds a pointer move into the active gesture. Returns false when no
    /// gesture is active.
    pub fn pointer_moved(&mut self, pointer: Point) -> bool {
        match self.gesture.clone() {
            Some(Gesture::Dragging { id, offset }) => {
                let before = self.get(&id).map(|w| w.position);
                self.move_to(&id, pointer - offset);
                // a press that moved the window is not half of a double-click
                if self.get(&id).map(|w| w.position) != before {
                    self.last_title_click = None;
                }
                true
            }
            Some(Gesture::Resizing { id, origin, start }) => {
                let width = grow(start.width, pointer.x - origin.x, MIN_WIDTH);
                let height = grow(start.height, pointer.y - origin.y, MIN_HEIGHT);
                self.resize(&id, Size::new(width, height));
                true
            }
            None => false,
        }
    }

    /// Ends the active gesture, if any.
    pub fn pointer_up(&mut self) -> Option<Gesture> {
        self.gesture.take()
    }

    /// Routes a pointer press through the topmost frame under `pointer`.
    ///
    /// The window is focused before anything else happens, so a press into a
    /// panel body always raises it.
    pub fn pointer_down(&mut self, pointer: Point, work_area: Rect, now: Instant) -> PointerOutcome {
        // a press always starts a fresh gesture
        self.gesture = None;
        let Some(w) = self.window_at(pointer, work_area) else {
            self.last_title_click = None;
            return PointerOutcome::Missed;
        };
        let id = w.id.clone();
        let region = FrameLayout::for_window(w, work_area).region_at(pointer);
        self.focus(&id);

        let previous = self.last_title_click.take();
        match region {
            Some(FrameRegion::Close) => {
                self.close(&id);
                PointerOutcome::Closed(id)
            }
            Some(FrameRegion::Minimize) => {
                self.minimize(&id);
                PointerOutcome::Minimized(id)
            }
            Some(FrameRegion::Maximize) => {
                self.maximize(&id);
                PointerOutcome::MaximizeToggled(id)
            }
            Some(FrameRegion::TitleBar) => {
                let double = previous.is_some_and(|c| c.id == id && now.saturating_duration_since(c.at) <= DOUBLE_CLICK);
                if double {
                    self.maximize(&id);
                    return PointerOutcome::MaximizeToggled(id);
                }
                self.last_title_click = Some(TitleClick { id: id.clone(), at: now });
                if self.begin_drag(&id, pointer) {
                    PointerOutcome::Dragging(id)
                } else {
                    PointerOutcome::Focused(id)
                }
            }
            Some(FrameRegion::ResizeHandle) => {
                if self.begin_resize(&id, pointer) {
                    PointerOutcome::Resizing(id)
                } else {
                    PointerOutcome::Focused(id)
                }
            }
            Some(FrameRegion::Body) | None => PointerOutcome::Focused(id),
        }
    }
}

fn grow(start: u16, delta: i32, floor: u16) -> u16 {
    let wanted = i32::from(start).saturating_add(delta);
    let clamped = wanted.clamp(i32::from(floor), i32::from(u16::MAX));
    u16::try_from(clamped).unwrap_or(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PanelKind, CASCADE_BASE};
    use pretty_assertions::assert_eq;

    const WORK: Rect = Rect::new(0, 0, 200, 60);

    fn layout_of(host: &WindowHost, id: &WindowId) -> FrameLayout {
        let w = host.get(id).cloned();
        FrameLayout::for_window(w.as_ref().unwrap_or_else(|| panic!("missing {id}")), WORK)
    }

    #[test]
    fn layout_places_buttons_left_of_corner() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Stats);
        let l = layout_of(&host, &id);
        assert_eq!(l.close.right(), l.outer.right() - 1);
        assert_eq!(l.maximize.right(), l.close.x);
        assert_eq!(l.minimize.right(), l.maximize.x);
        assert_eq!(l.region_at(Point::new(l.close.x + 1, l.outer.y)), Some(FrameRegion::Close));
        assert_eq!(l.region_at(Point::new(l.outer.x + 2, l.outer.y)), Some(FrameRegion::TitleBar));
        assert_eq!(l.region_at(Point::new(l.outer.right() - 1, l.outer.bottom() - 1)), Some(FrameRegion::ResizeHandle));
        assert_eq!(l.region_at(Point::new(l.outer.x + 2, l.outer.y + 2)), Some(FrameRegion::Body));
        assert_eq!(l.region_at(Point::new(l.outer.right(), l.outer.y)), None);
    }

    #[test]
    fn maximized_layout_fills_work_area_without_handle() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Chat);
        host.maximize(&id);
        let l = layout_of(&host, &id);
        assert_eq!(l.outer, WORK);
        assert_eq!(l.resize_handle, None);
    }

    #[test]
    fn title_press_drags_with_captured_offset() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Chat);
        let grab = Point::new(CASCADE_BASE.x + 5, CASCADE_BASE.y);
        let now = Instant::now();
        assert_eq!(host.pointer_down(grab, WORK, now), PointerOutcome::Dragging(id.clone()));
        assert!(host.pointer_moved(Point::new(40, 10)));
        assert_eq!(host.get(&id).map(|w| w.position), Some(Point::new(35, 10)));
        assert!(host.pointer_up().is_some());
        assert!(!host.pointer_moved(Point::new(0, 0)));
        assert_eq!(host.get(&id).map(|w| w.position), Some(Point::new(35, 10)));
    }

    #[test]
    fn double_click_on_title_maximizes_instead_of_dragging() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Chat);
        let grab = Point::new(CASCADE_BASE.x + 5, CASCADE_BASE.y);
        let t0 = Instant::now();
        host.pointer_down(grab, WORK, t0);
        host.pointer_up();
        let outcome = host.pointer_down(grab, WORK, t0 + Duration::from_millis(150));
        assert_eq!(outcome, PointerOutcome::MaximizeToggled(id.clone()));
        assert!(host.gesture().is_none());
        assert_eq!(host.get(&id).map(|w| (w.maximized, w.position)), Some((true, CASCADE_BASE)));
    }

    #[test]
    fn quick_press_after_a_real_drag_is_not_a_double_click() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Chat);
        let grab = Point::new(CASCADE_BASE.x + 5, CASCADE_BASE.y);
        let t0 = Instant::now();
        host.pointer_down(grab, WORK, t0);
        let dropped = Point::new(grab.x + 10, grab.y);
        host.pointer_moved(dropped);
        host.pointer_up();
        let outcome = host.pointer_down(dropped, WORK, t0 + Duration::from_millis(150));
        assert_eq!(outcome, PointerOutcome::Dragging(id.clone()));
        assert_eq!(host.get(&id).map(|w| w.maximized), Some(false));
    }

    #[test]
    fn slow_second_click_starts_a_new_drag() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Chat);
        let grab = Point::new(CASCADE_BASE.x + 5, CASCADE_BASE.y);
        let t0 = Instant::now();
        host.pointer_down(grab, WORK, t0);
        host.pointer_up();
        let outcome = host.pointer_down(grab, WORK, t0 + DOUBLE_CLICK + Duration::from_millis(1));
        assert_eq!(outcome, PointerOutcome::Dragging(id));
    }

    #[test]
    fn handle_press_resizes_from_start_size() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Stats);
        let l = layout_of(&host, &id);
        let handle = Point::new(l.outer.right() - 1, l.outer.bottom() - 1);
        assert_eq!(host.pointer_down(handle, WORK, Instant::now()), PointerOutcome::Resizing(id.clone()));
        host.pointer_moved(Point::new(handle.x + 10, handle.y + 3));
        assert_eq!(host.get(&id).map(|w| w.size), Some(Size::new(l.outer.width + 10, l.outer.height + 3)));
        host.pointer_moved(Point::new(handle.x - 500, handle.y - 500));
        assert_eq!(host.get(&id).map(|w| w.size), Some(Size::new(MIN_WIDTH, MIN_HEIGHT)));
    }

    #[test]
    fn body_press_focuses_without_gesture() {
        let mut host = WindowHost::new();
        let a = host.open(PanelKind::Chat);
        let _b = host.open(PanelKind::Stats);
        let inside_a_only = Point::new(CASCADE_BASE.x + 1, CASCADE_BASE.y + 1);
        assert_eq!(host.pointer_down(inside_a_only, WORK, Instant::now()), PointerOutcome::Focused(a.clone()));
        assert_eq!(host.focused(), Some(&a));
        assert!(host.gesture().is_none());
    }

    #[test]
    fn buttons_minimize_maximize_and_close() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Stats);
        let l = layout_of(&host, &id);
        let now = Instant::now();
        assert_eq!(host.pointer_down(l.maximize.origin(), WORK, now), PointerOutcome::MaximizeToggled(id.clone()));
        assert_eq!(host.get(&id).map(|w| w.maximized), Some(true));
        let l = layout_of(&host, &id);
        assert_eq!(host.pointer_down(l.minimize.origin(), WORK, now), PointerOutcome::Minimized(id.clone()));
        host.restore(&id);
        let l = layout_of(&host, &id);
        assert_eq!(host.pointer_down(l.close.origin(), WORK, now), PointerOutcome::Closed(id.clone()));
        assert!(host.get(&id).is_none());
    }

    #[test]
    fn press_on_empty_desktop_misses() {
        let mut host = WindowHost::new();
        host.open(PanelKind::Stats);
        assert_eq!(host.pointer_down(Point::new(190, 55), WORK, Instant::now()), PointerOutcome::Missed);
    }

    #[test]
    fn maximized_title_press_focuses_only() {
        let mut host = WindowHost::new();
        let id = host.open(PanelKind::Stats);
        host.maximize(&id);
        let outcome = host.pointer_down(Point::new(5, 0), WORK, Instant::now());
        assert_eq!(outcome, PointerOutcome::Focused(id));
        assert!(host.gesture().is_none());
    }

    #[test]
    fn grow_saturates() {
        assert_eq!(grow(30, -100, MIN_WIDTH), MIN_WIDTH);
        assert_eq!(grow(30, 5, MIN_WIDTH), 35);
        assert_eq!(grow(u16::MAX - 1, 10, MIN_WIDTH), u16::MAX);
    }
}
