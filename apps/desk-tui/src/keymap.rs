use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Centralized hotkey map to avoid drift.
// Only Ctrl-combos (plus function keys) to avoid stealing plain typing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    None,
    Quit,
    CloseWindow,
    MinimizeWindow,
    MaximizeWindow,
    CycleFocus,
    Launch(usize), // index into PanelKind::LAUNCHERS
    ToggleHelp,
    ToggleTheme,
    Logout,
}

pub fn resolve(ev: KeyEvent) -> Hotkey {
    let m = ev.modifiers;
    match (m, ev.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (KeyModifiers::CONTROL, KeyCode::Char('q')) => Hotkey::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => Hotkey::CloseWindow,
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => Hotkey::MinimizeWindow,
        (KeyModifiers::CONTROL, KeyCode::Char('x')) => Hotkey::MaximizeWindow,
        (KeyModifiers::CONTROL, KeyCode::Char('o')) => Hotkey::CycleFocus,
        (KeyModifiers::NONE, KeyCode::F(n)) if (1..=8).contains(&n) => Hotkey::Launch(usize::from(n - 1)),
        // Some terminals swallow function keys; Alt+digit as a reliable alternative
        (KeyModifiers::ALT, KeyCode::Char(c @ '1'..='8')) => Hotkey::Launch(c as usize - '1' as usize),
        (KeyModifiers::CONTROL, KeyCode::Char('h')) => Hotkey::ToggleHelp,
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => Hotkey::ToggleTheme,
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => Hotkey::Logout,
        _ => Hotkey::None,
    }
}

/// Lines for the help overlay.
pub const HELP: &[(&str, &str)] = &[
    ("F1-F8 / Alt+1-8", "open Chat, Research, Tools, Workspaces, Stats, Ideation, Experiments, Account"),
    ("Ctrl-O", "cycle focus"),
    ("Ctrl-W", "close window"),
    ("Ctrl-N", "minimize window"),
    ("Ctrl-X", "maximize / restore"),
    ("Ctrl-T", "toggle theme"),
    ("Ctrl-L", "sign out"),
    ("Ctrl-H", "this help"),
    ("Ctrl-Q", "quit"),
    ("mouse", "drag title bars, resize from the corner, double-click a title to maximize"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(m: KeyModifiers, c: KeyCode) -> KeyEvent {
        KeyEvent::new(c, m)
    }

    #[test]
    fn launchers_cover_f1_to_f8() {
        assert_eq!(resolve(key(KeyModifiers::NONE, KeyCode::F(1))), Hotkey::Launch(0));
        assert_eq!(resolve(key(KeyModifiers::NONE, KeyCode::F(8))), Hotkey::Launch(7));
        assert_eq!(resolve(key(KeyModifiers::NONE, KeyCode::F(9))), Hotkey::None);
        assert_eq!(resolve(key(KeyModifiers::ALT, KeyCode::Char('3'))), Hotkey::Launch(2));
    }

    #[test]
    fn plain_typing_is_never_a_hotkey() {
        for c in ['q', 'w', 'n', 'x', 'o', 'h', 't', 'l', '1'] {
            assert_eq!(resolve(key(KeyModifiers::NONE, KeyCode::Char(c))), Hotkey::None);
            assert_eq!(resolve(key(KeyModifiers::SHIFT, KeyCode::Char(c))), Hotkey::None);
        }
    }

    #[test]
    fn window_keys() {
        assert_eq!(resolve(key(KeyModifiers::CONTROL, KeyCode::Char('w'))), Hotkey::CloseWindow);
        assert_eq!(resolve(key(KeyModifiers::CONTROL, KeyCode::Char('x'))), Hotkey::MaximizeWindow);
        assert_eq!(resolve(key(KeyModifiers::CONTROL, KeyCode::Char('q'))), Hotkey::Quit);
    }
}
