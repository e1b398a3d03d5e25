use std::str::FromStr;
use wasm_bindgen::JsCast;

/// Keys that move focus inside one list container. Names match `KeyboardEvent.key`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

impl NavKey {
    pub fn parse(key: &str) -> Option<Self> {
        Self::from_str(key).ok()
    }
}

/// Index to focus next, wrapping at both ends. `None` when nothing should move.
pub fn focus_target(key: NavKey, current: usize, len: usize) -> Option<usize> {
    if len == 0 || current >= len {
        return None;
    }
    let next = match key {
        NavKey::ArrowUp | NavKey::ArrowLeft => (current + len - 1) % len,
        NavKey::ArrowDown | NavKey::ArrowRight => (current + 1) % len,
        NavKey::Home => 0,
        NavKey::End => len - 1,
    };
    Some(next)
}

/// Keydown handler for one container; only that container's links are candidates.
pub(crate) fn handle_keydown(links: &[web_sys::HtmlElement], ev: &web_sys::Event) {
    let Some(ev) = ev.dyn_ref::<web_sys::KeyboardEvent>() else {
        return;
    };
    if ev.alt_key() || ev.ctrl_key() || ev.meta_key() {
        return;
    }
    let Some(key) = NavKey::parse(&ev.key()) else {
        return;
    };

    let focused = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element());
    let Some(focused) = focused else {
        return;
    };
    let Some(current) = links
        .iter()
        .position(|link| link.unchecked_ref::<web_sys::Element>() == &focused)
    else {
        return;
    };

    if let Some(next) = focus_target(key, current, links.len()) {
        ev.prevent_default();
        let _ = links[next].focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        assert_eq!(NavKey::parse("ArrowUp"), Some(NavKey::ArrowUp));
        assert_eq!(NavKey::parse("End"), Some(NavKey::End));
        assert_eq!(NavKey::ArrowDown.to_string(), "ArrowDown");
    }

    #[test]
    fn test_parse_ignores_other_keys() {
        assert_eq!(NavKey::parse("Enter"), None);
        assert_eq!(NavKey::parse("a"), None);
        assert_eq!(NavKey::parse("arrowup"), None);
        assert_eq!(NavKey::parse(""), None);
    }

    #[test]
    fn test_focus_target_moves_and_wraps() {
        assert_eq!(focus_target(NavKey::ArrowDown, 0, 3), Some(1));
        assert_eq!(focus_target(NavKey::ArrowDown, 2, 3), Some(0));
        assert_eq!(focus_target(NavKey::ArrowUp, 0, 3), Some(2));
        assert_eq!(focus_target(NavKey::ArrowLeft, 1, 3), Some(0));
        assert_eq!(focus_target(NavKey::ArrowRight, 1, 3), Some(2));
    }

    #[test]
    fn test_focus_target_home_end() {
        assert_eq!(focus_target(NavKey::Home, 2, 5), Some(0));
        assert_eq!(focus_target(NavKey::End, 0, 5), Some(4));
    }

    #[test]
    fn test_focus_target_empty_or_out_of_range() {
        assert_eq!(focus_target(NavKey::ArrowDown, 0, 0), None);
        assert_eq!(focus_target(NavKey::Home, 7, 3), None);
    }
}
