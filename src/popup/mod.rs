use crate::widget::{BODY_OPEN_CLASS, OPEN_CLASS, POPUP_SELECTOR};
use leptos::ev;
use leptos_dom::helpers::{window_event_listener, WindowListenerHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PopupState {
    #[default]
    Closed,
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupEvent {
    Open,
    Close,
    Toggle,
}

impl PopupState {
    pub fn next(self, event: PopupEvent) -> Self {
        match (self, event) {
            (_, PopupEvent::Open) => PopupState::Open,
            (_, PopupEvent::Close) => PopupState::Closed,
            (PopupState::Open, PopupEvent::Toggle) => PopupState::Closed,
            (PopupState::Closed, PopupEvent::Toggle) => PopupState::Open,
        }
    }

    pub fn is_open(self) -> bool {
        self == PopupState::Open
    }
}

/// Open/closed bookkeeping for one popup and its trigger.
///
/// While open it listens for outside pointer activity and Escape; both
/// listeners are dropped on close.
pub(crate) struct PopupController {
    popup: web_sys::Element,
    trigger: Option<web_sys::Element>,
    state: Cell<PopupState>,
    dismiss_listeners: RefCell<Vec<WindowListenerHandle>>,
}

impl PopupController {
    pub(crate) fn new(popup: web_sys::Element, trigger: Option<web_sys::Element>) -> Rc<Self> {
        let controller = Rc::new(Self {
            popup,
            trigger,
            state: Cell::new(PopupState::Closed),
            dismiss_listeners: RefCell::new(Vec::new()),
        });
        controller.render(PopupState::Closed);
        if let (Some(trigger), id) = (&controller.trigger, controller.popup.id()) {
            if !id.is_empty() {
                let _ = trigger.set_attribute("aria-controls", &id);
            }
        }
        controller
    }

    pub(crate) fn state(&self) -> PopupState {
        self.state.get()
    }

    pub(crate) fn popup(&self) -> &web_sys::Element {
        &self.popup
    }

    pub(crate) fn trigger(&self) -> Option<&web_sys::Element> {
        self.trigger.as_ref()
    }

    pub(crate) fn contains(&self, node: &web_sys::Node) -> bool {
        self.popup.contains(Some(node))
    }

    pub(crate) fn toggle(self: &Rc<Self>) {
        match self.state.get().next(PopupEvent::Toggle) {
            PopupState::Open => self.open(),
            PopupState::Closed => self.close(),
        }
    }

    pub(crate) fn open(self: &Rc<Self>) {
        if self.state.get().is_open() {
            return;
        }
        self.transition(PopupEvent::Open);
        self.listen_for_dismissal();
    }

    pub(crate) fn close(&self) {
        if !self.state.get().is_open() {
            return;
        }
        self.transition(PopupEvent::Close);
        for handle in self.dismiss_listeners.borrow_mut().drain(..) {
            handle.remove();
        }
    }

    fn transition(&self, event: PopupEvent) {
        let next = self.state.get().next(event);
        self.state.set(next);
        self.render(next);
    }

    /// Mirror `state` onto the popup, trigger and body.
    fn render(&self, state: PopupState) {
        let open = state.is_open();
        let classes = self.popup.class_list();
        let _ = if open {
            classes.add_1(OPEN_CLASS)
        } else {
            classes.remove_1(OPEN_CLASS)
        };
        let _ = self.popup.set_attribute("data-state", state.as_ref());
        let _ = self.popup.set_attribute("aria-hidden", if open { "false" } else { "true" });
        if let Some(trigger) = &self.trigger {
            let _ = trigger.set_attribute("aria-expanded", if open { "true" } else { "false" });
        }
        sync_body_marker();
    }

    fn listen_for_dismissal(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let on_pointer = window_event_listener(ev::pointerdown, move |e: web_sys::PointerEvent| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            let Some(target) = e.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok()) else {
                return;
            };
            let on_trigger = controller
                .trigger
                .as_ref()
                .is_some_and(|t| t.contains(Some(&target)));
            if !controller.contains(&target) && !on_trigger {
                controller.close();
            }
        });

        let weak = Rc::downgrade(self);
        let on_key = window_event_listener(ev::keydown, move |e: web_sys::KeyboardEvent| {
            if e.key() != "Escape" {
                return;
            }
            let Some(controller) = weak.upgrade() else {
                return;
            };
            e.prevent_default();
            controller.close();
            if let Some(trigger) = controller.trigger.as_ref().and_then(|t| t.dyn_ref::<web_sys::HtmlElement>()) {
                let _ = trigger.focus();
            }
        });

        self.dismiss_listeners.borrow_mut().extend([on_pointer, on_key]);
    }
}

impl Drop for PopupController {
    fn drop(&mut self) {
        self.close();
    }
}

/// `<body>` carries the marker while any popup on the page is open.
fn sync_body_marker() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };
    let any_open = document
        .query_selector(&format!("{POPUP_SELECTOR}.{OPEN_CLASS}"))
        .ok()
        .flatten()
        .is_some();
    let classes = body.class_list();
    let _ = if any_open {
        classes.add_1(BODY_OPEN_CLASS)
    } else {
        classes.remove_1(BODY_OPEN_CLASS)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycles() {
        let s = PopupState::default();
        assert_eq!(s, PopupState::Closed);
        let s = s.next(PopupEvent::Toggle);
        assert_eq!(s, PopupState::Open);
        assert_eq!(s.next(PopupEvent::Toggle), PopupState::Closed);
    }

    #[test]
    fn test_open_and_close_are_idempotent() {
        assert_eq!(PopupState::Open.next(PopupEvent::Open), PopupState::Open);
        assert_eq!(PopupState::Closed.next(PopupEvent::Close), PopupState::Closed);
        assert_eq!(PopupState::Open.next(PopupEvent::Close), PopupState::Closed);
    }

    #[test]
    fn test_state_names_for_data_attribute() {
        assert_eq!(PopupState::Open.as_ref(), "open");
        assert_eq!(PopupState::Closed.to_string(), "closed");
        assert!(PopupState::Open.is_open());
        assert!(!PopupState::Closed.is_open());
    }
}
