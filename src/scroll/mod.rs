use crate::error::{TocError, TocResult};
use crate::offset::compute_offset;
use crate::tracker::Suppression;
use crate::util::{document_top, now_ms};
use crate::widget::SharedActivator;
use leptos_dom::helpers::{set_timeout_with_handle, TimeoutHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};

/// How long a heading keeps the temporary `tabindex` used to focus it.
pub const FOCUS_RELEASE_MS: u64 = 1000;

/// Attribute marking a `tabindex` this crate added.
const TEMP_FOCUS_ATTR: &str = "data-toc-focus";

/// Vertical scroll position that puts a heading just below the sticky header.
pub fn scroll_target(heading_top: f64, offset: f64) -> f64 {
    (heading_top - offset).max(0.0)
}

/// Whether an element takes focus without a `tabindex`.
pub fn is_natively_focusable(tag_name: &str, has_href: bool, has_tabindex: bool) -> bool {
    if has_tabindex {
        return true;
    }
    match tag_name.to_ascii_lowercase().as_str() {
        "a" | "area" => has_href,
        "button" | "input" | "select" | "textarea" | "summary" => true,
        _ => false,
    }
}

/// Write path: link activation -> scroll position.
pub(crate) struct ScrollController {
    activator: SharedActivator,
    suppression: Rc<Suppression>,
    default_offset: f64,
    update_hash: bool,
    smooth_supported: Cell<Option<bool>>,
    focus_release: RefCell<Option<(web_sys::Element, TimeoutHandle)>>,
}

impl ScrollController {
    pub(crate) fn new(
        activator: SharedActivator,
        suppression: Rc<Suppression>,
        default_offset: f64,
        update_hash: bool,
    ) -> Rc<Self> {
        Rc::new(Self {
            activator,
            suppression,
            default_offset,
            update_hash,
            smooth_supported: Cell::new(None),
            focus_release: RefCell::new(None),
        })
    }

    /// Scroll to the heading `id`, mark it active and move focus to it.
    ///
    /// A heading that vanished after the build is a recoverable miss.
    pub(crate) fn scroll_to_heading(
        self: &Rc<Self>,
        id: &str,
        source: Option<&web_sys::Element>,
    ) -> TocResult<()> {
        let window = web_sys::window().ok_or_else(|| TocError::missing_target("window"))?;
        let heading = window
            .document()
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| {
                let from = source
                    .and_then(|s| s.get_attribute("href"))
                    .unwrap_or_else(|| format!("#{id}"));
                TocError::missing_target(format!("heading for {from}"))
            })?;

        let target = scroll_target(document_top(&heading), compute_offset(self.default_offset));

        // Passive trackers stay quiet until the animation settles.
        self.suppression.engage(now_ms());
        self.scroll_window(&window, target);

        self.activator.borrow_mut().activate(id);
        if self.update_hash {
            self.replace_hash(&window, id);
        }
        self.focus_heading(&heading);
        Ok(())
    }

    fn scroll_window(&self, window: &web_sys::Window, top: f64) {
        if self.supports_smooth_scroll() {
            let options = web_sys::ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(web_sys::ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        } else {
            window.scroll_to_with_x_and_y(0.0, top);
        }
    }

    fn supports_smooth_scroll(&self) -> bool {
        if let Some(known) = self.smooth_supported.get() {
            return known;
        }
        let supported = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
            .map(|el| {
                js_sys::Reflect::has(&el.style(), &JsValue::from_str("scrollBehavior"))
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if !supported {
            leptos::logging::warn!("toc: {}; jumping instead", TocError::capability("smooth scrolling"));
        }
        self.smooth_supported.set(Some(supported));
        supported
    }

    fn replace_hash(&self, window: &web_sys::Window, id: &str) {
        let Ok(history) = window.history() else {
            return;
        };
        let url = format!("#{}", urlencoding::encode(id));
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(&url)) {
            leptos::logging::warn!("toc: {}", TocError::dom("history.replaceState", e));
        }
    }

    /// Focus the heading without scrolling so assistive technology announces it.
    fn focus_heading(self: &Rc<Self>, heading: &web_sys::Element) {
        self.release_focus_now();

        let focusable = is_natively_focusable(
            &heading.tag_name(),
            heading.has_attribute("href"),
            heading.has_attribute("tabindex"),
        );
        if !focusable {
            let _ = heading.set_attribute("tabindex", "-1");
            let _ = heading.set_attribute(TEMP_FOCUS_ATTR, "");
        }

        focus_without_scroll(heading);

        if focusable {
            return;
        }
        let weak = Rc::downgrade(self);
        let scheduled = set_timeout_with_handle(
            move || {
                if let Some(controller) = weak.upgrade() {
                    if let Some((el, _)) = controller.focus_release.borrow_mut().take() {
                        release_temp_focus(&el);
                    }
                }
            },
            Duration::from_millis(FOCUS_RELEASE_MS),
        );
        match scheduled {
            Ok(handle) => *self.focus_release.borrow_mut() = Some((heading.clone(), handle)),
            Err(_) => release_temp_focus(heading),
        }
    }

    /// Drop the temporary focusability of the previous target, if any.
    pub(crate) fn release_focus_now(&self) {
        if let Some((el, handle)) = self.focus_release.borrow_mut().take() {
            handle.clear();
            release_temp_focus(&el);
        }
    }
}

fn release_temp_focus(el: &web_sys::Element) {
    if el.has_attribute(TEMP_FOCUS_ATTR) {
        let _ = el.remove_attribute("tabindex");
        let _ = el.remove_attribute(TEMP_FOCUS_ATTR);
    }
}

fn focus_without_scroll(el: &web_sys::Element) {
    let options = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&options, &JsValue::from_str("preventScroll"), &JsValue::TRUE);
    let focused = js_sys::Reflect::get(el, &JsValue::from_str("focus"))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        .map(|f| f.call1(el, &options).is_ok())
        .unwrap_or(false);
    if !focused {
        if let Some(he) = el.dyn_ref::<web_sys::HtmlElement>() {
            let _ = he.focus();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_target_subtracts_offset() {
        assert_eq!(scroll_target(1_200.0, 80.0), 1_120.0);
        assert_eq!(scroll_target(1_200.0, 84.0), 1_116.0);
    }

    #[test]
    fn test_scroll_target_never_negative() {
        assert_eq!(scroll_target(30.0, 80.0), 0.0);
    }

    #[test]
    fn test_natively_focusable() {
        assert!(!is_natively_focusable("H2", false, false));
        assert!(is_natively_focusable("H2", false, true));
        assert!(is_natively_focusable("BUTTON", false, false));
        assert!(is_natively_focusable("A", true, false));
        assert!(!is_natively_focusable("A", false, false));
    }
}
