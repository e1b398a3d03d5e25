use crate::error::{TocError, TocResult};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

pub(crate) fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Whether `window[name]` exists (feature detection).
pub(crate) fn has_global(name: &str) -> bool {
    web_sys::window()
        .map(|w| js_sys::Reflect::has(&w, &JsValue::from_str(name)).unwrap_or(false))
        .unwrap_or(false)
}

pub(crate) fn scroll_y() -> f64 {
    web_sys::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0)
}

/// Top of `el` relative to the document, not the viewport.
pub(crate) fn document_top(el: &web_sys::Element) -> f64 {
    el.get_bounding_client_rect().top() + scroll_y()
}

/// `querySelectorAll` collected into elements.
pub(crate) fn query_all(root: &web_sys::Element, selector: &str) -> TocResult<Vec<web_sys::Element>> {
    let list = root
        .query_selector_all(selector)
        .map_err(|e| TocError::dom(&format!("querySelectorAll({selector})"), e))?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect())
}

/// Element-level listener that unregisters itself when dropped.
///
/// Window-level listeners go through `leptos_dom::helpers::window_event_listener`
/// instead; this covers widget elements that come and go with a handle.
pub(crate) struct EventListenerGuard {
    target: web_sys::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventListenerGuard {
    pub(crate) fn listen(
        target: &web_sys::EventTarget,
        event: &'static str,
        cb: impl FnMut(web_sys::Event) + 'static,
    ) -> TocResult<Self> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(cb);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| TocError::dom(&format!("addEventListener({event})"), e))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for EventListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}
