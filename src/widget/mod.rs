//! Widget discovery and wiring.
//!
//! Each `.toc-widget` on the page becomes one [`WidgetInstance`] pairing its
//! trigger, popup and list containers, so several widgets (inline and global
//! navigation, say) never reach into each other.

use crate::activator::{LinkActivator, LinkIndex};
use crate::builder::{assign_ids, build_links, discover_headings, HeadingRecord, ListContainer};
use crate::config::TocConfig;
use crate::error::{TocError, TocResult};
use crate::keyboard::handle_keydown;
use crate::popup::PopupController;
use crate::scroll::ScrollController;
use crate::tracker::{choose_strategy, ActiveSectionTracker, Strategy, Suppression};
use crate::util::{has_global, query_all, EventListenerGuard};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;

pub const WIDGET_SELECTOR: &str = ".toc-widget";
pub const LIST_SELECTOR: &str = ".toc-list";
pub const POPUP_SELECTOR: &str = ".toc-popup";
pub const TRIGGER_SELECTOR: &str = ".toc-popup-trigger";
pub const CLOSE_SELECTOR: &str = ".toc-popup-close";

pub const LINK_CLASS: &str = "toc-link";
pub const ITEM_CLASS: &str = "toc-item";
pub const OPEN_CLASS: &str = "is-open";
pub const BODY_OPEN_CLASS: &str = "toc-popup-open";
pub const READY_CLASS: &str = "toc-ready";
pub const EXCLUDE_CLASS: &str = "toc-exclude";

pub const COUNT_ATTR: &str = "data-heading-count";
pub const STRATEGY_ATTR: &str = "data-toc-strategy";
pub const TARGET_ATTR: &str = "data-toc-target";
pub const GENERATED_ATTR: &str = "data-toc-generated";
pub const EXCLUDE_ATTR: &str = "data-toc-exclude";

pub(crate) type SharedActivator = Rc<RefCell<LinkActivator<web_sys::Element>>>;

/// One widget on the page, discovered structurally.
pub(crate) struct WidgetInstance {
    containers: Vec<ListContainer>,
    popup: Option<Rc<PopupController>>,
}

/// Raw parts found under a `.toc-widget` before links exist.
struct WidgetParts {
    root: web_sys::Element,
    containers: Vec<web_sys::Element>,
    popup: Option<web_sys::Element>,
    trigger: Option<web_sys::Element>,
}

fn discover_widgets(document: &web_sys::Document) -> TocResult<Vec<WidgetParts>> {
    let Some(html) = document.document_element() else {
        return Ok(Vec::new());
    };
    query_all(&html, WIDGET_SELECTOR)?
        .into_iter()
        .map(|root| {
            let containers = query_all(&root, LIST_SELECTOR)?;
            let popup = root.query_selector(POPUP_SELECTOR).ok().flatten();
            let trigger = root.query_selector(TRIGGER_SELECTOR).ok().flatten();
            Ok(WidgetParts {
                root,
                containers,
                popup,
                trigger,
            })
        })
        .collect()
}

/// Everything an initialized page holds on to. Dropping it (or calling
/// [`TocHandle::destroy`]) removes every listener, observer and timer.
pub struct TocHandle {
    instances: Vec<WidgetInstance>,
    headings: Vec<HeadingRecord>,
    activator: SharedActivator,
    scroll: Rc<ScrollController>,
    tracker: Option<Rc<ActiveSectionTracker>>,
    listeners: Vec<EventListenerGuard>,
}

impl TocHandle {
    /// Currently active heading identifier.
    pub fn active(&self) -> Option<String> {
        self.activator.borrow().active().map(str::to_string)
    }

    /// Route a heading activation through the single owner of link state.
    pub fn activate(&self, id: &str) -> bool {
        self.activator.borrow_mut().activate(id)
    }

    /// Scroll to a heading as a link click would, without a popup to close.
    pub fn scroll_to_heading(&self, id: &str) -> bool {
        match self.scroll.scroll_to_heading(id, None) {
            Ok(()) => true,
            Err(e) => {
                leptos::logging::warn!("toc: {e}");
                false
            }
        }
    }

    pub fn heading_ids(&self) -> Vec<String> {
        self.headings.iter().map(|h| h.id.clone()).collect()
    }

    /// Link entries across all containers.
    pub fn link_count(&self) -> usize {
        self.activator.borrow().index().len()
    }

    pub fn widget_count(&self) -> usize {
        self.instances.len()
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.tracker.as_ref().map(|t| t.strategy())
    }

    /// `href`s of each container of widget `widget`, in insertion order.
    pub fn container_hrefs(&self, widget: usize) -> Vec<Vec<String>> {
        self.instances
            .get(widget)
            .map(|instance| {
                instance
                    .containers
                    .iter()
                    .map(|c| c.links.iter().filter_map(|l| l.get_attribute("href")).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether widget `widget` has a popup that is currently open.
    pub fn popup_open(&self, widget: usize) -> Option<bool> {
        let popup = self.instances.get(widget)?.popup.as_ref()?;
        Some(popup.state().is_open())
    }

    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for TocHandle {
    fn drop(&mut self) {
        self.listeners.clear();
        if let Some(tracker) = self.tracker.take() {
            tracker.stop();
        }
        for instance in &self.instances {
            if let Some(popup) = &instance.popup {
                popup.close();
            }
        }
        self.scroll.release_focus_now();
    }
}

/// Initialize every widget on the page. Never fails outward: problems are
/// logged and the page is left as it was.
pub fn init(config: &TocConfig) -> Option<TocHandle> {
    match try_init(config) {
        Ok(handle) => handle,
        Err(e) => {
            leptos::logging::warn!("toc: {e}");
            None
        }
    }
}

fn try_init(config: &TocConfig) -> TocResult<Option<TocHandle>> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| TocError::missing_target("document"))?;

    let parts = discover_widgets(&document)?;

    // A bad selector counts as a missing root; the count annotation still happens.
    let headings = match document
        .query_selector(&config.content_selector)
        .map_err(|e| TocError::dom("content selector", e))
        .and_then(|root| match root {
            Some(root) => discover_headings(&root, &config.heading_selector),
            None => Ok(Vec::new()),
        }) {
        Ok(headings) => headings,
        Err(e) => {
            leptos::logging::warn!("toc: {e}");
            Vec::new()
        }
    };
    let count = headings.len();

    for part in &parts {
        let _ = part.root.set_attribute(COUNT_ATTR, &count.to_string());
    }

    if count < config.min_headings as usize || count == 0 {
        leptos::logging::log!(
            "toc: {count} heading(s), {} required; table of contents stays hidden",
            config.min_headings
        );
        return Ok(None);
    }
    if parts.iter().all(|p| p.containers.is_empty()) {
        return Ok(None);
    }

    // Links must exist before anything observes or activates them.
    let records = assign_ids(&headings, &config.id_prefix);
    let mut index = LinkIndex::new();
    let mut built_parts = Vec::with_capacity(parts.len());
    for part in parts {
        let containers = build_links(&records, &part.containers, &config.strings, &mut index)?;
        built_parts.push((part, containers));
    }

    let activator: SharedActivator = Rc::new(RefCell::new(LinkActivator::new(index)));
    let suppression = Rc::new(Suppression::new());
    let scroll = ScrollController::new(
        activator.clone(),
        suppression.clone(),
        config.scroll_offset,
        config.update_hash,
    );
    let strategy = choose_strategy(count, config.observer_limit, has_global("IntersectionObserver"));

    let mut listeners = Vec::new();
    let mut instances = Vec::with_capacity(built_parts.len());
    for (part, containers) in built_parts {
        if !containers.is_empty() {
            let _ = part.root.class_list().add_1(READY_CLASS);
            let _ = part.root.set_attribute(STRATEGY_ATTR, strategy.as_ref());
        }
        let popup = part
            .popup
            .map(|popup| PopupController::new(popup, part.trigger.clone()));
        if let Some(popup) = &popup {
            wire_popup(popup, &mut listeners)?;
        }
        for container in &containers {
            let closes = popup
                .as_ref()
                .filter(|p| p.contains(&container.element))
                .cloned();
            wire_container(container, &scroll, closes, &mut listeners)?;
        }
        instances.push(WidgetInstance { containers, popup });
    }

    let tracker = ActiveSectionTracker::new(
        strategy,
        &records,
        activator.clone(),
        suppression,
        config.scroll_offset,
    );
    tracker.start()?;

    // Fragment last, so it wins over the eager scan; matching alone never scrolls.
    if let Some(id) = current_fragment() {
        activator.borrow_mut().activate(&id);
    }

    leptos::logging::log!(
        "toc: {count} heading(s), {} widget(s), {} link(s), strategy {strategy}",
        instances.len(),
        activator.borrow().index().len(),
    );

    Ok(Some(TocHandle {
        instances,
        headings: records,
        activator,
        scroll,
        tracker: Some(tracker),
        listeners,
    }))
}

/// Click and keyboard handling for one populated container.
fn wire_container(
    container: &ListContainer,
    scroll: &Rc<ScrollController>,
    closes: Option<Rc<PopupController>>,
    listeners: &mut Vec<EventListenerGuard>,
) -> TocResult<()> {
    let scroll = scroll.clone();
    listeners.push(EventListenerGuard::listen(
        &container.element,
        "click",
        move |ev| on_link_click(&scroll, closes.as_ref(), &ev),
    )?);

    let links = container.links.clone();
    listeners.push(EventListenerGuard::listen(
        &container.element,
        "keydown",
        move |ev| handle_keydown(&links, &ev),
    )?);
    Ok(())
}

fn on_link_click(scroll: &Rc<ScrollController>, popup: Option<&Rc<PopupController>>, ev: &web_sys::Event) {
    if let Some(mouse) = ev.dyn_ref::<web_sys::MouseEvent>() {
        // Let the browser handle new-tab and new-window clicks.
        if mouse.button() != 0 || mouse.ctrl_key() || mouse.meta_key() || mouse.shift_key() {
            return;
        }
    }
    let Some(link) = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .and_then(|el| el.closest(&format!("a.{LINK_CLASS}")).ok().flatten())
    else {
        return;
    };
    let Some(id) = link.get_attribute(TARGET_ATTR) else {
        return;
    };

    ev.prevent_default();
    if let Err(e) = scroll.scroll_to_heading(&id, Some(&link)) {
        leptos::logging::warn!("toc: {e}");
    }
    if let Some(popup) = popup {
        popup.close();
    }
}

fn wire_popup(popup: &Rc<PopupController>, listeners: &mut Vec<EventListenerGuard>) -> TocResult<()> {
    if let Some(trigger) = popup.trigger() {
        let weak = Rc::downgrade(popup);
        listeners.push(EventListenerGuard::listen(trigger, "click", move |ev| {
            ev.prevent_default();
            if let Some(popup) = weak.upgrade() {
                popup.toggle();
            }
        })?);
    }
    for close in query_all(popup.popup(), CLOSE_SELECTOR)? {
        let weak = Rc::downgrade(popup);
        listeners.push(EventListenerGuard::listen(&close, "click", move |ev| {
            ev.prevent_default();
            if let Some(popup) = weak.upgrade() {
                popup.close();
            }
        })?);
    }
    Ok(())
}

/// Percent-decoded URL fragment without the `#`.
fn current_fragment() -> Option<String> {
    let hash = web_sys::window()?.location().hash().ok()?;
    parse_fragment(&hash)
}

pub(crate) fn parse_fragment(hash: &str) -> Option<String> {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    if raw.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment() {
        assert_eq!(parse_fragment("#toc-summary").as_deref(), Some("toc-summary"));
        assert_eq!(parse_fragment("toc-summary").as_deref(), Some("toc-summary"));
        assert_eq!(parse_fragment("#"), None);
        assert_eq!(parse_fragment(""), None);
    }

    #[test]
    fn test_parse_fragment_decodes() {
        assert_eq!(parse_fragment("#caf%C3%A9").as_deref(), Some("café"));
        assert_eq!(parse_fragment("#with%20space").as_deref(), Some("with space"));
    }
}
