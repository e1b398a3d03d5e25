//! Table-of-contents widget for long pages.
//!
//! Scans a content root for headings, fills every `.toc-list` on the page
//! with links, and keeps the active link in step with the scroll position.
//! The host page provides the markup (see [`components::TocShell`]) and an
//! optional `window.tocSettings` object.

pub mod activator;
pub mod builder;
pub mod components;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod offset;
pub mod popup;
pub mod scroll;
pub mod slug;
pub mod tracker;
mod util;
pub mod widget;

pub use components::TocShell;
pub use config::{TocConfig, TocStrings};
pub use error::{TocError, TocErrorKind, TocResult};
pub use slug::{slugify, SlugCounter};
pub use tracker::Strategy;
pub use widget::{init, TocHandle};

use leptos_dom::helpers::window_event_listener_untyped;
use std::cell::RefCell;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;

thread_local! {
    static HANDLE: RefCell<Option<TocHandle>> = const { RefCell::new(None) };
}

/// (Re)initialize from `window.tocSettings`, tearing down any previous run.
///
/// Collaborator scripts call this after adjusting settings, e.g. lowering
/// `minHeadings` to 0 to always show the table of contents.
#[wasm_bindgen]
pub fn init_toc() {
    teardown();
    let handle = widget::init(&TocConfig::from_window());
    HANDLE.with(|slot| *slot.borrow_mut() = handle);
}

fn teardown() {
    let previous = HANDLE.with(|slot| slot.borrow_mut().take());
    if let Some(handle) = previous {
        handle.destroy();
    }
}

/// Run `f` once the document has parsed: now, or on `DOMContentLoaded`.
fn when_ready(document: &web_sys::Document, f: fn()) -> TocResult<()> {
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }
    let cb = wasm_bindgen::closure::Closure::once_into_js(f);
    document
        .add_event_listener_with_callback("DOMContentLoaded", cb.unchecked_ref())
        .map_err(|e| TocError::dom("addEventListener(DOMContentLoaded)", e))
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Err(e) = when_ready(&document, init_toc) {
        leptos::logging::warn!("toc: {e}");
    }

    // No persistence across loads; a page restored from the back/forward
    // cache gets a fresh run.
    let _pagehide = window_event_listener_untyped("pagehide", |_| teardown());
    let _pageshow = window_event_listener_untyped("pageshow", |ev| {
        let persisted = js_sys::Reflect::get(&ev, &"persisted".into())
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if persisted {
            init_toc();
        }
    });
}
