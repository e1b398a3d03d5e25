use super::{
    probe_line, scan_active, IntersectionLedger, Pending, Strategy, Suppression, TrackerState,
    INTERSECTION_BATCH_MS, OBSERVER_ROOT_MARGIN, RESIZE_DEBOUNCE_MS,
};
use crate::builder::HeadingRecord;
use crate::error::{TocError, TocResult};
use crate::offset::compute_offset;
use crate::util::{document_top, now_ms, scroll_y};
use crate::widget::SharedActivator;
use leptos::ev;
use leptos_dom::helpers::{
    request_animation_frame, set_timeout_with_handle, window_event_listener, TimeoutHandle,
    WindowListenerHandle,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>;

struct TrackedHeading {
    id: String,
    element: web_sys::Element,
}

/// Keeps the active link in step with what is on screen.
pub(crate) struct ActiveSectionTracker {
    strategy: Strategy,
    headings: Vec<TrackedHeading>,
    activator: SharedActivator,
    suppression: Rc<Suppression>,
    default_offset: f64,
    state: Cell<TrackerState>,

    ledger: RefCell<IntersectionLedger>,
    batch: RefCell<Option<TimeoutHandle>>,
    observer: RefCell<Option<(web_sys::IntersectionObserver, ObserverCallback)>>,

    frame: Cell<Pending>,
    resize_timer: RefCell<Option<TimeoutHandle>>,
    listeners: RefCell<Vec<WindowListenerHandle>>,
}

impl ActiveSectionTracker {
    pub(crate) fn new(
        strategy: Strategy,
        headings: &[HeadingRecord],
        activator: SharedActivator,
        suppression: Rc<Suppression>,
        default_offset: f64,
    ) -> Rc<Self> {
        Rc::new(Self {
            strategy,
            headings: headings
                .iter()
                .map(|h| TrackedHeading {
                    id: h.id.clone(),
                    element: h.element.clone(),
                })
                .collect(),
            activator,
            suppression,
            default_offset,
            state: Cell::new(TrackerState::Created),
            ledger: RefCell::new(IntersectionLedger::new()),
            batch: RefCell::new(None),
            observer: RefCell::new(None),
            frame: Cell::new(Pending::Idle),
            resize_timer: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub(crate) fn start(self: &Rc<Self>) -> TocResult<()> {
        if self.state.get() != TrackerState::Created {
            return Ok(());
        }
        match self.strategy {
            Strategy::Intersection => self.observe_headings()?,
            Strategy::ScrollScan => {
                self.listen_scroll();
                // Mid-page loads need a correct state before the first scroll event.
                self.scan();
            }
        }
        self.state.set(self.state.get().start(self.strategy));
        Ok(())
    }

    pub(crate) fn stop(&self) {
        if let Some((observer, _callback)) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
        if let Some(handle) = self.batch.borrow_mut().take() {
            handle.clear();
        }
        if let Some(handle) = self.resize_timer.borrow_mut().take() {
            handle.clear();
        }
        for handle in self.listeners.borrow_mut().drain(..) {
            handle.remove();
        }
        self.ledger.borrow_mut().clear();
        self.state.set(self.state.get().stop());
    }

    fn is_running(&self) -> bool {
        matches!(self.state.get(), TrackerState::Running(_) | TrackerState::Created)
    }

    /* ---------------------- intersection strategy ---------------------- */

    fn observe_headings(self: &Rc<Self>) -> TocResult<()> {
        let weak = Rc::downgrade(self);
        let callback: ObserverCallback = Closure::new(
            move |entries: js_sys::Array, _observer: web_sys::IntersectionObserver| {
                if let Some(tracker) = weak.upgrade() {
                    tracker.on_intersections(&entries);
                }
            },
        );

        let options = web_sys::IntersectionObserverInit::new();
        options.set_root_margin(OBSERVER_ROOT_MARGIN);
        options.set_threshold(&JsValue::from_f64(0.0));

        let observer = web_sys::IntersectionObserver::new_with_options(
            callback.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|e| TocError::dom("IntersectionObserver", e))?;

        for heading in &self.headings {
            observer.observe(&heading.element);
        }
        *self.observer.borrow_mut() = Some((observer, callback));
        Ok(())
    }

    fn on_intersections(self: &Rc<Self>, entries: &js_sys::Array) {
        {
            let mut ledger = self.ledger.borrow_mut();
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<web_sys::IntersectionObserverEntry>() else {
                    continue;
                };
                let id = entry.target().id();
                if id.is_empty() {
                    continue;
                }
                ledger.record(&id, entry.is_intersecting());
            }
        }
        self.schedule_batch();
    }

    fn schedule_batch(self: &Rc<Self>) {
        if let Some(handle) = self.batch.borrow_mut().take() {
            handle.clear();
        }
        let weak = Rc::downgrade(self);
        let scheduled = set_timeout_with_handle(
            move || {
                if let Some(tracker) = weak.upgrade() {
                    tracker.batch.borrow_mut().take();
                    tracker.flush_batch();
                }
            },
            Duration::from_millis(INTERSECTION_BATCH_MS),
        );
        if let Ok(handle) = scheduled {
            *self.batch.borrow_mut() = Some(handle);
        }
    }

    fn flush_batch(&self) {
        if !self.is_running() || self.suppression.is_engaged(now_ms()) {
            return;
        }
        let current = self.ledger.borrow().current().map(str::to_string);
        if let Some(id) = current {
            self.activator.borrow_mut().activate(&id);
        }
    }

    /* ---------------------- scroll-scan strategy ----------------------- */

    fn listen_scroll(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let on_scroll = window_event_listener(ev::scroll, move |_| {
            if let Some(tracker) = weak.upgrade() {
                tracker.request_frame();
            }
        });

        let weak = Rc::downgrade(self);
        let on_resize = window_event_listener(ev::resize, move |_| {
            if let Some(tracker) = weak.upgrade() {
                tracker.debounce_resize();
            }
        });

        self.listeners.borrow_mut().extend([on_scroll, on_resize]);
    }

    fn request_frame(self: &Rc<Self>) {
        if self.frame.get() == Pending::Scheduled {
            return;
        }
        self.frame.set(Pending::Scheduled);
        let weak: Weak<Self> = Rc::downgrade(self);
        request_animation_frame(move || {
            if let Some(tracker) = weak.upgrade() {
                tracker.frame.set(Pending::Idle);
                tracker.scan();
            }
        });
    }

    fn debounce_resize(self: &Rc<Self>) {
        if let Some(handle) = self.resize_timer.borrow_mut().take() {
            handle.clear();
        }
        let weak = Rc::downgrade(self);
        let scheduled = set_timeout_with_handle(
            move || {
                if let Some(tracker) = weak.upgrade() {
                    tracker.resize_timer.borrow_mut().take();
                    tracker.scan();
                }
            },
            Duration::from_millis(RESIZE_DEBOUNCE_MS),
        );
        if let Ok(handle) = scheduled {
            *self.resize_timer.borrow_mut() = Some(handle);
        }
    }

    fn scan(&self) {
        if !self.is_running() || self.suppression.is_engaged(now_ms()) {
            return;
        }
        let probe = probe_line(scroll_y(), compute_offset(self.default_offset));
        let tops: Vec<f64> = self
            .headings
            .iter()
            .map(|h| document_top(&h.element))
            .collect();
        if let Some(i) = scan_active(&tops, probe) {
            self.activator.borrow_mut().activate(&self.headings[i].id);
        }
    }
}

impl Drop for ActiveSectionTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
