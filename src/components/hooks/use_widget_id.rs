use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "toc"; // Must NOT contain "/" or "-"

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Page-unique element id, e.g. `toc_popup_toc_3`, for pairing a trigger
/// with its popup through `aria-controls`.
pub fn use_widget_id_for(element: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{element}_{PREFIX}_{n}")
}
