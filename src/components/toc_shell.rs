use icons::X;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

use crate::components::hooks::use_widget_id::use_widget_id_for;
use crate::config::TocStrings;

mod components {
    use super::*;
    clx! {TocTitle, p, "toc-title text-sm leading-none font-semibold", "mb-3"}
}

pub use components::*;

const TRIGGER_CLASS: &str = "toc-popup-trigger md:hidden fixed bottom-6 left-6 z-[99] inline-flex items-center justify-center h-10 px-4 rounded-full text-sm font-medium shadow-md bg-primary text-primary-foreground active:scale-95";
const LIST_CLASS: &str = "toc-list flex flex-col gap-1 text-sm [&_.toc-link.active]:text-primary [&_.toc-link.active]:font-medium";

/// Empty widget skeleton the runtime populates: a desktop list and,
/// optionally, a popup with its own list, trigger and close button.
#[component]
pub fn TocShell(
    #[prop(optional, into)] class: String,
    #[prop(optional)] strings: Option<TocStrings>,
    #[prop(default = true)] with_popup: bool,
) -> impl IntoView {
    let strings = strings.unwrap_or_default();
    let merged_class = tw_merge!("toc-widget relative hidden [&.toc-ready]:block", class);
    let label = strings.title.clone();
    let title = strings.title.clone();

    view! {
        <nav class=merged_class data-name="TocShell" aria-label=label>
            <div class="toc-desktop max-md:hidden">
                <TocTitle>{title}</TocTitle>
                <ul class=LIST_CLASS></ul>
            </div>
            {with_popup.then(|| view! { <TocPopup strings=strings /> })}
        </nav>
    }
}

/* ========================================================== */
/*                     ✨ FUNCTIONS ✨                        */
/* ========================================================== */

#[component]
fn TocPopup(strings: TocStrings) -> impl IntoView {
    let popup_id = use_widget_id_for("toc_popup");
    let controls = popup_id.clone();
    let dialog_label = strings.title.clone();
    let heading = strings.title.clone();
    let toggle = strings.toggle.clone();
    let close_label = strings.close.clone();
    let popup_class = tw_merge!(
        "toc-popup fixed inset-x-4 bottom-20 z-[100] max-h-[70vh] overflow-auto rounded-xl border bg-card p-4 shadow-lg transition-all duration-200",
        "data-[state=closed]:pointer-events-none data-[state=closed]:opacity-0 data-[state=open]:opacity-100",
    );

    view! {
        <button
            type="button"
            class=TRIGGER_CLASS
            aria-expanded="false"
            aria-controls=controls
        >
            {toggle}
        </button>

        <div
            id=popup_id
            class=popup_class
            data-state="closed"
            aria-hidden="true"
            role="dialog"
            aria-label=dialog_label
        >
            <button
                type="button"
                class="toc-popup-close absolute top-3 right-3 p-1 rounded-sm focus:ring-2 focus:outline-none [&_svg:not([class*='size-'])]:size-4"
                aria-label=close_label
            >
                <X />
            </button>
            <TocTitle>{heading}</TocTitle>
            <ol class=LIST_CLASS></ol>
        </div>
    }
}
