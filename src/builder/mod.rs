use crate::activator::LinkIndex;
use crate::config::TocStrings;
use crate::error::{TocError, TocResult};
use crate::slug::SlugCounter;
use crate::util::query_all;
use crate::widget::{EXCLUDE_ATTR, EXCLUDE_CLASS, GENERATED_ATTR, ITEM_CLASS, LINK_CLASS, TARGET_ATTR, WIDGET_SELECTOR};
use wasm_bindgen::JsCast;

/// A heading in document order with its (possibly generated) identifier.
#[derive(Clone, Debug)]
pub struct HeadingRecord {
    pub element: web_sys::Element,
    pub id: String,
    pub text: String,
}

/// A populated list container and its links in document order.
#[derive(Clone, Debug)]
pub struct ListContainer {
    pub element: web_sys::Element,
    pub links: Vec<web_sys::HtmlElement>,
}

/// Rendered text with whitespace runs collapsed.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identifiers for a run of headings.
///
/// Existing identifiers are kept and reserved first so generated ones
/// never collide with them; the rest are slugged from `texts` with `prefix`.
pub fn plan_ids(existing: &[Option<String>], texts: &[String], prefix: &str) -> Vec<String> {
    let mut counter = SlugCounter::new();
    for id in existing.iter().flatten() {
        counter.reserve(id.clone());
    }
    existing
        .iter()
        .zip(texts)
        .map(|(id, text)| match id {
            Some(id) => id.clone(),
            None => counter.generate_with(text, |slug| format!("{prefix}{slug}")),
        })
        .collect()
}

/// Headings under `root` matching `selector`, minus excluded ones and the widget's own.
pub fn discover_headings(root: &web_sys::Element, selector: &str) -> TocResult<Vec<web_sys::Element>> {
    Ok(query_all(root, selector)?
        .into_iter()
        .filter(|h| !is_excluded(h))
        .collect())
}

fn is_excluded(heading: &web_sys::Element) -> bool {
    heading.has_attribute(EXCLUDE_ATTR)
        || heading.class_list().contains(EXCLUDE_CLASS)
        || heading.closest(WIDGET_SELECTOR).ok().flatten().is_some()
}

/// Ensure every heading carries an identifier, mutating the ones that lack it.
pub fn assign_ids(headings: &[web_sys::Element], prefix: &str) -> Vec<HeadingRecord> {
    let existing: Vec<Option<String>> = headings
        .iter()
        .map(|h| Some(h.id()).filter(|id| !id.trim().is_empty()))
        .collect();
    let texts: Vec<String> = headings
        .iter()
        .map(|h| normalize_text(&h.text_content().unwrap_or_default()))
        .collect();
    let ids = plan_ids(&existing, &texts, prefix);

    headings
        .iter()
        .zip(existing)
        .zip(ids.into_iter().zip(texts))
        .map(|((element, had), (id, text))| {
            if had.is_none() {
                element.set_id(&id);
            }
            HeadingRecord {
                element: element.clone(),
                id,
                text,
            }
        })
        .collect()
}

/// Populate every container with one link per heading, in document order,
/// recording each link in `index`.
///
/// Links left by an earlier run are removed first.
pub fn build_links(
    headings: &[HeadingRecord],
    containers: &[web_sys::Element],
    strings: &TocStrings,
    index: &mut LinkIndex<web_sys::Element>,
) -> TocResult<Vec<ListContainer>> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| TocError::missing_target("document"))?;

    let mut built = Vec::with_capacity(containers.len());

    for container in containers {
        clear_generated(container)?;
        let wrap_in_item = matches!(container.tag_name().to_ascii_lowercase().as_str(), "ul" | "ol");
        let mut links = Vec::with_capacity(headings.len());

        for heading in headings {
            let link = create_link(&document, heading, strings)?;
            if wrap_in_item {
                let item = document
                    .create_element("li")
                    .map_err(|e| TocError::dom("createElement(li)", e))?;
                item.set_class_name(ITEM_CLASS);
                let _ = item.set_attribute(GENERATED_ATTR, "");
                item.append_child(&link)
                    .map_err(|e| TocError::dom("appendChild", e))?;
                container
                    .append_child(&item)
                    .map_err(|e| TocError::dom("appendChild", e))?;
            } else {
                let _ = link.set_attribute(GENERATED_ATTR, "");
                container
                    .append_child(&link)
                    .map_err(|e| TocError::dom("appendChild", e))?;
            }
            index.insert(heading.id.clone(), link.clone());
            if let Ok(he) = link.dyn_into::<web_sys::HtmlElement>() {
                links.push(he);
            }
        }

        built.push(ListContainer {
            element: container.clone(),
            links,
        });
    }

    Ok(built)
}

fn create_link(
    document: &web_sys::Document,
    heading: &HeadingRecord,
    strings: &TocStrings,
) -> TocResult<web_sys::Element> {
    let link = document
        .create_element("a")
        .map_err(|e| TocError::dom("createElement(a)", e))?;
    link.set_class_name(LINK_CLASS);
    let _ = link.set_attribute("href", &format!("#{}", heading.id));
    let _ = link.set_attribute(TARGET_ATTR, &heading.id);
    let _ = link.set_attribute("aria-label", &strings.section_label(&heading.text));
    link.set_text_content(Some(&heading.text));
    Ok(link)
}

fn clear_generated(container: &web_sys::Element) -> TocResult<()> {
    for stale in query_all(container, &format!("[{GENERATED_ATTR}]"))? {
        stale.remove();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Getting\n   started \t"), "Getting started");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_plan_ids_duplicates_with_prefix() {
        let ids = plan_ids(&[None, None, None], &texts(&["Intro", "Intro", "Summary"]), "toc-");
        assert_eq!(ids, vec!["toc-intro", "toc-intro-2", "toc-summary"]);
    }

    #[test]
    fn test_plan_ids_keeps_existing() {
        let existing = vec![Some("custom".to_string()), None];
        let ids = plan_ids(&existing, &texts(&["Intro", "Intro"]), "toc-");
        assert_eq!(ids, vec!["custom", "toc-intro"]);
    }

    #[test]
    fn test_plan_ids_avoids_existing_collision() {
        let existing = vec![None, Some("toc-intro".to_string())];
        let ids = plan_ids(&existing, &texts(&["Intro", "Whatever"]), "toc-");
        assert_eq!(ids, vec!["toc-intro-2", "toc-intro"]);
    }

    #[test]
    fn test_plan_ids_empty_prefix() {
        let ids = plan_ids(&[None, None], &texts(&["Intro", "Intro"]), "");
        assert_eq!(ids, vec!["intro", "intro-2"]);
    }

    #[test]
    fn test_plan_ids_blank_headings_are_numbered() {
        let ids = plan_ids(&[None, None], &texts(&["", "   "]), "toc-");
        assert_eq!(ids, vec!["toc-", "toc--2"]);
    }
}
