use std::collections::HashMap;

pub const ACTIVE_CLASS: &str = "active";

/// Something that can show or hide the active state of one link entry.
pub trait LinkMarker {
    fn mark(&self, active: bool);
}

impl LinkMarker for web_sys::Element {
    fn mark(&self, active: bool) {
        let classes = self.class_list();
        if active {
            let _ = classes.add_1(ACTIVE_CLASS);
            let _ = self.set_attribute("aria-current", "location");
        } else {
            let _ = classes.remove_1(ACTIVE_CLASS);
            let _ = self.remove_attribute("aria-current");
        }
    }
}

/// Identifier -> link entries across every list container, built once by the builder.
#[derive(Clone, Debug)]
pub struct LinkIndex<L> {
    by_id: HashMap<String, Vec<L>>,
}

impl<L> Default for LinkIndex<L> {
    fn default() -> Self {
        Self { by_id: HashMap::new() }
    }
}

impl<L> LinkIndex<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, link: L) {
        self.by_id.entry(id.into()).or_default().push(link);
    }

    pub fn links_for(&self, id: &str) -> &[L] {
        self.by_id.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Total number of link entries.
    pub fn len(&self) -> usize {
        self.by_id.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn all(&self) -> impl Iterator<Item = &L> {
        self.by_id.values().flatten()
    }
}

/// Sole owner of the active identifier.
///
/// Other components call through [`LinkActivator::activate`]; the state is
/// mirrored onto the link entries for styling.
#[derive(Debug)]
pub struct LinkActivator<L: LinkMarker> {
    index: LinkIndex<L>,
    active: Option<String>,
}

impl<L: LinkMarker> LinkActivator<L> {
    pub fn new(index: LinkIndex<L>) -> Self {
        Self { index, active: None }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn index(&self) -> &LinkIndex<L> {
        &self.index
    }

    /// Make `id` the only active identifier. Unknown identifiers leave the
    /// state untouched and return `false`.
    pub fn activate(&mut self, id: &str) -> bool {
        if !self.index.contains(id) {
            return false;
        }
        for link in self.index.all() {
            link.mark(false);
        }
        for link in self.index.links_for(id) {
            link.mark(true);
        }
        self.active = Some(id.to_string());
        true
    }

    pub fn clear(&mut self) {
        for link in self.index.all() {
            link.mark(false);
        }
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeLink(Rc<Cell<bool>>);

    impl LinkMarker for FakeLink {
        fn mark(&self, active: bool) {
            self.0.set(active);
        }
    }

    impl FakeLink {
        fn is_active(&self) -> bool {
            self.0.get()
        }
    }

    /// Two containers (desktop + popup) for three headings.
    fn fixture() -> (LinkActivator<FakeLink>, HashMap<&'static str, Vec<FakeLink>>) {
        let mut index = LinkIndex::new();
        let mut handles: HashMap<&'static str, Vec<FakeLink>> = HashMap::new();
        for _container in 0..2 {
            for id in ["intro", "intro-2", "summary"] {
                let link = FakeLink::default();
                index.insert(id, link.clone());
                handles.entry(id).or_default().push(link);
            }
        }
        (LinkActivator::new(index), handles)
    }

    #[test]
    fn test_activate_marks_every_container() {
        let (mut activator, handles) = fixture();
        assert!(activator.activate("summary"));
        assert_eq!(activator.active(), Some("summary"));
        assert!(handles["summary"].iter().all(FakeLink::is_active));
        assert!(handles["intro"].iter().all(|l| !l.is_active()));
        assert!(handles["intro-2"].iter().all(|l| !l.is_active()));
    }

    #[test]
    fn test_activate_moves_marker() {
        let (mut activator, handles) = fixture();
        activator.activate("intro");
        activator.activate("intro-2");
        assert!(handles["intro"].iter().all(|l| !l.is_active()));
        assert!(handles["intro-2"].iter().all(FakeLink::is_active));
    }

    #[test]
    fn test_activate_is_idempotent() {
        let (mut activator, handles) = fixture();
        activator.activate("intro");
        activator.activate("intro");
        assert_eq!(activator.active(), Some("intro"));
        let active_count = handles.values().flatten().filter(|l| l.is_active()).count();
        assert_eq!(active_count, 2);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let (mut activator, handles) = fixture();
        activator.activate("intro");
        assert!(!activator.activate("missing"));
        assert_eq!(activator.active(), Some("intro"));
        assert!(handles["intro"].iter().all(FakeLink::is_active));
    }

    #[test]
    fn test_clear() {
        let (mut activator, handles) = fixture();
        activator.activate("summary");
        activator.clear();
        assert_eq!(activator.active(), None);
        assert!(handles.values().flatten().all(|l| !l.is_active()));
    }

    #[test]
    fn test_index_len() {
        let (activator, _) = fixture();
        assert_eq!(activator.index().len(), 6);
        assert_eq!(activator.index().links_for("intro").len(), 2);
        assert!(activator.index().links_for("nope").is_empty());
    }
}
