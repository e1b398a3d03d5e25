/// Candidate sticky/fixed headers, checked in order.
pub const HEADER_SELECTORS: &[&str] = &[
    ".site-header",
    "#masthead",
    ".sticky-header",
    "[data-sticky=\"true\"]",
    ".fixed-header",
    ".header-fixed",
    "[class*=\"fixed-header\"]",
];

/// Space kept between a sticky header and the heading it uncovers.
pub const HEADER_PADDING: f64 = 20.0;

/// Measured state of one candidate header.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderProbe {
    pub position: String,
    pub height: f64,
}

impl HeaderProbe {
    pub fn pins_to_viewport(&self) -> bool {
        matches!(self.position.trim(), "fixed" | "sticky")
    }
}

/// First pinned header wins; otherwise the configured default.
pub fn resolve_offset(probes: impl IntoIterator<Item = HeaderProbe>, default_offset: f64) -> f64 {
    probes
        .into_iter()
        .find(HeaderProbe::pins_to_viewport)
        .map(|p| p.height.max(0.0) + HEADER_PADDING)
        .unwrap_or(default_offset)
}

/// Scroll offset for the current layout. Measured on every call since
/// headers can turn sticky while the page scrolls.
pub fn compute_offset(default_offset: f64) -> f64 {
    let probes = HEADER_SELECTORS.iter().filter_map(|selector| probe(selector));
    resolve_offset(probes, default_offset)
}

fn probe(selector: &str) -> Option<HeaderProbe> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let el = document.query_selector(selector).ok().flatten()?;
    let position = window
        .get_computed_style(&el)
        .ok()
        .flatten()
        .and_then(|style| style.get_property_value("position").ok())
        .unwrap_or_default();
    let height = el.get_bounding_client_rect().height();
    Some(HeaderProbe { position, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(position: &str, height: f64) -> HeaderProbe {
        HeaderProbe {
            position: position.to_string(),
            height,
        }
    }

    #[test]
    fn test_fixed_header_adds_padding() {
        assert_eq!(resolve_offset([probe("fixed", 64.0)], 80.0), 84.0);
        assert_eq!(resolve_offset([probe("sticky", 50.0)], 80.0), 70.0);
    }

    #[test]
    fn test_static_headers_are_skipped() {
        let probes = [probe("static", 200.0), probe("relative", 90.0), probe("fixed", 40.0)];
        assert_eq!(resolve_offset(probes, 80.0), 60.0);
    }

    #[test]
    fn test_no_pinned_header_uses_default() {
        assert_eq!(resolve_offset([probe("static", 64.0)], 80.0), 80.0);
        assert_eq!(resolve_offset(Vec::new(), 32.0), 32.0);
    }

    #[test]
    fn test_first_pinned_header_wins() {
        let probes = [probe("sticky", 30.0), probe("fixed", 100.0)];
        assert_eq!(resolve_offset(probes, 80.0), 50.0);
    }
}
