use crate::error::{TocError, TocResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_CONTENT_SELECTOR: &str = "article, main, .entry-content";
pub const DEFAULT_HEADING_SELECTOR: &str = "h2";
pub const DEFAULT_SCROLL_OFFSET: f64 = 80.0;
pub const DEFAULT_MIN_HEADINGS: u32 = 1;
pub const DEFAULT_ID_PREFIX: &str = "toc-";
pub const DEFAULT_OBSERVER_LIMIT: usize = 100;

/// Global the host page sets before the module loads.
pub const SETTINGS_GLOBAL: &str = "tocSettings";

/// Localized labels.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TocStrings {
    pub go_to_section: String,
    pub title: String,
    pub toggle: String,
    pub close: String,
}

impl Default for TocStrings {
    fn default() -> Self {
        Self {
            go_to_section: "Go to section".to_string(),
            title: "Table of contents".to_string(),
            toggle: "Show table of contents".to_string(),
            close: "Close table of contents".to_string(),
        }
    }
}

impl TocStrings {
    /// Accessible label for a link entry.
    ///
    /// `%s` in the phrase is replaced by the heading text; without a placeholder
    /// the text is appended after a colon.
    pub fn section_label(&self, heading_text: &str) -> String {
        let phrase = self.go_to_section.trim();
        if phrase.contains("%s") {
            phrase.replace("%s", heading_text)
        } else if phrase.is_empty() {
            heading_text.to_string()
        } else {
            format!("{phrase}: {heading_text}")
        }
    }
}

/// Per-initialization settings. Every field falls back to its own default.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TocConfig {
    #[serde(deserialize_with = "lenient_selector_content")]
    pub content_selector: String,
    #[serde(deserialize_with = "lenient_selector_heading")]
    pub heading_selector: String,
    #[serde(deserialize_with = "lenient_offset")]
    pub scroll_offset: f64,
    #[serde(deserialize_with = "lenient_min_headings")]
    pub min_headings: u32,
    #[serde(deserialize_with = "lenient_prefix")]
    pub id_prefix: String,
    #[serde(deserialize_with = "lenient_observer_limit")]
    pub observer_limit: usize,
    #[serde(deserialize_with = "lenient_update_hash")]
    pub update_hash: bool,
    #[serde(deserialize_with = "lenient_strings")]
    pub strings: TocStrings,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            heading_selector: DEFAULT_HEADING_SELECTOR.to_string(),
            scroll_offset: DEFAULT_SCROLL_OFFSET,
            min_headings: DEFAULT_MIN_HEADINGS,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            observer_limit: DEFAULT_OBSERVER_LIMIT,
            update_hash: true,
            strings: TocStrings::default(),
        }
    }
}

impl TocConfig {
    pub fn from_json(json: &str) -> TocResult<Self> {
        serde_json::from_str(json).map_err(TocError::config)
    }

    /// Read `window.tocSettings`, falling back to defaults when it is absent or malformed.
    pub fn from_window() -> Self {
        match Self::try_from_window() {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                leptos::logging::warn!("toc: {e}; using defaults");
                Self::default()
            }
        }
    }

    fn try_from_window() -> TocResult<Option<Self>> {
        let Some(window) = web_sys::window() else {
            return Ok(None);
        };
        let Some(settings) = window.get(SETTINGS_GLOBAL) else {
            return Ok(None);
        };
        if settings.is_undefined() || settings.is_null() || !settings.is_object() {
            return Ok(None);
        }
        let json = js_sys::JSON::stringify(&settings)
            .map_err(|e| TocError::dom("stringify settings", e))?
            .as_string()
            .unwrap_or_default();
        Self::from_json(&json).map(Some)
    }
}

fn lenient<'de, D, T>(deserializer: D, parse: impl FnOnce(&Value) -> Option<T>, fallback: T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse(&value).unwrap_or(fallback))
}

fn non_empty_string(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_like(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn lenient_selector_content<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    lenient(d, non_empty_string, DEFAULT_CONTENT_SELECTOR.to_string())
}

fn lenient_selector_heading<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    lenient(d, non_empty_string, DEFAULT_HEADING_SELECTOR.to_string())
}

fn lenient_prefix<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    // An empty prefix is a valid choice.
    lenient(d, |v| v.as_str().map(str::to_string), DEFAULT_ID_PREFIX.to_string())
}

fn lenient_offset<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    lenient(d, number_like, DEFAULT_SCROLL_OFFSET)
}

fn lenient_min_headings<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    lenient(
        d,
        |v| number_like(v).map(|n| n.max(0.0).min(u32::MAX as f64) as u32),
        DEFAULT_MIN_HEADINGS,
    )
}

fn lenient_observer_limit<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    lenient(
        d,
        |v| number_like(v).filter(|n| *n >= 0.0).map(|n| n as usize),
        DEFAULT_OBSERVER_LIMIT,
    )
}

fn lenient_update_hash<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    lenient(d, Value::as_bool, true)
}

fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<TocStrings, D::Error> {
    lenient(
        d,
        |v| serde_json::from_value::<TocStrings>(v.clone()).ok(),
        TocStrings::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let config = TocConfig::from_json("{}").expect("empty settings should parse");
        assert_eq!(config, TocConfig::default());
        assert_eq!(config.heading_selector, "h2");
        assert_eq!(config.scroll_offset, 80.0);
        assert_eq!(config.min_headings, 1);
    }

    #[test]
    fn test_partial_settings_keep_other_defaults() {
        let config = TocConfig::from_json(r#"{"headingSelector": "h2, h3", "minHeadings": 3}"#)
            .expect("partial settings should parse");
        assert_eq!(config.heading_selector, "h2, h3");
        assert_eq!(config.min_headings, 3);
        assert_eq!(config.content_selector, DEFAULT_CONTENT_SELECTOR);
        assert_eq!(config.scroll_offset, DEFAULT_SCROLL_OFFSET);
    }

    #[test]
    fn test_non_numeric_offset_falls_back_to_80() {
        let config = TocConfig::from_json(r#"{"scrollOffset": "abc"}"#).expect("should parse");
        assert_eq!(config.scroll_offset, 80.0);

        let config = TocConfig::from_json(r#"{"scrollOffset": null}"#).expect("should parse");
        assert_eq!(config.scroll_offset, 80.0);

        let config = TocConfig::from_json(r#"{"scrollOffset": {"px": 4}}"#).expect("should parse");
        assert_eq!(config.scroll_offset, 80.0);
    }

    #[test]
    fn test_numeric_string_offset_is_accepted() {
        let config = TocConfig::from_json(r#"{"scrollOffset": "120"}"#).expect("should parse");
        assert_eq!(config.scroll_offset, 120.0);

        let config = TocConfig::from_json(r#"{"scrollOffset": 64}"#).expect("should parse");
        assert_eq!(config.scroll_offset, 64.0);
    }

    #[test]
    fn test_negative_min_headings_clamps_to_zero() {
        let config = TocConfig::from_json(r#"{"minHeadings": -4}"#).expect("should parse");
        assert_eq!(config.min_headings, 0);

        let config = TocConfig::from_json(r#"{"minHeadings": "lots"}"#).expect("should parse");
        assert_eq!(config.min_headings, DEFAULT_MIN_HEADINGS);
    }

    #[test]
    fn test_blank_selector_falls_back() {
        let config = TocConfig::from_json(r#"{"contentSelector": "  ", "headingSelector": 7}"#)
            .expect("should parse");
        assert_eq!(config.content_selector, DEFAULT_CONTENT_SELECTOR);
        assert_eq!(config.heading_selector, DEFAULT_HEADING_SELECTOR);
    }

    #[test]
    fn test_partial_strings() {
        let config = TocConfig::from_json(r#"{"strings": {"goToSection": "Gå til %s"}}"#)
            .expect("should parse");
        assert_eq!(config.strings.go_to_section, "Gå til %s");
        assert_eq!(config.strings.title, TocStrings::default().title);

        let config = TocConfig::from_json(r#"{"strings": "nope"}"#).expect("should parse");
        assert_eq!(config.strings, TocStrings::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = TocConfig::from_json("{not json").expect_err("should fail");
        assert_eq!(err.kind, crate::error::TocErrorKind::Config);
    }

    #[test]
    fn test_section_label_placeholder() {
        let mut strings = TocStrings::default();
        assert_eq!(strings.section_label("Intro"), "Go to section: Intro");

        strings.go_to_section = "Jump to %s".to_string();
        assert_eq!(strings.section_label("Intro"), "Jump to Intro");

        strings.go_to_section = "   ".to_string();
        assert_eq!(strings.section_label("Intro"), "Intro");
    }
}
