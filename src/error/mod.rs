use wasm_bindgen::JsValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TocErrorKind {
    /// A content root, list container, or link destination is absent.
    MissingTarget,
    /// The browser lacks a primitive (smooth scroll, intersection tracking).
    Capability,
    /// Settings could not be read or parsed.
    Config,
    /// A browser call threw.
    Dom,
}

#[derive(Clone, Debug)]
pub struct TocError {
    pub kind: TocErrorKind,
    pub message: String,
}

impl std::fmt::Display for TocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TocError {}

impl TocError {
    pub(crate) fn missing_target(what: impl std::fmt::Display) -> Self {
        Self {
            kind: TocErrorKind::MissingTarget,
            message: format!("missing target: {what}"),
        }
    }

    pub(crate) fn capability(what: &str) -> Self {
        Self {
            kind: TocErrorKind::Capability,
            message: format!("unsupported: {what}"),
        }
    }

    pub(crate) fn config(e: impl std::fmt::Display) -> Self {
        Self {
            kind: TocErrorKind::Config,
            message: format!("invalid settings: {e}"),
        }
    }

    pub(crate) fn dom(ctx: &str, e: JsValue) -> Self {
        let detail = e
            .as_string()
            .or_else(|| {
                js_sys::JSON::stringify(&e)
                    .ok()
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_else(|| "unknown error".to_string());
        Self {
            kind: TocErrorKind::Dom,
            message: format!("{ctx}: {detail}"),
        }
    }
}

pub type TocResult<T> = Result<T, TocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_message() {
        let e = TocError::missing_target("#summary");
        assert_eq!(e.kind, TocErrorKind::MissingTarget);
        assert_eq!(e.to_string(), "missing target: #summary");
    }

    #[test]
    fn test_config_error_kind() {
        let e = TocError::config("expected object");
        assert_eq!(e.kind, TocErrorKind::Config);
        assert!(e.to_string().contains("expected object"));
    }

    #[test]
    fn test_capability_error_kind() {
        let e = TocError::capability("IntersectionObserver");
        assert_eq!(e.kind, TocErrorKind::Capability);
        assert_eq!(e.message, "unsupported: IntersectionObserver");
    }
}
