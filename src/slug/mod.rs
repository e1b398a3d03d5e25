use std::collections::{HashMap, HashSet};

/// Letters folded to ASCII before stripping, applied after lowercasing.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('æ', "ae"),
    ('ø', "oe"),
    ('å', "aa"),
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('ß', "ss"),
];

/// Turn heading text into a URL-fragment-safe base slug (no uniqueness).
///
/// Lowercases, folds the transliteration table, drops everything outside
/// `[a-z0-9_]`, whitespace and `-`, turns each whitespace run into one `-`,
/// and trims hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.to_lowercase().chars() {
        match TRANSLITERATIONS.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => folded.push_str(to),
            None => folded.push(ch),
        }
    }

    let kept: String = folded
        .chars()
        .filter(|&ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch.is_whitespace())
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

/// Duplicate-aware slug generator scoped to one generation run.
///
/// The first occurrence of a base slug is returned as-is; later ones get
/// `-2`, `-3`, ... counted per base. A candidate that was already issued
/// (or reserved) advances the counter again, so no two calls return the
/// same identifier.
#[derive(Clone, Debug, Default)]
pub struct SlugCounter {
    counts: HashMap<String, u32>,
    issued: HashSet<String>,
}

impl SlugCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an identifier as taken without counting it.
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.issued.insert(id.into());
    }

    pub fn generate(&mut self, text: &str) -> String {
        self.generate_with(text, |slug| slug.to_string())
    }

    /// Like [`SlugCounter::generate`], with `decorate` applied to each candidate
    /// before the uniqueness check (used for identifier prefixes).
    pub fn generate_with(&mut self, text: &str, decorate: impl Fn(&str) -> String) -> String {
        let base = slugify(text);
        let count = self.counts.entry(base.clone()).or_insert(0);
        loop {
            *count += 1;
            let slug = if *count > 1 {
                format!("{base}-{count}")
            } else {
                base.clone()
            };
            let candidate = decorate(&slug);
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
