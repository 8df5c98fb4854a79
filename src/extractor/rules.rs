//! Ordered fallback chains for each preview field.
//!
//! A field is filled from the first rule, in order, that yields a non-empty
//! value the caller accepts. Within a rule, matching elements are tried in
//! document order and elements lacking the required attribute are skipped.

use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Where a rule takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Value of the named attribute.
    Attr(&'static str),
    /// Text content of the element.
    Text,
}

#[derive(Debug, Clone)]
pub struct Rule {
    css: &'static str,
    selector: Selector,
    source: Source,
}

impl Rule {
    fn new(css: &'static str, source: Source) -> Self {
        Self {
            css,
            selector: Selector::parse(css).unwrap(),
            source,
        }
    }

    fn attr(css: &'static str, attr: &'static str) -> Self {
        Self::new(css, Source::Attr(attr))
    }

    fn text(css: &'static str) -> Self {
        Self::new(css, Source::Text)
    }

    pub fn css(&self) -> &'static str {
        self.css
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Trimmed, non-empty candidate values in document order.
    pub fn candidates<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = String> + 'a {
        document
            .select(&self.selector)
            .filter_map(move |element| match self.source {
                Source::Attr(attr) => element.value().attr(attr).map(str::to_string),
                Source::Text => Some(element.text().collect::<String>()),
            })
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

pub static TITLE: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::attr(r#"meta[property="og:title"]"#, "content"),
        Rule::attr(r#"meta[property="twitter:title"]"#, "content"),
        Rule::text("title"),
    ]
});

pub static DESCRIPTION: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::attr(r#"meta[property="og:description"]"#, "content"),
        Rule::attr(r#"meta[property="twitter:description"]"#, "content"),
        Rule::attr(r#"meta[name="description"]"#, "content"),
    ]
});

pub static CANONICAL_URL: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::attr(r#"link[rel="canonical"]"#, "href"),
        Rule::attr(r#"meta[property="og:url"]"#, "content"),
    ]
});

pub static IMAGE: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::attr(r#"meta[property="og:image"]"#, "content"),
        Rule::attr(r#"meta[property="twitter:image"]"#, "content"),
    ]
});

/// Walk `rules` in order and return the first candidate `accept` maps to a value.
pub fn first_match<T>(
    document: &Html,
    rules: &[Rule],
    mut accept: impl FnMut(&str) -> Option<T>,
) -> Option<T> {
    rules
        .iter()
        .find_map(|rule| {
            rule.candidates(document)
                .find_map(|value| accept(value.as_str()))
        })
}

/// First candidate taken as-is.
pub fn first_value(document: &Html, rules: &[Rule]) -> Option<String> {
    first_match(document, rules, |value| Some(value.to_string()))
}
