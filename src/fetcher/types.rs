use bytes::Bytes;
use encoding_rs::Encoding;
use reqwest::StatusCode;
use scraper::Html;
use url::Url;

/// A character encoding as declared by the page or its server.
///
/// `label` is the declaration after case folding and quote stripping
/// (e.g. `shift_jis`), which is what gets reported back to callers.
/// `encoding` is what that label maps to for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    label: String,
    encoding: &'static Encoding,
}

impl Charset {
    /// Normalize a declared label and look it up. Returns `None` for empty
    /// or unrecognized labels.
    pub fn from_label(raw: &str) -> Option<Self> {
        let label = normalize_label(raw);
        if label.is_empty() {
            return None;
        }
        let encoding = Encoding::for_label(label.as_bytes())?;
        Some(Self { label, encoding })
    }

    /// Like `from_label`, for a label declared inside the document itself.
    ///
    /// A document readable enough to find the declaration is not UTF-16, so
    /// UTF-16 labels mean UTF-8. Labels mapping to the replacement encoding
    /// are treated as unrecognized.
    pub fn from_document_label(raw: &str) -> Option<Self> {
        let label = normalize_label(raw);
        if label.is_empty() {
            return None;
        }
        let encoding = Encoding::for_label_no_replacement(label.as_bytes())?;
        if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
            return Some(Self::utf8());
        }
        Some(Self { label, encoding })
    }

    pub fn utf8() -> Self {
        Self {
            label: "utf-8".to_string(),
            encoding: encoding_rs::UTF_8,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// True for any label that maps to UTF-8 (`utf-8`, `utf8`, `unicode-1-1-utf-8`, ...).
    pub fn is_utf8(&self) -> bool {
        self.encoding == encoding_rs::UTF_8
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_ascii_lowercase()
}

/// Undecoded response of a retrieval that came back with a status below 400.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url_final: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body_raw: Bytes,
}

/// Parsed document at its final encoding.
#[derive(Debug)]
pub struct DecodedPage {
    pub url_final: Url,
    pub document: Html,
    pub charset: Charset,
}
