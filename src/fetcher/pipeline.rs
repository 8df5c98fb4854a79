use crate::fetcher::types::{Charset, DecodedPage, RawPage};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*("[^"]*"|'[^']*'|[^"'\s;]+)"#).unwrap());

static META_CHARSET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[charset]").unwrap());

static META_HTTP_EQUIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[http-equiv][content]").unwrap());

/// Decode a raw response into its final document.
///
/// The body is first parsed as UTF-8 only to look for an in-document
/// encoding declaration. If the resolved encoding is anything other than
/// UTF-8 the original bytes are decoded again and the result re-parsed.
pub fn decode(raw: &RawPage) -> DecodedPage {
    let sniffed = sniff_pass(&raw.body_raw);
    let charset = resolve_charset(raw.content_type.as_deref(), &sniffed);
    let document = final_pass(&raw.body_raw, &charset, sniffed);

    DecodedPage {
        url_final: raw.url_final.clone(),
        document,
        charset,
    }
}

fn sniff_pass(body: &[u8]) -> Html {
    let (text, _) = encoding_rs::UTF_8.decode_with_bom_removal(body);
    Html::parse_document(&text)
}

fn final_pass(body: &[u8], charset: &Charset, sniffed: Html) -> Html {
    if charset.is_utf8() {
        debug!(charset = charset.label(), "reusing sniff pass document");
        return sniffed;
    }

    let (text, had_errors) = charset.encoding().decode_without_bom_handling(body);
    debug!(
        charset = charset.label(),
        encoding = charset.encoding().name(),
        had_errors,
        "re-parsing document at declared encoding"
    );
    Html::parse_document(&text)
}

/// Pick the document encoding.
///
/// Precedence: `charset=` on the Content-Type header, then
/// `<meta charset>`, then `<meta http-equiv="Content-Type">`, then UTF-8.
/// Labels that do not name a known encoding are skipped. In-document labels
/// follow the HTML prescan rules (see `Charset::from_document_label`).
pub fn resolve_charset(content_type: Option<&str>, sniffed: &Html) -> Charset {
    content_type
        .and_then(charset_param)
        .or_else(|| meta_charset(sniffed))
        .or_else(|| meta_http_equiv_charset(sniffed))
        .unwrap_or_else(Charset::utf8)
}

fn charset_param(value: &str) -> Option<Charset> {
    Charset::from_label(charset_param_label(value)?)
}

fn charset_param_label(value: &str) -> Option<&str> {
    let captures = CHARSET_REGEX.captures(value)?;
    Some(captures.get(1)?.as_str())
}

fn meta_charset(document: &Html) -> Option<Charset> {
    document
        .select(&META_CHARSET)
        .filter_map(|meta| meta.value().attr("charset"))
        .find_map(Charset::from_document_label)
}

fn meta_http_equiv_charset(document: &Html) -> Option<Charset> {
    document
        .select(&META_HTTP_EQUIV)
        .filter(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .filter_map(charset_param_label)
        .find_map(Charset::from_document_label)
}
