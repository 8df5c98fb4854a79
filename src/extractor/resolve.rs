use url::Url;

/// Turn an extracted URL into an absolute one.
///
/// Values that already start with `http://` or `https://` are kept verbatim
/// as long as they parse. Anything else is joined onto `base`. Returns `None`
/// when the result is not a valid URL.
pub fn resolve_url(base: &Url, value: &str) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Url::parse(value).ok().map(|_| value.to_string());
    }

    base.join(value).ok().map(String::from)
}
