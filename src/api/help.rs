const DEFAULT_HOST: &str = "localhost:8080";

/// Plain-text usage page served for malformed requests.
pub fn usage(host: Option<&str>) -> String {
    let host = host.filter(|h| !h.trim().is_empty()).unwrap_or(DEFAULT_HOST);
    let base = format!("http://{}", host);

    format!(
        "\
unfurl: fetch a web page and return its preview metadata as JSON.

Usage:
  GET {base}/?q=<url>
      Preview the page at <url> (absolute http or https URL, URL-encoded).
      Returns {{\"title\", \"description\", \"url\", \"image\", \"charset\"}},
      or {{\"error\"}} when the page answered with an error status.

  GET {base}/avatar?u=<username>
      Fetch the profile picture of <username> and return the image bytes.

  GET {base}/healthz
      Liveness probe.

  GET {base}/docs
      OpenAPI documentation.

Example:
  curl '{base}/?q=https%3A%2F%2Fwww.rust-lang.org%2F'
"
    )
}
