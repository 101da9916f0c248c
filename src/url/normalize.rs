use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Href schemes that never lead to a crawlable document
const NON_CRAWLABLE_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a URL according to Docsift's normalization rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but http and https
/// 3. Lowercase the host (done by the parser)
/// 4. Normalize path:
///    - Remove dot segments and repeated slashes
///    - Remove trailing slash (the root path stays `/`)
/// 5. Remove fragment
/// 6. Remove tracking query parameters, sort the rest, drop an empty query
///
/// Normalizing an already-normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use docsift::url::normalize_url;
///
/// let url = normalize_url("https://DOCS.example.com/guide/#install").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Resolves an anchor href found on `page` into a normalized absolute URL
///
/// Root-relative hrefs resolve against the page origin, relative hrefs against
/// the page URL, and absolute hrefs are kept as they are.
///
/// # Examples
///
/// ```
/// use docsift::url::{normalize_url, resolve_href};
///
/// let page = normalize_url("https://docs.example.com/guide/install").unwrap();
/// assert_eq!(
///     resolve_href("/api/", &page).unwrap().as_str(),
///     "https://docs.example.com/api"
/// );
/// assert_eq!(
///     resolve_href("upgrade#notes", &page).unwrap().as_str(),
///     "https://docs.example.com/guide/upgrade"
/// );
/// assert!(resolve_href("mailto:help@example.com", &page).is_err());
/// ```
pub fn resolve_href(href: &str, page: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Parse("empty href".to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if let Some(scheme) = NON_CRAWLABLE_SCHEMES
        .iter()
        .find(|scheme| lowered.starts_with(*scheme))
    {
        return Err(UrlError::InvalidScheme(format!(
            "Non-crawlable link scheme: {}",
            scheme.trim_end_matches(':')
        )));
    }

    let absolute = page.join(href).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_url(absolute.as_str())
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
