//! Redirect resolution
//!
//! Location values are resolved against the URL that produced them using the
//! standard relative-reference rules, so `/next`, `next`, `//host/x` and
//! absolute targets all yield an absolute URL.

use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a `Location` header value against the requesting URL
///
/// # Arguments
///
/// * `base` - The URL that was requested
/// * `location` - Raw `Location` header value (absolute or relative)
///
/// # Returns
///
/// * `Ok(Url)` - The absolute redirect target
/// * `Err(UrlError)` - The value cannot be composed into a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_probe::url::resolve_redirect;
///
/// let base = Url::parse("http://a.test/page?x=1").unwrap();
/// let next = resolve_redirect(&base, "/next").unwrap();
/// assert_eq!(next.as_str(), "http://a.test/next");
/// ```
pub fn resolve_redirect(base: &Url, location: &str) -> UrlResult<Url> {
    base.join(location.trim())
        .map_err(|e| UrlError::Parse(format!("invalid Location '{}': {}", location, e)))
}

/// Returns true if `to` is the same resource as `from` reached over a different scheme
///
/// Hostname, path and query must all be identical and only the scheme may
/// differ. Ports are not compared since a scheme change usually implies one.
pub fn is_scheme_upgrade(from: &Url, to: &Url) -> bool {
    from.scheme() != to.scheme()
        && from.host_str() == to.host_str()
        && from.path() == to.path()
        && from.query() == to.query()
}

/// Decides whether a redirect target is submitted as a new task
pub fn should_follow(follow_redirects: bool, from: &Url, to: &Url) -> bool {
    follow_redirects || is_scheme_upgrade(from, to)
}
