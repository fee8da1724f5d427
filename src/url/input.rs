use crate::{UrlError, UrlResult};
use url::Url;

/// Parses one line of input into a probe URL
///
/// Surrounding whitespace is trimmed. Only absolute `http` and `https` URLs
/// with a host are accepted; anything else is malformed input and is skipped
/// by the task source.
///
/// # Examples
///
/// ```
/// use sumi_probe::url::parse_input_url;
///
/// let url = parse_input_url("  http://Example.com/a b ").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a%20b");
///
/// assert!(parse_input_url("not a url").is_err());
/// ```
pub fn parse_input_url(line: &str) -> UrlResult<Url> {
    let url = Url::parse(line.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
