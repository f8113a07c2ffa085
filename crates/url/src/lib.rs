//! Parsing, formatting and resolution of URLs the way legacy web servers see them.
//!
//! Parsing never fails. Malformed input still produces a [Url], with whatever could not
//! be recognized ending up in the path.
//!
//! ```
//! let url = url::parse("http://user@Example.com:8080/a/b?x=1#top", true, false);
//!
//! assert_eq!(url.hostname.as_deref(), Some("example.com"));
//! assert_eq!(url.port.as_deref(), Some("8080"));
//! assert_eq!(url.pathname.as_deref(), Some("/a/b"));
//!
//! assert_eq!(url::resolve("http://example.com/a/b", "../c"), "http://example.com/c");
//! ```

mod host;
mod parser;
mod percent_encode;
pub mod punycode;
pub mod querystring;
mod resolve;
mod set;
mod url;
mod util;

pub use crate::url::{ParseOptions, Query, Url, UrlRef};
pub use host::HOSTNAME_MAX_LEN;
pub use percent_encode::{encode_uri_component, percent_decode, percent_encode};
pub use querystring::{QueryMap, QueryValue};
pub use set::AsciiSet;

/// Parses `input` into a [Url]
///
/// With `parse_query_string`, [Url::query] holds the decoded key/value pairs.
/// With `slashes_denote_host`, `//foo/bar` is read as host `foo` and path `/bar`.
#[must_use]
pub fn parse(input: &str, parse_query_string: bool, slashes_denote_host: bool) -> Url {
    Url::parse_with(
        input,
        ParseOptions {
            parse_query_string,
            slashes_denote_host,
        },
    )
}

/// Formats a URL, parsing it first if it is a string
#[must_use]
pub fn format<'a>(url: impl Into<UrlRef<'a>>) -> String {
    url.into().into_url(ParseOptions::default()).format()
}

/// Resolves `relative` against `source`
#[must_use]
pub fn resolve(source: &str, relative: &str) -> String {
    parse(source, false, true).resolve(relative)
}

/// Resolves `relative` against `source`, keeping the result as a [Url]
///
/// An empty `source` yields `relative` itself.
#[must_use]
pub fn resolve_object<'a>(source: &str, relative: impl Into<UrlRef<'a>>) -> Url {
    if source.is_empty() {
        return relative.into().into_url(resolve::RELATIVE_OPTIONS);
    }

    parse(source, false, true).resolve_object(relative)
}
