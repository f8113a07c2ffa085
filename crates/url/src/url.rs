use std::{convert::Infallible, fmt, str::FromStr};

use serde::Serialize;

use crate::{
    parser,
    percent_encode::encode_uri_component,
    querystring::{self, QueryMap},
};

/// Protocols whose URLs always use `//` before the host
pub(crate) fn is_slashed_protocol(protocol: &str) -> bool {
    matches!(
        protocol.strip_suffix(':').unwrap_or(protocol),
        "http" | "https" | "ftp" | "gopher" | "file"
    )
}

/// Protocols that never have a host
pub(crate) fn is_hostless_protocol(protocol: &str) -> bool {
    protocol.strip_suffix(':').unwrap_or(protocol) == "javascript"
}

/// Protocols whose remainder is left exactly as it was written
pub(crate) fn is_unsafe_protocol(protocol: &str) -> bool {
    is_hostless_protocol(protocol)
}

/// `Some` and not empty
#[inline]
pub(crate) fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

/// The query of a [Url], either as written or parsed into key/value pairs
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Query {
    Raw(String),
    Parsed(QueryMap),
}

impl Query {
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(raw) => Some(raw),
            Self::Parsed(_) => None,
        }
    }

    #[must_use]
    pub fn as_parsed(&self) -> Option<&QueryMap> {
        match self {
            Self::Raw(_) => None,
            Self::Parsed(map) => Some(map),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse the query into a [QueryMap] instead of keeping the raw string
    pub parse_query_string: bool,

    /// Treat `//foo/bar` as host `foo` and path `/bar` even without a protocol
    pub slashes_denote_host: bool,
}

/// Either a URL string or an already parsed [Url]
#[derive(Clone, Copy, Debug)]
pub enum UrlRef<'a> {
    Href(&'a str),
    Parsed(&'a Url),
}

impl UrlRef<'_> {
    pub(crate) fn into_url(self, options: ParseOptions) -> Url {
        match self {
            Self::Href(href) => Url::parse_with(href, options),
            Self::Parsed(url) => url.clone(),
        }
    }
}

impl<'a> From<&'a str> for UrlRef<'a> {
    fn from(value: &'a str) -> Self {
        Self::Href(value)
    }
}

impl<'a> From<&'a String> for UrlRef<'a> {
    fn from(value: &'a String) -> Self {
        Self::Href(value)
    }
}

impl<'a> From<&'a Url> for UrlRef<'a> {
    fn from(value: &'a Url) -> Self {
        Self::Parsed(value)
    }
}

/// A parsed URL
///
/// Every component except `slashes` and `href` distinguishes between being absent
/// ([None]) and being present but empty.
/// ```
/// # use url::Url;
/// let url: Url = "https://user:pw@Example.com:8080/p/a/t/h?query=string#hash".parse().unwrap();
///
/// assert_eq!(url.protocol.as_deref(), Some("https:"));
/// assert_eq!(url.auth.as_deref(), Some("user:pw"));
/// assert_eq!(url.host.as_deref(), Some("example.com:8080"));
/// assert_eq!(url.path.as_deref(), Some("/p/a/t/h?query=string"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Url {
    /// The lowercased protocol including the trailing `:`
    pub protocol: Option<String>,

    /// Whether the protocol is followed by `//`
    pub slashes: bool,

    /// `user:password`, percent-decoded
    pub auth: Option<String>,

    /// Lowercased hostname plus `:port`
    pub host: Option<String>,
    pub port: Option<String>,

    /// Lowercased, without brackets for IPv6 addresses
    pub hostname: Option<String>,

    /// Fragment including the leading `#`
    pub hash: Option<String>,

    /// Query including the leading `?`
    pub search: Option<String>,

    /// Query without the leading `?`
    pub query: Option<Query>,
    pub pathname: Option<String>,

    /// `pathname` followed by `search`
    pub path: Option<String>,

    /// The whole URL, as produced by [format](Url::format)
    pub href: String,
}

impl Url {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parse_with(input: &str, options: ParseOptions) -> Self {
        parser::parse(input, options)
    }

    /// Parses `input` into this URL, replacing all of its components
    pub fn parse(
        &mut self,
        input: &str,
        parse_query_string: bool,
        slashes_denote_host: bool,
    ) -> &mut Self {
        let options = ParseOptions {
            parse_query_string,
            slashes_denote_host,
        };

        *self = Self::parse_with(input, options);
        self
    }

    /// Recomputes `href` from the other components
    #[must_use]
    pub(crate) fn with_href(mut self) -> Self {
        self.href = self.format();
        self
    }

    /// Sets `path` to `pathname` followed by `search` if either of them is non-empty
    pub(crate) fn update_path(&mut self) {
        if is_present(&self.pathname) || is_present(&self.search) {
            self.path = Some(format!(
                "{}{}",
                self.pathname.as_deref().unwrap_or_default(),
                self.search.as_deref().unwrap_or_default()
            ));
        }
    }

    /// Builds the URL string from the individual components
    ///
    /// `host` takes precedence over `hostname` and `port`, `search` over `query`.
    #[must_use]
    pub fn format(&self) -> String {
        let auth = match self.auth.as_deref() {
            Some(auth) if !auth.is_empty() => {
                let mut auth = encode_uri_component(auth).replacen("%3A", ":", 1);
                auth.push('@');
                auth
            },
            _ => String::new(),
        };

        let host = if let Some(host) = self.host.as_deref().filter(|host| !host.is_empty()) {
            Some(format!("{auth}{host}"))
        } else if let Some(hostname) = self.hostname.as_deref().filter(|h| !h.is_empty()) {
            let mut host = if hostname.contains(':') {
                format!("{auth}[{hostname}]")
            } else {
                format!("{auth}{hostname}")
            };

            if let Some(port) = self.port.as_deref().filter(|port| !port.is_empty()) {
                host.push(':');
                host.push_str(port);
            }
            Some(host)
        } else {
            None
        };

        let mut protocol = self.protocol.clone().unwrap_or_default();
        if !protocol.is_empty() && !protocol.ends_with(':') {
            protocol.push(':');
        }

        let mut pathname = self.pathname.clone().unwrap_or_default();
        let needs_slashes =
            self.slashes || ((protocol.is_empty() || is_slashed_protocol(&protocol)) && host.is_some());
        let host = if needs_slashes {
            if !pathname.is_empty() && !pathname.starts_with('/') {
                pathname.insert(0, '/');
            }
            format!("//{}", host.unwrap_or_default())
        } else {
            host.unwrap_or_default()
        };

        let mut search = match self.search.as_deref().filter(|search| !search.is_empty()) {
            Some(search) => search.to_owned(),
            None => match &self.query {
                Some(Query::Parsed(query)) => {
                    let query = querystring::stringify(query);
                    if query.is_empty() {
                        query
                    } else {
                        format!("?{query}")
                    }
                },
                _ => String::new(),
            },
        };
        if !search.is_empty() && !search.starts_with('?') {
            search.insert(0, '?');
        }

        let mut hash = self.hash.clone().unwrap_or_default();
        if !hash.is_empty() && !hash.starts_with('#') {
            hash.insert(0, '#');
        }

        let pathname = pathname.replace('?', "%3F").replace('#', "%23");
        let search = search.replacen('#', "%23", 1);

        format!("{protocol}{host}{pathname}{search}{hash}")
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format().fmt(f)
    }
}

impl FromStr for Url {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_with(s, ParseOptions::default()))
    }
}
