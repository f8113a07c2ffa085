//! Resolution of a URL against a base, the way a browser resolves the target of an anchor

use std::collections::VecDeque;

use crate::{
    url::{is_hostless_protocol, is_present, is_slashed_protocol},
    ParseOptions, Url, UrlRef,
};

/// How relative URL strings are parsed before they are resolved
pub(crate) const RELATIVE_OPTIONS: ParseOptions = ParseOptions {
    parse_query_string: false,
    slashes_denote_host: true,
};

fn split_path(pathname: &Option<String>) -> Vec<String> {
    match pathname.as_deref() {
        Some(pathname) if !pathname.is_empty() => {
            pathname.split('/').map(str::to_owned).collect()
        },
        _ => vec![],
    }
}

/// Prepends `host` to the path segments, replacing a leading empty segment
fn move_host_into_path(host: &str, segments: &mut Vec<String>) {
    match segments.first_mut() {
        Some(first) if first.is_empty() => *first = host.to_owned(),
        _ => segments.insert(0, host.to_owned()),
    }
}

/// Moves a `user@` prefix of the host into `auth`
fn split_auth_from_host(url: &mut Url) {
    let Some(host) = url.host.as_deref() else {
        return;
    };

    if host.find('@').map_or(true, |at| at == 0) {
        return;
    }

    let mut parts = host.split('@');
    let auth = parts.next().map(str::to_owned);
    let host = parts.next().map(str::to_owned);

    url.auth = auth;
    url.hostname = host.clone();
    url.host = host;
}

impl Url {
    /// Resolves `relative` against this URL and formats the result
    /// ```
    /// # use url::Url;
    /// let base: Url = "http://example.com/one/two".parse().unwrap();
    /// assert_eq!(base.resolve("../three"), "http://example.com/three");
    /// ```
    #[must_use]
    pub fn resolve(&self, relative: &str) -> String {
        self.resolve_object(relative).format()
    }

    /// Resolves `relative` against this URL
    ///
    /// Strings are parsed with slashes denoting a host, so `//other.com/x` replaces
    /// everything but the protocol.
    #[must_use]
    pub fn resolve_object<'a>(&self, relative: impl Into<UrlRef<'a>>) -> Self {
        let mut relative = relative.into().into_url(RELATIVE_OPTIONS);
        let mut result = self.clone();

        // The fragment always comes from the relative URL
        result.hash = relative.hash.clone();

        if relative.format().is_empty() {
            return result.with_href();
        }

        // Protocol-relative, take everything but the protocol
        if relative.slashes && !is_present(&relative.protocol) {
            let protocol = result.protocol.take();
            result = Self {
                protocol,
                ..relative
            };

            if result.protocol.as_deref().is_some_and(is_slashed_protocol)
                && is_present(&result.hostname)
                && !is_present(&result.pathname)
            {
                result.pathname = Some("/".to_owned());
                result.path = Some("/".to_owned());
            }

            return result.with_href();
        }

        if let Some(protocol) = relative
            .protocol
            .clone()
            .filter(|protocol| !protocol.is_empty() && Some(protocol) != result.protocol.as_ref())
        {
            return resolve_with_other_protocol(result, relative, &protocol);
        }

        let is_source_absolute = result
            .pathname
            .as_deref()
            .is_some_and(|pathname| pathname.starts_with('/'));
        let is_relative_absolute = is_present(&relative.host)
            || relative
                .pathname
                .as_deref()
                .is_some_and(|pathname| pathname.starts_with('/'));
        let mut must_end_absolute = is_relative_absolute
            || is_source_absolute
            || (is_present(&result.host) && is_present(&relative.pathname));
        let remove_all_dots = must_end_absolute;
        let mut source_path = split_path(&result.pathname);
        let mut relative_path = split_path(&relative.pathname);

        // Protocols without slashes keep the host as the first path segment
        let has_opaque_path = result
            .protocol
            .as_deref()
            .is_some_and(|protocol| !protocol.is_empty() && !is_slashed_protocol(protocol));

        if has_opaque_path {
            result.hostname = Some(String::new());
            result.port = None;
            if let Some(host) = result.host.as_deref().filter(|host| !host.is_empty()) {
                move_host_into_path(host, &mut source_path);
            }
            result.host = Some(String::new());

            if is_present(&relative.protocol) {
                relative.hostname = None;
                relative.port = None;
                if let Some(host) = relative.host.as_deref().filter(|host| !host.is_empty()) {
                    move_host_into_path(host, &mut relative_path);
                }
                relative.host = None;
            }

            let starts_empty = |segments: &[String]| segments.first().is_some_and(String::is_empty);
            must_end_absolute =
                must_end_absolute && (starts_empty(&relative_path) || starts_empty(&source_path));
        }

        if is_relative_absolute {
            if relative.host.is_some() {
                result.host = relative.host.clone();
            }
            if relative.hostname.is_some() {
                result.hostname = relative.hostname.clone();
            }
            result.search = relative.search.clone();
            result.query = relative.query.clone();
            source_path = relative_path;
        } else if !relative_path.is_empty() {
            // Replace the last segment of the base path
            source_path.pop();
            source_path.extend(relative_path);
            result.search = relative.search.clone();
            result.query = relative.query.clone();
        } else if relative.search.is_some() {
            // Only the query changes
            if has_opaque_path {
                let host = (!source_path.is_empty()).then(|| source_path.remove(0));
                result.hostname = host.clone();
                result.host = host;
                split_auth_from_host(&mut result);
            }

            result.search = relative.search.clone();
            result.query = relative.query.clone();
            if result.pathname.is_some() || result.search.is_some() {
                result.path = Some(format!(
                    "{}{}",
                    result.pathname.as_deref().unwrap_or_default(),
                    result.search.as_deref().unwrap_or_default()
                ));
            }

            return result.with_href();
        }

        let Some(last) = source_path.last() else {
            // No path at all, only a query may remain
            result.pathname = None;
            result.path = result
                .search
                .as_deref()
                .filter(|search| !search.is_empty())
                .map(|search| format!("/{search}"));
            return result.with_href();
        };

        let has_trailing_slash = ((is_present(&result.host)
            || is_present(&relative.host)
            || source_path.len() > 1)
            && (last == "." || last == ".."))
            || last.is_empty();

        let (segments, up) = remove_dot_segments(source_path);
        let mut segments = VecDeque::from(segments);

        if !must_end_absolute && !remove_all_dots {
            for _ in 0..up {
                segments.push_front("..".to_owned());
            }
        }

        let is_rooted = |segments: &VecDeque<String>| {
            segments
                .front()
                .is_some_and(|first| first.is_empty() || first.starts_with('/'))
        };

        if must_end_absolute && !is_rooted(&segments) {
            segments.push_front(String::new());
        }

        let ends_with_slash = match segments.back() {
            Some(last) if last.is_empty() => segments.len() > 1,
            Some(last) => last.ends_with('/'),
            None => false,
        };

        if has_trailing_slash && !ends_with_slash {
            segments.push_back(String::new());
        }

        let is_absolute = is_rooted(&segments);

        if has_opaque_path {
            let host = if is_absolute {
                String::new()
            } else {
                segments.pop_front().unwrap_or_default()
            };
            result.hostname = Some(host.clone());
            result.host = Some(host);
            split_auth_from_host(&mut result);
        }

        must_end_absolute = must_end_absolute || (is_present(&result.host) && !segments.is_empty());

        if must_end_absolute && !is_absolute {
            segments.push_front(String::new());
        }

        if segments.is_empty() {
            result.pathname = None;
            result.path = None;
        } else {
            result.pathname = Some(Vec::from(segments).join("/"));
        }

        if result.pathname.is_some() || result.search.is_some() {
            result.path = Some(format!(
                "{}{}",
                result.pathname.as_deref().unwrap_or_default(),
                result.search.as_deref().unwrap_or_default()
            ));
        }

        if is_present(&relative.auth) {
            result.auth = relative.auth;
        }
        result.slashes = result.slashes || relative.slashes;
        result.with_href()
    }
}

/// Resolution against a relative URL with a different protocol
fn resolve_with_other_protocol(mut result: Url, mut relative: Url, protocol: &str) -> Url {
    // Without slashes there is nothing in common with the base
    if !is_slashed_protocol(protocol) {
        return relative.with_href();
    }

    result.protocol = relative.protocol.clone();

    if !is_present(&relative.host) && !is_hostless_protocol(protocol) {
        // The first non-empty path segment becomes the host
        let pathname = relative.pathname.clone().unwrap_or_default();
        let mut segments: VecDeque<&str> = pathname.split('/').collect();

        let mut host = "";
        while let Some(segment) = segments.pop_front() {
            if !segment.is_empty() {
                host = segment;
                break;
            }
        }

        relative.host = Some(host.to_owned());
        if !is_present(&relative.hostname) {
            relative.hostname = Some(String::new());
        }
        if segments.front() != Some(&"") {
            segments.push_front("");
        }
        if segments.len() < 2 {
            segments.push_front("");
        }
        result.pathname = Some(Vec::from(segments).join("/"));
    } else {
        result.pathname = relative.pathname.clone();
    }

    result.search = relative.search;
    result.query = relative.query;
    result.host = Some(relative.host.clone().unwrap_or_default());
    result.auth = relative.auth;
    result.hostname = if is_present(&relative.hostname) {
        relative.hostname
    } else {
        relative.host
    };
    result.port = relative.port;
    result.update_path();
    result.slashes = result.slashes || relative.slashes;
    result.with_href()
}

/// Drops `.` segments and lets every `..` cancel the closest preceding segment
///
/// Returns the remaining segments and the number of `..` that had nothing to cancel.
fn remove_dot_segments(segments: Vec<String>) -> (Vec<String>, usize) {
    let mut up = 0;
    let mut kept = Vec::with_capacity(segments.len());

    for segment in segments.into_iter().rev() {
        if segment == "." {
            continue;
        }

        if segment == ".." {
            up += 1;
        } else if up > 0 {
            up -= 1;
        } else {
            kept.push(segment);
        }
    }

    kept.reverse();
    (kept, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(base: &str, relative: &str) -> String {
        crate::resolve(base, relative)
    }

    #[test]
    fn dot_segments() {
        let segments = ["", "a", "b", "..", ".", "c", "..", ".."]
            .map(str::to_owned)
            .to_vec();
        assert_eq!(remove_dot_segments(segments), (vec![String::new()], 0));

        let segments = ["..", "..", "a"].map(str::to_owned).to_vec();
        assert_eq!(remove_dot_segments(segments), (vec!["a".to_owned()], 2));
    }

    #[test]
    fn parent_directory() {
        assert_eq!(resolve("http://a.com/b/c", "../d"), "http://a.com/d");
        assert_eq!(resolve("/one/two/three", "four"), "/one/two/four");
        assert_eq!(resolve("http://example.com/", "/one"), "http://example.com/one");
        assert_eq!(resolve("http://example.com/one", "/two"), "http://example.com/two");
        assert_eq!(resolve("http://a.com/b/c/d", "../../"), "http://a.com/");
        assert_eq!(resolve("http://a.com/b/c/", "./"), "http://a.com/b/c/");
    }

    #[test]
    fn protocol_relative() {
        assert_eq!(resolve("http://a.com/b", "//x.com/y"), "http://x.com/y");
        assert_eq!(resolve("https://a.com/b", "//x.com"), "https://x.com/");
    }

    #[test]
    fn fragments_and_queries() {
        assert_eq!(resolve("http://a.com/b?x=1", "#frag"), "http://a.com/b?x=1#frag");
        assert_eq!(resolve("http://a.com/b?x=1#old", "?y=2"), "http://a.com/b?y=2");
        assert_eq!(resolve("http://a.com/b#old", ""), "http://a.com/b");
    }

    #[test]
    fn other_protocols() {
        assert_eq!(resolve("http://a.com/b", "https://c.com/d"), "https://c.com/d");
        assert_eq!(resolve("http://a.com/b", "mailto:x@y.com"), "mailto:x@y.com");
        assert_eq!(resolve("http://a.com/b", "ftp:host/path"), "ftp://host/path");
    }

    #[test]
    fn opaque_paths() {
        assert_eq!(resolve("mailto:a@b.com", "?subject=hi"), "mailto:a@b.com?subject=hi");
    }

    #[test]
    fn resolve_parsed_urls() {
        let base: Url = "http://a.com/b/c".parse().unwrap();
        let relative = Url::parse_with("d?e", RELATIVE_OPTIONS);

        let resolved = base.resolve_object(&relative);
        assert_eq!(resolved.pathname.as_deref(), Some("/b/d"));
        assert_eq!(resolved.search.as_deref(), Some("?e"));
        assert_eq!(resolved.path.as_deref(), Some("/b/d?e"));
        assert_eq!(resolved.href, "http://a.com/b/d?e");
    }
}
