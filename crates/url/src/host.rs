//! Hostname and port handling for the authority part of a URL

use crate::{
    punycode,
    set::HOSTNAME_LABEL,
    util::utf16_len,
    Url,
};

/// Hostnames longer than this (in UTF-16 code units) are dropped
pub const HOSTNAME_MAX_LEN: usize = 255;

/// Labels longer than this (in UTF-16 code units) are invalid
const LABEL_MAX_LEN: usize = 63;

/// Splits a trailing `:digits` port off `host`
///
/// A lone trailing `:` is removed without producing a port.
fn split_port(host: &str) -> (&str, Option<&str>) {
    let Some(colon) = host.rfind(':') else {
        return (host, None);
    };

    let port = &host[colon + 1..];
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return (host, None);
    }

    let port = (!port.is_empty()).then_some(port);
    (&host[..colon], port)
}

fn is_valid_label(label: &str) -> bool {
    // Non-ASCII characters are accepted here, they are punycode-encoded later
    utf16_len(label) <= LABEL_MAX_LEN
        && label
            .chars()
            .all(|c| !c.is_ascii() || HOSTNAME_LABEL.contains_char(c))
}

/// Splits an invalid label into its longest valid prefix and the rest
fn split_label(label: &str) -> Option<(&str, &str)> {
    let prefix_len = label
        .bytes()
        .take(LABEL_MAX_LEN)
        .take_while(|&b| HOSTNAME_LABEL.contains(b))
        .count();
    let (prefix, rest) = label.split_at(prefix_len);

    if rest.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
        return None;
    }

    Some((prefix, rest))
}

/// Cuts `hostname` at the first invalid label
///
/// Returns the valid part and, if anything was cut, the part that belongs to the path.
fn truncate_at_invalid_label(hostname: &str) -> Option<(String, Option<String>)> {
    let labels: Vec<&str> = hostname.split('.').collect();

    for (i, label) in labels.iter().enumerate() {
        if label.is_empty() || is_valid_label(label) {
            continue;
        }

        let mut valid = labels[..i].to_vec();
        let mut not_host = labels[i + 1..].to_vec();
        if let Some((prefix, rest)) = split_label(label) {
            valid.push(prefix);
            not_host.insert(0, rest);
        }

        let not_host = (!not_host.is_empty()).then(|| not_host.join("."));
        return Some((valid.join("."), not_host));
    }

    None
}

/// Fills in `host`, `hostname` and `port` of `url` from the raw `host` of the authority
///
/// Returns the remainder of the URL, which may have gained whatever could not be
/// part of the hostname.
pub(crate) fn parse_host(url: &mut Url, host: &str, rest: &str) -> String {
    let (hostname, port) = split_port(host);
    url.port = port.map(str::to_owned);

    let mut hostname = hostname.to_owned();
    let mut rest = rest.to_owned();
    let is_ipv6 = hostname.starts_with('[') && hostname.ends_with(']');

    if !is_ipv6 {
        if let Some((valid, not_host)) = truncate_at_invalid_label(&hostname) {
            if let Some(not_host) = not_host {
                rest = format!("/{not_host}{rest}");
            }
            hostname = valid;
        }
    }

    if utf16_len(&hostname) > HOSTNAME_MAX_LEN {
        log::debug!(
            "Dropping hostname of length {}, the maximum is {HOSTNAME_MAX_LEN}",
            utf16_len(&hostname)
        );
        hostname.clear();
    } else {
        hostname = hostname.to_lowercase();
    }

    if !is_ipv6 {
        hostname = punycode::to_ascii(&hostname);
    }

    url.host = Some(match &url.port {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.clone(),
    });

    if is_ipv6 {
        if let Some(unbracketed) = hostname
            .strip_prefix('[')
            .and_then(|hostname| hostname.strip_suffix(']'))
        {
            hostname = unbracketed.to_owned();
        }

        if !rest.starts_with('/') {
            rest.insert(0, '/');
        }
    }

    url.hostname = Some(hostname);
    rest
}
