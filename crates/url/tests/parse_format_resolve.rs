use url::{Query, QueryValue, Url};

#[test]
fn module_functions_match_methods() {
    let input = "http://example.com/a/b?c=d";

    let mut url = Url::new();
    url.parse(input, true, false);

    assert_eq!(url, url::parse(input, true, false));
    assert_eq!(url::format(&url), url.format());
    assert_eq!(url::format(input), input);
    assert_eq!(url::resolve(input, "e"), url.resolve("e"));
    assert_eq!(url::resolve_object(input, "e").href, "http://example.com/a/e");
}

#[test]
fn parse_replaces_previous_components() {
    let mut url = Url::new();
    url.parse("http://a.com/x#y", false, false);
    url.parse("/z", false, false);

    assert!(url.host.is_none());
    assert!(url.hash.is_none());
    assert_eq!(url.href, "/z");
}

#[test]
fn format_record() {
    let url = Url {
        protocol: Some("https".into()),
        hostname: Some("example.com".into()),
        pathname: Some("/a b".into()),
        query: Some(Query::Parsed(
            [("q".to_owned(), QueryValue::from("x y"))].into_iter().collect(),
        )),
        ..Default::default()
    };

    assert_eq!(url::format(&url), "https://example.com/a b?q=x%20y");
}

#[test]
fn resolve_object_keeps_components() {
    let resolved = url::resolve_object("http://user@a.com:81/b/c?d#e", "f?g");

    assert_eq!(resolved.protocol.as_deref(), Some("http:"));
    assert_eq!(resolved.auth.as_deref(), Some("user"));
    assert_eq!(resolved.host.as_deref(), Some("a.com:81"));
    assert_eq!(resolved.port.as_deref(), Some("81"));
    assert_eq!(resolved.pathname.as_deref(), Some("/b/f"));
    assert_eq!(resolved.search.as_deref(), Some("?g"));
    assert!(resolved.hash.is_none());
    assert_eq!(resolved.href, "http://user@a.com:81/b/f?g");
}

#[test]
fn resolve_object_without_source() {
    let resolved = url::resolve_object("", "//a.com/b");

    assert_eq!(resolved.host.as_deref(), Some("a.com"));
    assert_eq!(resolved.pathname.as_deref(), Some("/b"));
}

#[test]
fn display_matches_format() {
    let url: Url = "HTTP://Example.COM".parse().unwrap();

    assert_eq!(url.to_string(), "http://example.com/");
}

#[test]
fn querystring_module() {
    let query = url::querystring::parse("a=1&a=2&b=%E2%9C%93");

    assert_eq!(
        query["a"],
        QueryValue::Multiple(vec!["1".to_owned(), "2".to_owned()])
    );
    assert_eq!(query["b"].first(), Some("✓"));
    assert_eq!(url::querystring::stringify(&query), "a=1&a=2&b=%E2%9C%93");
}
