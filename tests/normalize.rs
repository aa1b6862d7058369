use guri::Uri;

#[track_caller]
fn norm(s: &str) -> String {
    let mut uri = Uri::parse_new(s).unwrap();
    uri.normalize();
    uri.compose()
}

#[test]
fn normalize() {
    // Example from Section 6.2 of RFC 3986.
    assert_eq!(
        norm("eXAMPLE://a/./b/../b/%63/%7bfoo%7d"),
        "example://a/b/c/%7Bfoo%7D"
    );

    // Lowercase percent-encoded octet.
    assert_eq!(norm("%3a"), "%3A");

    // Uppercase letters in scheme and registered name.
    assert_eq!(norm("HTTP://www.EXAMPLE.com/"), "http://www.example.com/");

    // Empty port.
    assert_eq!(norm("http://example.com:/"), "http://example.com/");

    // The port is kept even if it is the default one.
    assert_eq!(norm("http://example.com:80/"), "http://example.com:80/");

    // Underflow in path resolution.
    assert_eq!(norm("http://a/../../../g"), "http://a/g");

    // Percent-encoded dot segments.
    assert_eq!(norm("http://a/b/c/%2E/%2E./%2e%2E/d"), "http://a/d");

    // Remove dot segments from a rootless path too.
    assert_eq!(norm("foo/../bar"), "bar");
    assert_eq!(norm("foo:bar/../baz"), "foo:baz");
    assert_eq!(norm("foo:./a/../b"), "foo:b");
    assert_eq!(norm("../a"), "a");
    assert_eq!(norm("./../."), "/");

    // A colon in the first segment of a relative reference stays in the path.
    assert_eq!(norm("./a:b"), "./a:b");
    assert_eq!(norm("x/../a:b"), "./a:b");
    assert_eq!(norm("foo:./a:b"), "foo:a:b");

    // Do remove dot segments from an absolute path.
    assert_eq!(norm("/foo/../bar"), "/bar");
    assert_eq!(norm("foo:/bar/./../baz"), "foo:/baz");

    // However, make sure that the output is a valid URI reference.
    assert_eq!(norm("foo:/.//@@"), "foo:/.//@@");
    assert_eq!(norm("foo:/a/..//b"), "foo:/.//b");

    // Percent-encoded uppercase letters in registered name.
    assert_eq!(norm("HTTP://%45XAMPLE.%43Om"), "http://example.com/");

    // Percent-encoded unreserved characters.
    assert_eq!(
        norm("%41%42%43%44%45%46%47%48%49%4A%4B%4C%4D%4E%4F%50%51%52%53%54%55%56%57%58%59%5A%61%62%63%64%65%66%67%68%69%6A%6B%6C%6D%6E%6F%70%71%72%73%74%75%76%77%78%79%7A%30%31%32%33%34%35%36%37%38%39%2D%2E%5F%7E"),
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~"
    );

    // Percent-encoded reserved characters.
    let s = "%3A%2F%3F%23%5B%5D%40%21%24%26%27%28%29%2A%2B%2C%3B%3D%25";
    assert_eq!(norm(s), s);

    // Already normalized.
    let s = "foo://user@example.com:8042/over/there?name=ferret#nose";
    assert_eq!(norm(s), s);

    // Normalization in all components.
    assert_eq!(
        norm("FOO://%55se%72@EXamp%4ce%2ecom:8042/%4b%2f?%4c%2b#%24%4d"),
        "foo://User@example.com:8042/K%2F?L%2B#%24M"
    );

    // IP literals.
    assert_eq!(norm("//127.0.0.1"), "//127.0.0.1/");
    assert_eq!(norm("http://[2001:DB8::A]/"), "http://[2001:db8::a]/");
    assert_eq!(norm("http://[V1.FE:80]/"), "http://[v1.fe:80]/");

    // An empty path becomes "/".
    assert_eq!(norm(""), "/");
    assert_eq!(norm("?Q=%7e"), "/?Q=~");
    assert_eq!(norm("#%7E"), "/#~");
}

#[test]
fn case_insensitivity() {
    let mut uri = Uri::parse_new("eXAMPLE://ExAmPlE.CoM/").unwrap();
    uri.normalize();
    assert_eq!(uri.host().unwrap(), "example.com");
    assert_eq!(uri.scheme().unwrap().as_str(), "example");
    assert_eq!(uri.path().unwrap(), "/");

    // Only scheme and host are lowercased.
    assert_eq!(norm("http://User@h/Path?Q#F"), "http://User@h/Path?Q#F");
}

#[test]
fn percent_decoding_selectivity() {
    assert_eq!(norm("http://h/%63"), "http://h/c");
    assert_eq!(norm("http://h/%7b"), "http://h/%7B");
    assert_eq!(norm("http://h/%7B"), "http://h/%7B");
    assert_eq!(norm("http://h/%25"), "http://h/%25");
    assert_eq!(norm("http://h/%0b"), "http://h/%0B");
    assert_eq!(norm("http://h/%e5%bc%a0"), "http://h/%E5%BC%A0");
}

#[test]
fn stray_percent() {
    assert_eq!(norm("http://h/100%"), "http://h/100%");
    assert_eq!(norm("http://h/?a=%%41"), "http://h/?a=%%41");
    assert_eq!(norm("http://h/?a=%%7e%7e"), "http://h/?a=%~~");
    assert_eq!(norm("http://h/%zz%2e"), "http://h/%zz.");
}

#[test]
fn path_collapse() {
    for (s, path) in [
        ("x://a", "/"),
        ("x://a/", "/"),
        ("x://a//////", "/"),
        ("x://a/./b/../b/c", "/b/c"),
        ("x://a/.", "/"),
        ("x://a/..", "/"),
        ("x://a/b/..", "/"),
        ("x://a/b//", "/b//"),
        ("x:/", "/"),
        ("x:///", "/"),
        ("x:", "/"),
        ("x:a", "a"),
        ("x:a/..", "/"),
        ("x:./", "/"),
        ("x:a/./b/", "a/b/"),
    ] {
        let mut uri = Uri::parse_new(s).unwrap();
        uri.normalize();
        assert_eq!(uri.path().unwrap(), path, "{s}");
    }
}

#[test]
fn idempotence() {
    for s in [
        "eXAMPLE://a/./b/../b/%63/%7bfoo%7d",
        "foo:/a/..//b",
        "http://h/?a=%%41%%3441",
        "HTTP://%45XAMPLE.%43Om",
        "x://a//////",
        "mailto:A%40b",
        "../%2e%2E/a",
        "http://[::1]:8080/%7Euser/./x?y#z",
        "x/../a:b",
        "a/..//b",
        "#f",
    ] {
        let mut uri = Uri::parse_new(s).unwrap();
        uri.normalize();
        let once = uri.clone();
        uri.normalize();
        assert_eq!(uri, once, "{s}");
    }
}

#[test]
fn normalize_built() {
    // Stores built with setters are normalized on a best-effort basis.
    let mut uri = Uri::new();
    uri.set_scheme("HTTP")
        .set_host("EXAMPLE.com")
        .set_path("a/./b/%7e")
        .set_query("?%7a");
    uri.normalize();
    assert_eq!(uri.compose(), "http://example.coma/b/~?z");

    let mut uri = Uri::new();
    uri.normalize();
    assert_eq!(uri, Uri::new());
}
