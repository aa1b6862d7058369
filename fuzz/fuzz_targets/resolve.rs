#![no_main]
use guri::Uri;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (Ok(base), Ok(r)) = (Uri::parse_new(data.0), Uri::parse_new(data.1)) else {
        return;
    };
    if base.scheme().is_none() {
        return;
    }

    let mut u1 = Uri::new();
    base.transform(&r, &mut u1);
    let u2 = Uri::parse_new(u1.compose()).unwrap();

    assert_eq!(u1.scheme().map(|s| s.as_str()), u2.scheme().map(|s| s.as_str()));
    assert_eq!(u1.has_authority(), u2.has_authority());
    assert_eq!(u1.host(), u2.host());
    assert_eq!(u1.port(), u2.port());
    assert_eq!(u1.path(), u2.path());
    assert_eq!(u1.query(), u2.query());
    assert_eq!(u1.fragment(), u2.fragment());

    // Normalizing the base first does not change the normalized result.
    let mut resolve_then_normalize = u1;
    resolve_then_normalize.normalize();

    let mut base = base;
    base.normalize();
    let mut normalize_then_resolve = Uri::new();
    base.transform(&r, &mut normalize_then_resolve);
    normalize_then_resolve.normalize();
    assert_eq!(resolve_then_normalize, normalize_then_resolve);
});
