#![no_main]
use guri::Uri;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(mut r) = Uri::parse_new(data) else {
        return;
    };

    r.normalize();
    let r2 = Uri::parse_new(r.compose()).unwrap();

    assert_eq!(r.scheme().map(|s| s.as_str()), r2.scheme().map(|s| s.as_str()));
    assert_eq!(r.userinfo(), r2.userinfo());
    assert_eq!(r.host(), r2.host());
    assert_eq!(r.host_kind(), r2.host_kind());
    assert_eq!(r.port(), r2.port());
    assert_eq!(r.path(), r2.path());
    assert_eq!(r.query(), r2.query());
    assert_eq!(r.fragment(), r2.fragment());

    // We cannot normalize beyond a normalized `Uri`.
    let once = r.clone();
    r.normalize();
    assert_eq!(r, once);
});
