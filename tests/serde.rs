#![cfg(feature = "serde")]

use guri::Uri;

#[test]
fn serialize() {
    let uri = Uri::parse_new("http://u@h:8/p?q#f").unwrap();
    assert_eq!(
        serde_json::to_string(&uri).unwrap(),
        r#""http://u@h:8/p?q#f""#
    );

    assert_eq!(serde_json::to_string(&Uri::new()).unwrap(), r#""""#);
}

#[test]
fn deserialize() {
    let uri: Uri = serde_json::from_str(r#""http://h/a?b""#).unwrap();
    assert_eq!(uri.host().unwrap(), "h");
    assert_eq!(uri.query().unwrap(), "?b");

    let uris: Vec<Uri> = serde_json::from_str(r#"["//a", "b", ""]"#).unwrap();
    assert_eq!(uris.len(), 3);
    assert!(uris[0].has_authority());
    assert_eq!(uris[2].path().unwrap(), "");

    let e = serde_json::from_str::<Uri>(r#""http://[::1""#).unwrap_err();
    assert!(e.to_string().starts_with("failed to parse"));

    assert!(serde_json::from_str::<Uri>("1").is_err());
}
