#![no_main]
use guri::{Conformance, Parser, Uri};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut uri = Uri::new();
    match Parser::new().parse(&mut uri, data) {
        Ok(()) => {
            let composed = uri.compose();
            // Only an empty port or leading zeros in the port can differ.
            if composed != data {
                assert!(uri.has_authority());
                assert!(composed.len() < data.len());
            }
            assert_eq!(Uri::parse_new(composed.as_str()).unwrap(), uri);
        }
        Err(e) => {
            assert!(e.index() <= data.len());
            assert_eq!(uri, Uri::new());
            assert!(Parser::new()
                .conformance(Conformance::Strict)
                .parse(&mut uri, data)
                .is_err());
        }
    }
});
