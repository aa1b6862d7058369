//! Reads URI references from stdin, one per line, parsing and then
//! normalizing each of them.
//!
//! Pass `--strict` to reject characters outside the RFC 3986 grammar
//! and `--print` to print every normalized URI reference.

use std::{env, io};

use guri::{Conformance, Parser, Uri};

fn main() {
    let mut conformance = Conformance::Permissive;
    let mut print = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--strict" => conformance = Conformance::Strict,
            "--print" => print = true,
            _ => {
                eprintln!("usage: parse_from_stdin [--strict] [--print]");
                return;
            }
        }
    }

    let parser = Parser::new().conformance(conformance);
    let mut uri = Uri::new();

    for line in io::stdin().lines() {
        let line = line.expect("failed to read line");
        match parser.parse(&mut uri, line.as_str()) {
            Ok(()) => {
                uri.normalize();
                if print {
                    println!("{uri}");
                }
            }
            Err(e) => eprintln!("error for {line} at {}", e.failed_at()),
        }
    }
}
