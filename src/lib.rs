#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! A generic URI reference engine following IETF [RFC 3986].
//!
//! A [`Uri`] holds the components of a URI reference in an arena it owns.
//! It can be [parsed](Uri::parse) from a string or assembled with setters,
//! [normalized](Uri::normalize) in place, [composed](Uri::compose) back into
//! a string, and used as the base against which a reference is
//! [transformed](Uri::transform) into a target URI.
//!
//! [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
//!
//! # Examples
//!
//! ```
//! use guri::Uri;
//!
//! let mut uri = Uri::new();
//! let mut target = Uri::new();
//! let base = Uri::parse_new("http://a/b/c/d;p?q")?;
//!
//! for line in ["HTTP://Example.COM/./a/../%7euser", "../../../g"] {
//!     uri.parse(line)?;
//!     uri.normalize();
//!     base.transform(&uri, &mut target);
//!     println!("{target}");
//! }
//! # Ok::<_, guri::ParseError<&str>>(())
//! ```
//!
//! Parsing is permissive by default, accepting some characters often
//! left unescaped in the wild. Use a [`Parser`] to change this:
//!
//! ```
//! use guri::{Conformance, Parser, Uri};
//!
//! let mut uri = Uri::new();
//! let input = "http://example.com/?x=[1]";
//!
//! assert!(uri.parse(input).is_ok());
//! let e = Parser::new()
//!     .conformance(Conformance::Strict)
//!     .parse(&mut uri, input)
//!     .unwrap_err();
//! assert_eq!(e.failed_at(), "[1]");
//! ```
//!
//! # Crate features
//!
//! - `std` (default): Enables `std` support. This includes [`Error`] implementations.
//!
//! - `impl-error`: Enables [`Error`] implementations without `std`, using
//!   [`core::error::Error`].
//!
//! - `serde`: Enables [`serde`] support. A [`Uri`] serializes as its composed
//!   string and deserializes by parsing in permissive mode.
//!
//! [`Error`]: core::error::Error
//! [`serde`]: https://docs.rs/serde

extern crate alloc;

mod arena;
mod compose;
pub mod component;
mod fmt;
mod normalize;
pub mod parse;
pub mod pct_enc;
pub mod resolve;
mod uri;

pub use parse::{Conformance, ParseError, ParseErrorKind, Parser};
pub use uri::Uri;

#[cfg(feature = "impl-error")]
use core::error::Error;
