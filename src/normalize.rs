//! Module for normalization.

use crate::{
    arena::Arena,
    pct_enc::{self, table, Decode, DecodedChunk},
    resolve, Uri,
};
use alloc::string::String;

impl Uri {
    /// Normalizes the `Uri` in place, following the syntax-based normalization
    /// described in [Section 6.2.2 of RFC 3986][norm].
    ///
    /// This method applies the following rules:
    ///
    /// - Lowercase the scheme and the host.
    /// - In every component, decode any percent-encoded octet that corresponds
    ///   to an unreserved character, and uppercase the hexadecimal digits
    ///   within all other percent-encoded octets. Stray percent characters
    ///   are kept as is.
    /// - Remove dot segments from the path, absorbing any `".."` that would
    ///   climb above the root, and dropping a leading `"./"` or `"../"`.
    ///   Then replace an empty path or a path of only slashes with `"/"`.
    /// - If no authority is present and the path then starts with `"//"`,
    ///   prepend `"/."` to the path so that it is not taken as an authority
    ///   when composed. Likewise, if neither a scheme nor an authority is
    ///   present and the first segment contains `':'`, prepend `"./"` so
    ///   that the segment is not taken as a scheme.
    ///
    /// A present path is therefore never empty after normalization:
    /// `"#frag"` normalizes to `"/#frag"`.
    ///
    /// The port is left intact. In particular, it is never removed because it
    /// equals the default port of the scheme.
    ///
    /// Normalization is idempotent and never fails. The arena is rebuilt so
    /// that it only holds the normalized components.
    ///
    /// [norm]: https://datatracker.ietf.org/doc/html/rfc3986/#section-6.2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::Uri;
    ///
    /// let mut uri = Uri::parse_new("eXAMPLE://ExAmPlE.CoM/a/./b/../%7e%63%7b")?;
    /// uri.normalize();
    /// assert_eq!(uri.compose(), "example://example.com/a/~c%7B");
    ///
    /// let mut uri = Uri::parse_new("x://a//////")?;
    /// uri.normalize();
    /// assert_eq!(uri.path().unwrap(), "/");
    ///
    /// let mut uri = Uri::parse_new("foo:./a/../b")?;
    /// uri.normalize();
    /// assert_eq!(uri.path().unwrap(), "b");
    /// # Ok::<_, guri::ParseError<&str>>(())
    /// ```
    pub fn normalize(&mut self) {
        let parts = self.parts();
        let has_host = parts.host.is_some();
        let has_scheme = parts.scheme.is_some();

        let mut arena = Arena::with_capacity(self.arena.len());
        let mut path_buf = String::new();

        let scheme = parts.scheme.map(|s| {
            arena.alloc_with(|buf| {
                let start = buf.len();
                buf.push_str(s);
                buf[start..].make_ascii_lowercase();
            })
        });
        let userinfo = parts
            .userinfo
            .map(|s| arena.alloc_with(|buf| normalize_estr(buf, s, false)));
        let host = parts
            .host
            .map(|s| arena.alloc_with(|buf| normalize_estr(buf, s, true)));

        let path = parts.path.map(|path| {
            let mut decoded = String::with_capacity(path.len());
            normalize_estr(&mut decoded, path, false);

            path_buf.reserve(decoded.len() + 2);
            resolve::remove_dot_segments(&mut path_buf, &decoded);

            if path_buf.bytes().all(|x| x == b'/') {
                path_buf.clear();
                path_buf.push('/');
            } else if !has_host && path_buf.starts_with("//") {
                path_buf.insert_str(0, "/.");
            } else if !has_host && !has_scheme && first_segment_has_colon(&path_buf) {
                path_buf.insert_str(0, "./");
            }
            arena.alloc(&path_buf)
        });

        let query = parts
            .query
            .map(|s| arena.alloc_with(|buf| normalize_estr(buf, s, false)));
        let fragment = parts
            .fragment
            .map(|s| arena.alloc_with(|buf| normalize_estr(buf, s, false)));

        self.arena = arena;
        self.scheme = scheme;
        self.userinfo = userinfo;
        self.host = host;
        self.path = path;
        self.query = query;
        self.fragment = fragment;
    }
}

/// Appends `s` to `buf`, decoding percent-encoded unreserved characters
/// and uppercasing the rest.
fn normalize_estr(buf: &mut String, s: &str, to_ascii_lowercase: bool) {
    let start = buf.len();

    for chunk in Decode::new(s) {
        match chunk {
            DecodedChunk::Unencoded(s) => {
                let i = buf.len();
                buf.push_str(s);
                if to_ascii_lowercase {
                    buf[i..].make_ascii_lowercase();
                }
            }
            DecodedChunk::PctDecoded(mut x) => {
                if table::UNRESERVED.allows_ascii(x) && !completes_octet(&buf[start..], x) {
                    if to_ascii_lowercase {
                        x.make_ascii_lowercase();
                    }
                    buf.push(x as char);
                } else {
                    buf.push_str(pct_enc::encode_byte(x));
                }
            }
        }
    }
}

/// Checks whether the first segment of a rootless path contains `':'`,
/// which would make it read as a scheme.
fn first_segment_has_colon(path: &str) -> bool {
    !path.starts_with('/') && path.split('/').next().is_some_and(|seg| seg.contains(':'))
}

/// Checks whether pushing `x` onto `out` would turn a stray percent
/// character at its end into a percent-encoded octet.
fn completes_octet(out: &str, x: u8) -> bool {
    pct_enc::is_hexdig(x)
        && match out.as_bytes() {
            [.., b'%'] => true,
            [.., b'%', y] => pct_enc::is_hexdig(*y),
            _ => false,
        }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str, lower: bool) -> String {
        let mut buf = String::new();
        normalize_estr(&mut buf, s, lower);
        buf
    }

    #[test]
    fn estr() {
        assert_eq!(norm("%63%7b%7B%25%0b", false), "c%7B%7B%25%0B");
        assert_eq!(norm("%41bC", false), "AbC");
        assert_eq!(norm("%41bC", true), "abc");
        assert_eq!(norm("100%", false), "100%");
        assert_eq!(norm("%zz%2e", false), "%zz.");
    }

    #[test]
    fn stray_percent_stays_stray() {
        // Decoding "%34" to "4" would make "%4" a new octet with the "1".
        assert_eq!(norm("%%341", false), "%%341");
        assert_eq!(norm("%a%62", false), "%a%62");
        assert_eq!(norm("%%41", false), "%%41");
        for s in ["%%341", "%a%62", "%%41", "%%7e"] {
            let once = norm(s, false);
            assert_eq!(norm(&once, false), once);
        }
    }
}
