//! Module for recomposition.

use crate::{uri::Parts, Uri};
use alloc::string::String;
use core::fmt::{self, Write};

impl Uri {
    /// Recomposes the components into a URI reference string, as in
    /// [Section 5.3 of RFC 3986][recomp].
    ///
    /// Only present components are written: the scheme followed by `':'`;
    /// if the host is present, `"//"`, the userinfo followed by `'@'`, the host,
    /// and `':'` followed by the port; then the path, the query and the
    /// fragment verbatim. The userinfo and the port are omitted when the
    /// host is absent.
    ///
    /// No normalization or validation is performed. The returned string
    /// does not borrow from the `Uri`.
    ///
    /// [recomp]: https://datatracker.ietf.org/doc/html/rfc3986/#section-5.3
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::Uri;
    ///
    /// let mut uri = Uri::new();
    /// uri.set_scheme("svn+ssh")
    ///     .set_userinfo("user")
    ///     .set_host("example.com")
    ///     .set_port(Some(22))
    ///     .set_path("/repo")
    ///     .set_query("?rev=1");
    /// assert_eq!(uri.compose(), "svn+ssh://user@example.com:22/repo?rev=1");
    /// ```
    #[must_use]
    pub fn compose(&self) -> String {
        let parts = self.parts();
        let mut buf = String::with_capacity(composed_len(&parts));
        // Writing to a `String` never fails.
        let _ = write_full(&mut buf, &parts);
        buf
    }

    /// Recomposes the path, the query and the fragment into a relative
    /// reference string, omitting the scheme and the authority.
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::Uri;
    ///
    /// let uri = Uri::parse_new("http://example.com/path?q=1#top")?;
    /// assert_eq!(uri.compose_partial(), "/path?q=1#top");
    /// # Ok::<_, guri::ParseError<&str>>(())
    /// ```
    #[must_use]
    pub fn compose_partial(&self) -> String {
        let parts = self.parts();
        let mut buf = String::with_capacity(partial_len(&parts));
        let _ = write_partial(&mut buf, &parts);
        buf
    }
}

fn partial_len(parts: &Parts<'_>) -> usize {
    [parts.path, parts.query, parts.fragment]
        .iter()
        .flatten()
        .map(|s| s.len())
        .sum()
}

fn composed_len(parts: &Parts<'_>) -> usize {
    let mut len = partial_len(parts);
    if let Some(scheme) = parts.scheme {
        len += scheme.len() + 1;
    }
    if let Some(host) = parts.host {
        len += host.len() + 2;
        if let Some(userinfo) = parts.userinfo {
            len += userinfo.len() + 1;
        }
        if parts.port.is_some() {
            // ":" and at most 5 digits.
            len += 6;
        }
    }
    len
}

pub(crate) fn write_full<W: Write>(w: &mut W, parts: &Parts<'_>) -> fmt::Result {
    if let Some(scheme) = parts.scheme {
        w.write_str(scheme)?;
        w.write_char(':')?;
    }
    if let Some(host) = parts.host {
        w.write_str("//")?;
        if let Some(userinfo) = parts.userinfo {
            w.write_str(userinfo)?;
            w.write_char('@')?;
        }
        w.write_str(host)?;
        if let Some(port) = parts.port {
            write!(w, ":{port}")?;
        }
    }
    write_partial(w, parts)
}

fn write_partial<W: Write>(w: &mut W, parts: &Parts<'_>) -> fmt::Result {
    for s in [parts.path, parts.query, parts.fragment].into_iter().flatten() {
        w.write_str(s)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_exact_or_over() {
        let parts = Parts {
            scheme: Some("http"),
            userinfo: Some("u"),
            host: Some("h"),
            port: Some(65535),
            path: Some("/p"),
            query: Some("?q"),
            fragment: Some("#f"),
        };
        let mut buf = String::new();
        write_full(&mut buf, &parts).unwrap();
        assert_eq!(buf, "http://u@h:65535/p?q#f");
        assert_eq!(composed_len(&parts), buf.len());
    }

    #[test]
    fn authority_parts_need_host() {
        let parts = Parts {
            userinfo: Some("u"),
            port: Some(1),
            path: Some("p"),
            ..Parts::default()
        };
        let mut buf = String::new();
        write_full(&mut buf, &parts).unwrap();
        assert_eq!(buf, "p");
    }
}
