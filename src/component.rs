//! URI components.

use crate::{parse, pct_enc::table};
use core::fmt;
use ref_cast::{ref_cast_custom, RefCastCustom};

/// A [scheme] component.
///
/// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
///
/// # Comparison
///
/// `Scheme`s are compared case-insensitively. You should do a case-insensitive
/// comparison if the scheme specification allows both letter cases in the scheme name.
///
/// # Examples
///
/// ```
/// use guri::{component::Scheme, Uri};
///
/// const SCHEME_HTTP: &Scheme = Scheme::new_or_panic("http");
///
/// let uri = Uri::parse_new("HTTP://EXAMPLE.COM/")?;
/// let scheme = uri.scheme().unwrap();
///
/// // Case-insensitive comparison.
/// assert_eq!(scheme, SCHEME_HTTP);
/// // Case-sensitive comparison.
/// assert_eq!(scheme.as_str(), "HTTP");
/// # Ok::<_, guri::ParseError<&str>>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Scheme {
    inner: str,
}

impl Scheme {
    #[ref_cast_custom]
    #[inline]
    pub(crate) const fn new_validated(scheme: &str) -> &Scheme;

    /// Converts a string slice to `&Scheme`.
    ///
    /// # Panics
    ///
    /// Panics if the string is not a valid scheme name according to
    /// [Section 3.1 of RFC 3986][scheme]. For a non-panicking variant,
    /// use [`new`](Self::new).
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    #[inline]
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Scheme {
        match Self::new(s) {
            Some(scheme) => scheme,
            None => panic!("invalid scheme"),
        }
    }

    /// Converts a string slice to `&Scheme`, returning `None` if the conversion fails.
    #[inline]
    #[must_use]
    pub const fn new(s: &str) -> Option<&Scheme> {
        if is_valid_scheme(s.as_bytes()) {
            Some(Scheme::new_validated(s))
        } else {
            None
        }
    }

    /// Returns the scheme component as a string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::Uri;
    ///
    /// let uri = Uri::parse_new("http://example.com/")?;
    /// assert_eq!(uri.scheme().unwrap().as_str(), "http");
    /// let uri = Uri::parse_new("HTTP://EXAMPLE.COM/")?;
    /// assert_eq!(uri.scheme().unwrap().as_str(), "HTTP");
    /// # Ok::<_, guri::ParseError<&str>>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

const fn is_valid_scheme(mut s: &[u8]) -> bool {
    let [first, rem @ ..] = s else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    s = rem;
    while let [x, rem @ ..] = s {
        if !table::SCHEME.allows_ascii(*x) {
            return false;
        }
        s = rem;
    }
    true
}

impl PartialEq for Scheme {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl Eq for Scheme {}

impl fmt::Display for Scheme {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl fmt::Debug for Scheme {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// The syntactic kind of a [host] subcomponent.
///
/// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// An IPv4 address in dotted-decimal form.
    Ipv4,
    /// An IPv6 address enclosed in square brackets.
    Ipv6,
    /// An IP address of future version enclosed in square brackets.
    IpvFuture,
    /// A registered name, possibly empty.
    RegName,
}

impl HostKind {
    /// Classifies a host string.
    ///
    /// Anything that is neither a bracketed IP literal nor a dotted-decimal
    /// IPv4 address is taken as a registered name.
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::component::HostKind;
    ///
    /// assert_eq!(HostKind::of("127.0.0.1"), HostKind::Ipv4);
    /// assert_eq!(HostKind::of("[::1]"), HostKind::Ipv6);
    /// assert_eq!(HostKind::of("[v7.fe]"), HostKind::IpvFuture);
    /// assert_eq!(HostKind::of("127.0.0.256"), HostKind::RegName);
    /// assert_eq!(HostKind::of(""), HostKind::RegName);
    /// ```
    #[must_use]
    pub fn of(host: &str) -> HostKind {
        match host.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(lit) if parse::is_ipv6(lit.as_bytes()) => HostKind::Ipv6,
            Some(lit) if parse::is_ipv_future(lit.as_bytes()) => HostKind::IpvFuture,
            _ if parse::is_ipv4(host.as_bytes()) => HostKind::Ipv4,
            _ => HostKind::RegName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_validation() {
        assert!(Scheme::new("svn+ssh").is_some());
        assert!(Scheme::new("a1.-+").is_some());
        assert!(Scheme::new("").is_none());
        assert!(Scheme::new("1http").is_none());
        assert!(Scheme::new("ht tp").is_none());
        assert_eq!(Scheme::new_or_panic("HTTP"), Scheme::new_or_panic("http"));
    }
}
