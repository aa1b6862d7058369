//! Module for reference resolution.

use crate::{uri::Parts, Uri};
use alloc::string::String;

impl Uri {
    /// Resolves a URI reference against `self` as the base, writing the
    /// target URI into `target`.
    ///
    /// This method implements the algorithm from [Section 5.2.2 of RFC 3986][resolve]
    /// with the following edge-case behavior:
    ///
    /// - If the reference has no scheme or authority and an empty path, the
    ///   path of the base is taken verbatim, with no dot segments removed.
    /// - A relative path is merged with the base path up to and including its
    ///   last `'/'` (or `"/"` if the base has an authority and an empty path).
    ///   If the base has no authority, the reference path is used alone.
    /// - In every other case, dot segments are removed from the selected or
    ///   merged path. A `".."` that would climb above the root is absorbed,
    ///   so `"../../../g"` against `"http://a/b/c/d;p?q"` gives `"http://a/g"`.
    ///   `"%2E"` and `"%2e"` count as `'.'`.
    /// - If the target has no authority and its path starts with `"//"`,
    ///   `"/."` is prepended to the path.
    /// - The fragment of the base never carries over.
    ///
    /// Any previous contents of `target` are discarded. Resolution never fails,
    /// and does not normalize anything other than dot segments.
    ///
    /// [resolve]: https://datatracker.ietf.org/doc/html/rfc3986/#section-5.2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::Uri;
    ///
    /// let base = Uri::parse_new("http://a/b/c/d;p?q")?;
    /// let mut target = Uri::new();
    ///
    /// base.transform(&Uri::parse_new("g;x=1/../y")?, &mut target);
    /// assert_eq!(target.compose(), "http://a/b/c/y");
    ///
    /// base.transform(&Uri::parse_new("#s")?, &mut target);
    /// assert_eq!(target.compose(), "http://a/b/c/d;p?q#s");
    ///
    /// // A reference built with setters.
    /// let mut reference = Uri::new();
    /// reference.set_path("../../../g").set_query("?y");
    /// base.transform(&reference, &mut target);
    /// assert_eq!(target.compose(), "http://a/g?y");
    /// # Ok::<_, guri::ParseError<&str>>(())
    /// ```
    pub fn transform(&self, reference: &Uri, target: &mut Uri) {
        let mut path_buf = String::new();
        let t = resolve(self.parts(), reference.parts(), &mut path_buf);

        target.clear();
        let arena = &mut target.arena;
        let mut copy = |s: Option<&str>| s.map(|s| arena.alloc(s));

        target.scheme = copy(t.scheme);
        target.userinfo = copy(t.userinfo);
        target.host = copy(t.host);
        target.path = copy(t.path);
        target.query = copy(t.query);
        target.fragment = copy(t.fragment);
        target.port = t.port;
    }
}

/// A URI reference resolver against a fixed base.
///
/// # Examples
///
/// ```
/// use guri::{resolve::Resolver, Uri};
///
/// let base = Uri::parse_new("http://example.com/foo/bar")?;
/// let resolver = Resolver::with_base(&base);
///
/// assert_eq!(resolver.resolve(&Uri::parse_new("baz")?).compose(), "http://example.com/foo/baz");
/// assert_eq!(resolver.resolve(&Uri::parse_new("../baz")?).compose(), "http://example.com/baz");
/// assert_eq!(resolver.resolve(&Uri::parse_new("?baz")?).compose(), "http://example.com/foo/bar?baz");
/// # Ok::<_, guri::ParseError<&str>>(())
/// ```
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct Resolver<'a> {
    base: &'a Uri,
}

impl<'a> Resolver<'a> {
    /// Creates a new `Resolver` with the given base.
    pub fn with_base(base: &'a Uri) -> Self {
        Self { base }
    }

    /// Resolves the given reference against the configured base.
    ///
    /// See [`Uri::transform`] for the exact behavior of this method.
    #[must_use]
    pub fn resolve(&self, reference: &Uri) -> Uri {
        let mut target = Uri::new();
        self.base.transform(reference, &mut target);
        target
    }
}

pub(crate) fn resolve<'a>(
    base: Parts<'a>,
    /* reference */ r: Parts<'a>,
    buf: &'a mut String,
) -> Parts<'a> {
    let (t_scheme, t_userinfo, t_host, t_port, t_query);
    let mut t_path = None;

    if r.scheme.is_some() {
        t_scheme = r.scheme;
        (t_userinfo, t_host, t_port) = (r.userinfo, r.host, r.port);
        if let Some(r_path) = r.path {
            remove_dot_segments(buf, r_path);
            t_path = Some(());
        }
        t_query = r.query;
    } else {
        if r.host.is_some() {
            (t_userinfo, t_host, t_port) = (r.userinfo, r.host, r.port);
            if let Some(r_path) = r.path {
                remove_dot_segments(buf, r_path);
                t_path = Some(());
            }
            t_query = r.query;
        } else {
            match r.path {
                None | Some("") => {
                    // Keep the base path verbatim.
                    if let Some(base_path) = base.path {
                        buf.push_str(base_path);
                        t_path = Some(());
                    }
                    t_query = r.query.or(base.query);
                }
                Some(r_path) => {
                    if r_path.starts_with('/') {
                        remove_dot_segments(buf, r_path);
                    } else {
                        // Instead of merging the paths, remove dot segments incrementally.
                        // Without an authority in the base, the reference path stands alone.
                        if base.host.is_some() {
                            let base_path = base.path.unwrap_or_default();
                            if base_path.is_empty() {
                                buf.push('/');
                            } else if let Some(i) = base_path.rfind('/') {
                                remove_dot_segments(buf, &base_path[..=i]);
                            }
                        }
                        remove_dot_segments(buf, r_path);
                    }
                    t_path = Some(());
                    t_query = r.query;
                }
            }
            (t_userinfo, t_host, t_port) = (base.userinfo, base.host, base.port);
        }
        t_scheme = base.scheme;
    }

    // Close the loophole in the RFC 3986 algorithm.
    if t_host.is_none() && buf.starts_with("//") {
        buf.insert_str(0, "/.");
    }

    let buf: &'a String = buf;
    Parts {
        scheme: t_scheme,
        userinfo: t_userinfo,
        host: t_host,
        port: t_port,
        path: t_path.map(|()| buf.as_str()),
        query: t_query,
        fragment: r.fragment,
    }
}

/// Appends `path` to `buf` with dot segments removed, as in
/// [Section 5.2.4 of RFC 3986](https://datatracker.ietf.org/doc/html/rfc3986/#section-5.2.4).
///
/// `buf` must be empty or end with `'/'`. A `".."` never removes the
/// leading `'/'` of an absolute path, and is dropped when there is
/// nothing left to remove.
pub(crate) fn remove_dot_segments(buf: &mut String, path: &str) {
    for seg in path.split_inclusive('/') {
        let seg_stripped = seg.strip_suffix('/').unwrap_or(seg);
        match classify_segment(seg_stripped) {
            SegKind::Dot => {}
            SegKind::DoubleDot => {
                if !buf.is_empty() && buf != "/" {
                    buf.pop();
                    buf.truncate(buf.rfind('/').map_or(0, |i| i + 1));
                }
            }
            SegKind::Normal => buf.push_str(seg),
        }
    }
}

enum SegKind {
    Dot,
    DoubleDot,
    Normal,
}

fn classify_segment(mut seg: &str) -> SegKind {
    if seg.is_empty() {
        return SegKind::Normal;
    }
    if let Some(rem) = seg.strip_prefix('.') {
        seg = rem;
    } else if let Some(rem) = seg.strip_prefix("%2E") {
        seg = rem;
    } else if let Some(rem) = seg.strip_prefix("%2e") {
        seg = rem;
    }
    if seg.is_empty() {
        SegKind::Dot
    } else if seg == "." || seg == "%2E" || seg == "%2e" {
        SegKind::DoubleDot
    } else {
        SegKind::Normal
    }
}
