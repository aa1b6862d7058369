//! Module for parsing.

use crate::{
    pct_enc::{self, table, Table},
    Uri,
};
use borrow_or_share::BorrowOrShare;
use core::{
    fmt,
    ops::{Deref, DerefMut},
};

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ParseErrorKind {
    /// Unexpected character or end of input.
    ///
    /// The error index points to the first byte of the character or the end of input.
    UnexpectedCharOrEnd,
    /// Percent character not followed by two hexadecimal digits, in a component
    /// that does not tolerate stray percent characters.
    ///
    /// The error index points to the first byte after `'%'` that is not
    /// a hexadecimal digit, or to the end of input.
    InvalidOctet,
    /// Invalid IPv6 address.
    ///
    /// The error index points to the first byte of the address.
    InvalidIpv6Addr,
    /// Port number greater than 65535.
    ///
    /// The error index points to the first digit of the port.
    PortOverflow,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnexpectedCharOrEnd => "unexpected character or end of input",
            Self::InvalidOctet => "invalid percent-encoded octet",
            Self::InvalidIpv6Addr => "invalid IPv6 address",
            Self::PortOverflow => "port number out of range",
        };
        f.write_str(msg)
    }
}

/// An error occurred when parsing a URI (reference).
///
/// The error keeps the input that was attempted to parse, so that
/// [`failed_at`](Self::failed_at) can point into it.
///
/// # Examples
///
/// ```
/// use guri::{ParseErrorKind, Uri};
///
/// let mut uri = Uri::new();
/// let e = uri.parse("http://baduri;f[303fds").unwrap_err();
/// assert_eq!(e.index(), 15);
/// assert_eq!(e.kind(), ParseErrorKind::UnexpectedCharOrEnd);
/// assert_eq!(e.failed_at(), "[303fds");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseError<I = ()> {
    index: usize,
    kind: ParseErrorKind,
    input: I,
}

impl ParseError<()> {
    pub(crate) fn with_input<I>(self, input: I) -> ParseError<I> {
        ParseError {
            index: self.index,
            kind: self.kind,
            input,
        }
    }
}

impl<I> ParseError<I> {
    /// Returns the byte index in the input at which the error occurred.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Recovers the input that was attempted to parse.
    #[must_use]
    pub fn into_input(self) -> I {
        self.input
    }

    /// Returns the error with input erased.
    #[must_use]
    pub fn plain(&self) -> ParseError {
        ParseError {
            index: self.index,
            kind: self.kind,
            input: (),
        }
    }
}

impl<'i, 'o, I: BorrowOrShare<'i, 'o, str>> ParseError<I> {
    /// Returns the suffix of the input starting at the error index.
    ///
    /// For `I = &'a str`, the returned slice borrows from the input
    /// rather than from the error.
    #[must_use]
    pub fn failed_at(&'i self) -> &'o str {
        let input: &'o str = self.input.borrow_or_share();
        input.get(self.index..).unwrap_or_default()
    }
}

impl<I> fmt::Display for ParseError<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at index {}", self.kind, self.index)
    }
}

#[cfg(feature = "impl-error")]
impl<I: fmt::Debug> crate::Error for ParseError<I> {}

type Result<T> = core::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
            input: (),
        })
    };
}

/// How strictly the grammar is enforced.
///
/// The scheme, the authority, and the delimiters between components are
/// always enforced strictly. The conformance level only decides what is
/// accepted *within* the path, query, and fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Conformance {
    /// Only characters allowed by RFC 3986 are accepted, and every `'%'`
    /// must start a percent-encoded octet.
    Strict,
    /// Additionally accepts the printable ASCII characters listed in
    /// [`LENIENT_EXTRA`](table::LENIENT_EXTRA), such as `'|'`, `'['` and `']'`,
    /// and a `'%'` not followed by two hexadecimal digits, which is then
    /// taken literally.
    ///
    /// Real-world URLs violate the RFC in these ways often enough that
    /// this is the default.
    #[default]
    Permissive,
}

/// A configurable URI (reference) parser.
///
/// # Examples
///
/// ```
/// use guri::{Conformance, ParseErrorKind, Parser, Uri};
///
/// let mut uri = Uri::new();
/// let input = "http://example.com/?ids=[1|2]&p=100%";
///
/// Parser::new().parse(&mut uri, input)?;
/// assert_eq!(uri.query().unwrap(), "?ids=[1|2]&p=100%");
///
/// let e = Parser::new()
///     .conformance(Conformance::Strict)
///     .parse(&mut uri, input)
///     .unwrap_err();
/// assert_eq!(e.failed_at(), "[1|2]&p=100%");
/// # Ok::<_, guri::ParseError<&str>>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
#[must_use]
pub struct Parser {
    conformance: Conformance,
}

impl Parser {
    /// Creates a new `Parser` with default configuration.
    pub fn new() -> Self {
        Self {
            conformance: Conformance::Permissive,
        }
    }

    /// Sets the conformance level.
    ///
    /// This defaults to [`Conformance::Permissive`].
    pub fn conformance(mut self, value: Conformance) -> Self {
        self.conformance = value;
        self
    }

    /// Parses a URI reference into the given `Uri`.
    ///
    /// Any previous contents of `uri` are discarded. On success every
    /// component present in the input is set and the path is always set,
    /// possibly to the empty string. On failure `uri` is left empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` at the first byte that does not match the
    /// [`URI-reference`][abnf] ABNF rule from RFC 3986, as relaxed by
    /// the configured [`Conformance`].
    ///
    /// [abnf]: https://datatracker.ietf.org/doc/html/rfc3986/#section-4.1
    pub fn parse<I: AsRef<str>>(
        &self,
        uri: &mut Uri,
        input: I,
    ) -> core::result::Result<(), ParseError<I>> {
        uri.clear();
        match parse(input.as_ref().as_bytes(), self.conformance) {
            Ok(meta) => {
                uri.load(input.as_ref(), &meta);
                Ok(())
            }
            Err(e) => Err(e.with_input(input)),
        }
    }
}

/// Component bounds produced by a successful parse.
///
/// Query and fragment bounds include their leading delimiters.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Meta {
    pub scheme_end: Option<usize>,
    pub auth_meta: Option<AuthMeta>,
    pub path_bounds: (usize, usize),
    pub query_bounds: Option<(usize, usize)>,
    pub fragment_bounds: Option<(usize, usize)>,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AuthMeta {
    pub userinfo_bounds: Option<(usize, usize)>,
    pub host_bounds: (usize, usize),
    pub port: Option<u16>,
}

pub(crate) fn parse(bytes: &[u8], conformance: Conformance) -> Result<Meta> {
    let mut scanner = Scanner {
        lenient: conformance == Conformance::Permissive,
        reader: Reader::new(bytes),
        out: Meta::default(),
    };
    scanner.parse_from_scheme()?;
    Ok(scanner.out)
}

/// URI reference scanner.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on the boundary of a UTF-8 code point.
///
/// # Preconditions and guarantees
///
/// Before parsing, ensure that `pos == 0` and `out` is default initialized.
///
/// Start and finish parsing by calling `parse_from_scheme`.
/// The following are guaranteed when parsing succeeds:
///
/// - All output indexes are within bounds and correctly ordered.
/// - All bytes within the output bounds are ASCII.
struct Scanner<'a> {
    lenient: bool,
    reader: Reader<'a>,
    out: Meta,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Deref for Scanner<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl DerefMut for Scanner<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PathKind {
    General,
    AbEmpty,
    ContinuedNoScheme,
}

enum Seg {
    // *1":" 1*4HEXDIG
    Normal(u16, bool),
    // "::"
    Ellipsis,
    // *1":" 1*4HEXDIG "."
    MaybeV4(bool),
    // ":"
    SingleColon,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    #[cold]
    fn invalid_pct(&self) -> Result<bool> {
        let mut i = self.pos + 1;
        if let Some(&x) = self.bytes.get(i) {
            if pct_enc::is_hexdig(x) {
                i += 1;
            }
        }
        err!(i, InvalidOctet);
    }

    fn read(&mut self, table: Table) -> Result<bool> {
        let start = self.pos;
        let mut i = self.pos;

        while i < self.len() {
            let x = self.bytes[i];
            if x == b'%' && table.allows_pct_encoded() {
                match self.bytes[i + 1..] {
                    [hi, lo, ..] if pct_enc::is_hexdig_pair(hi, lo) => i += 3,
                    _ if table.allows_stray_pct() => i += 1,
                    _ => {
                        // INVARIANT: Every byte before `i` has been read.
                        self.pos = i;
                        return self.invalid_pct();
                    }
                }
            } else if table.allows_ascii(x) {
                i += 1;
            } else {
                break;
            }
        }

        // INVARIANT: `i` is non-decreasing and only ASCII bytes are skipped.
        self.pos = i;
        Ok(self.pos > start)
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            // INVARIANT: The remaining bytes start with `s` so it's fine to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    fn read_v6(&mut self) -> Option<[u16; 8]> {
        let mut segs = [0; 8];
        let mut ellipsis_idx = 8;

        let mut i = 0;
        while i < 8 {
            match self.read_v6_segment() {
                Some(Seg::Normal(seg, colon)) => {
                    if colon == (i == 0 || i == ellipsis_idx) {
                        // Leading colon, triple colons, or no colon.
                        return None;
                    }
                    segs[i] = seg;
                    i += 1;
                }
                Some(Seg::Ellipsis) => {
                    if ellipsis_idx != 8 {
                        // Multiple ellipses.
                        return None;
                    }
                    ellipsis_idx = i;
                }
                Some(Seg::MaybeV4(colon)) => {
                    if i > 6 || colon == (i == ellipsis_idx) {
                        // Not enough space, triple colons, or no colon.
                        return None;
                    }
                    let octets = self.read_v4()?.to_be_bytes();
                    segs[i] = u16::from_be_bytes([octets[0], octets[1]]);
                    segs[i + 1] = u16::from_be_bytes([octets[2], octets[3]]);
                    i += 2;
                    break;
                }
                Some(Seg::SingleColon) => return None,
                None => break,
            }
        }

        if ellipsis_idx == 8 {
            // No ellipsis.
            if i != 8 {
                // Too short.
                return None;
            }
        } else if i == 8 {
            // Eliding nothing.
            return None;
        } else {
            // Shift the segments after the ellipsis to the right.
            for j in (ellipsis_idx..i).rev() {
                segs[8 - (i - j)] = segs[j];
                segs[j] = 0;
            }
        }

        Some(segs)
    }

    fn read_v6_segment(&mut self) -> Option<Seg> {
        let colon = self.read_str(":");
        let Some(first) = self.peek(0) else {
            return colon.then_some(Seg::SingleColon);
        };

        let mut x = match pct_enc::decode_hexdigit(first) {
            Some(v) => v as u16,
            _ => {
                return colon.then(|| {
                    if first == b':' {
                        // INVARIANT: Skipping ":" is fine.
                        self.skip(1);
                        Seg::Ellipsis
                    } else {
                        Seg::SingleColon
                    }
                });
            }
        };
        let mut i = 1;

        while i < 4 {
            let Some(b) = self.peek(i) else {
                break;
            };
            match pct_enc::decode_hexdigit(b) {
                Some(v) => {
                    x = (x << 4) | v as u16;
                    i += 1;
                }
                _ if b == b'.' => return Some(Seg::MaybeV4(colon)),
                _ => break,
            }
        }
        // INVARIANT: Skipping `i` hexadecimal digits is fine.
        self.skip(i);
        Some(Seg::Normal(x, colon))
    }

    fn read_v4(&mut self) -> Option<u32> {
        let mut addr = self.read_v4_octet()? << 24;
        for i in (0..3).rev() {
            if !self.read_str(".") {
                return None;
            }
            addr |= self.read_v4_octet()? << (i * 8);
        }
        Some(addr)
    }

    fn read_v4_octet(&mut self) -> Option<u32> {
        let mut res = self.peek_digit(0)?;
        if res == 0 {
            // INVARIANT: Skipping "0" is fine.
            self.skip(1);
            return Some(0);
        }

        for i in 1..3 {
            let Some(x) = self.peek_digit(i) else {
                // INVARIANT: Skipping `i` digits is fine.
                self.skip(i);
                return Some(res);
            };
            res = res * 10 + x;
        }
        // INVARIANT: Skipping 3 digits is fine.
        self.skip(3);

        u8::try_from(res).is_ok().then_some(res)
    }

    fn peek_digit(&self, i: usize) -> Option<u32> {
        self.peek(i).and_then(|x| (x as char).to_digit(10))
    }

    /// Reads an optional `":" port` and returns the bounds of the digits.
    fn read_port(&mut self) -> Option<(usize, usize)> {
        if self.read_str(":") {
            let start = self.pos;
            let mut i = 0;
            while self.peek_digit(i).is_some() {
                i += 1;
            }
            // INVARIANT: Skipping `i` digits is fine.
            self.skip(i);
            Some((start, self.pos))
        } else {
            None
        }
    }

    fn read_ip_literal(&mut self) -> Result<bool> {
        if !self.read_str("[") {
            return Ok(false);
        }

        let start = self.pos;

        if self.read_v6().is_some() {
            // IPv6address
        } else if self.pos == start {
            self.read_ipv_future()?;
        } else {
            err!(start, InvalidIpv6Addr);
        }

        if !self.read_str("]") {
            err!(self.pos, UnexpectedCharOrEnd);
        }
        Ok(true)
    }

    fn read_ipv_future(&mut self) -> Result<()> {
        if let Some(b'v' | b'V') = self.peek(0) {
            // INVARIANT: Skipping "v" or "V" is fine.
            self.skip(1);
            if self.read(table::HEXDIG)? && self.read_str(".") && self.read(table::IPV_FUTURE)? {
                return Ok(());
            }
        }
        err!(self.pos, UnexpectedCharOrEnd);
    }
}

pub(crate) fn is_ipv4(bytes: &[u8]) -> bool {
    let mut reader = Reader::new(bytes);
    reader.read_v4().is_some() && !reader.has_remaining()
}

pub(crate) fn is_ipv6(bytes: &[u8]) -> bool {
    let mut reader = Reader::new(bytes);
    reader.read_v6().is_some() && !reader.has_remaining()
}

pub(crate) fn is_ipv_future(bytes: &[u8]) -> bool {
    let mut reader = Reader::new(bytes);
    reader.read_ipv_future().is_ok() && !reader.has_remaining()
}

fn port_value(digits: &[u8]) -> Option<u16> {
    digits.iter().try_fold(0u16, |acc, &x| {
        acc.checked_mul(10)?.checked_add(u16::from(x - b'0'))
    })
}

impl Scanner<'_> {
    #[inline]
    fn select(&self, strict: Table, lenient: Table) -> Table {
        if self.lenient {
            lenient
        } else {
            strict
        }
    }

    /// Reads a host and returns its bounds.
    fn read_host(&mut self) -> Result<(usize, usize, bool)> {
        let start = self.pos;
        let is_ip_literal = self.read_ip_literal()?;
        if !is_ip_literal {
            // An IPv4address is also a reg-name.
            self.read(table::REG_NAME)?;
        }
        Ok((start, self.pos, is_ip_literal))
    }

    fn parse_from_scheme(&mut self) -> Result<()> {
        self.read(table::SCHEME)?;

        if self.peek(0) == Some(b':') {
            // Scheme starts with a letter.
            if self.pos > 0 && self.bytes[0].is_ascii_alphabetic() {
                self.out.scheme_end = Some(self.pos);
            } else {
                err!(0, UnexpectedCharOrEnd);
            }

            // INVARIANT: Skipping ":" is fine.
            self.skip(1);
            return if self.read_str("//") {
                self.parse_from_authority()
            } else {
                self.parse_from_path(PathKind::General)
            };
        } else if self.pos == 0 {
            // Nothing read.
            if self.read_str("//") {
                return self.parse_from_authority();
            }
        }
        // Scheme chars are valid for path.
        self.parse_from_path(PathKind::ContinuedNoScheme)
    }

    fn parse_from_authority(&mut self) -> Result<()> {
        // We first try to read host and port, noting that
        // a reg-name or IPv4address can also be part of userinfo.
        let auth_start = self.pos;
        let (mut host_start, mut host_end, is_ip_literal) = self.read_host()?;
        let mut port_bounds = self.read_port();
        let mut userinfo_bounds = None;

        if !is_ip_literal {
            let userinfo_start = self.pos;
            let userinfo_read = self.read(table::USERINFO)?;

            if self.peek(0) == Some(b'@') {
                // Userinfo present.
                userinfo_bounds = Some((auth_start, self.pos));
                // INVARIANT: Skipping "@" is fine.
                self.skip(1);

                (host_start, host_end, _) = self.read_host()?;
                port_bounds = self.read_port();
            } else if userinfo_read {
                err!(userinfo_start, UnexpectedCharOrEnd);
            }
        }

        let port = match port_bounds {
            Some((start, end)) if start < end => match port_value(&self.bytes[start..end]) {
                Some(port) => Some(port),
                None => err!(start, PortOverflow),
            },
            _ => None,
        };

        self.out.auth_meta = Some(AuthMeta {
            userinfo_bounds,
            host_bounds: (host_start, host_end),
            port,
        });
        self.parse_from_path(PathKind::AbEmpty)
    }

    fn parse_from_path(&mut self, kind: PathKind) -> Result<()> {
        let path_start;

        match kind {
            PathKind::General | PathKind::AbEmpty => path_start = self.pos,
            PathKind::ContinuedNoScheme => {
                path_start = 0;

                let seg_table = self.select(table::SEGMENT_NZ_NC, table::LENIENT_SEGMENT_NZ_NC);
                self.read(seg_table)?;

                if self.peek(0) == Some(b':') {
                    // In a relative reference, the first path
                    // segment cannot contain a colon character.
                    err!(self.pos, UnexpectedCharOrEnd);
                }
            }
        };

        let path_table = self.select(table::PATH, table::LENIENT_PATH);
        if self.read(path_table)?
            && kind == PathKind::AbEmpty
            && self.bytes[path_start] != b'/'
        {
            err!(path_start, UnexpectedCharOrEnd);
        }

        self.out.path_bounds = (path_start, self.pos);

        if self.peek(0) == Some(b'?') {
            let start = self.pos;
            // INVARIANT: Skipping "?" is fine.
            self.skip(1);
            let query_table = self.select(table::QUERY, table::LENIENT_QUERY);
            self.read(query_table)?;
            self.out.query_bounds = Some((start, self.pos));
        }

        if self.peek(0) == Some(b'#') {
            let start = self.pos;
            // INVARIANT: Skipping "#" is fine.
            self.skip(1);
            let fragment_table = self.select(table::FRAGMENT, table::LENIENT_FRAGMENT);
            self.read(fragment_table)?;
            self.out.fragment_bounds = Some((start, self.pos));
        }

        if self.has_remaining() {
            err!(self.pos, UnexpectedCharOrEnd);
        }
        Ok(())
    }
}
