//! Percent-encoding utilities.

pub mod table;

pub use table::Table;

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{cmp::Ordering, fmt, hash, iter::FusedIterator, str};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// Percent-encoded string slices.
///
/// Every component exposed by a [`Uri`] is an `EStr`, borrowed from
/// the arena of the `Uri`. The slice is *not* guaranteed to be properly
/// encoded: a URI parsed in [permissive] mode or assembled with setters
/// may contain a `'%'` that does not start a percent-encoded octet.
/// Such a stray percent character is taken literally when decoding.
///
/// [`Uri`]: crate::Uri
/// [permissive]: crate::Conformance::Permissive
///
/// # Comparison
///
/// `EStr` slices are compared [lexicographically](Ord#lexicographical-comparison)
/// by their byte values. Normalization is **not** performed prior to comparison.
///
/// # Examples
///
/// ```
/// use guri::Uri;
///
/// let uri = Uri::parse_new("http://example.com/?name=%E5%BC%A0%E4%B8%89&w=100%")?;
/// let query = uri.query().unwrap();
/// assert_eq!(query, "?name=%E5%BC%A0%E4%B8%89&w=100%");
///
/// let (key, value) = query.as_str()[1..].split('&').next().unwrap().split_once('=').unwrap();
/// assert_eq!(key, "name");
/// assert_eq!(guri::pct_enc::EStr::new(value).decode().to_string_lossy(), "张三");
/// # Ok::<_, guri::ParseError<&str>>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct EStr {
    inner: str,
}

impl EStr {
    /// Converts a string slice to an `EStr` slice.
    ///
    /// No validation is performed.
    #[ref_cast_custom]
    #[must_use]
    pub const fn new(s: &str) -> &Self;

    /// An empty `EStr` slice.
    pub const EMPTY: &'static Self = Self::new("");

    /// Yields the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the length of the `EStr` slice in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether the `EStr` slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Checks whether the `EStr` slice contains no percent-encoded octet.
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::pct_enc::EStr;
    ///
    /// assert!(EStr::new("Hello!").is_unencoded());
    /// assert!(EStr::new("100%").is_unencoded());
    /// assert!(!EStr::new("%C2%A1Hola%21").is_unencoded());
    /// ```
    #[must_use]
    pub fn is_unencoded(&self) -> bool {
        find_octet(self.inner.as_bytes(), 0).is_none()
    }

    /// Returns an iterator used to decode the `EStr` slice.
    ///
    /// Always **split before decoding**, as otherwise the data may be
    /// mistaken for component delimiters.
    ///
    /// Note that the iterator will **not** decode `U+002B` (+) as `0x20` (space).
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::pct_enc::EStr;
    ///
    /// let dec = EStr::new("%C2%A1Hola%21").decode();
    /// assert_eq!(*dec.clone().to_bytes(), [0xc2, 0xa1, 0x48, 0x6f, 0x6c, 0x61, 0x21]);
    /// assert_eq!(dec.to_string_lossy(), "¡Hola!");
    ///
    /// assert_eq!(EStr::new("%%41%4").decode().to_string_lossy(), "%A%4");
    /// ```
    pub fn decode(&self) -> Decode<'_> {
        Decode::new(&self.inner)
    }

    /// Returns an iterator over subslices of the `EStr` slice separated by the given delimiter.
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use guri::pct_enc::EStr;
    ///
    /// assert!(EStr::new("a,b,c").split(',').eq(["a", "b", "c"]));
    /// assert!(EStr::new(",").split(',').eq(["", ""]));
    /// assert!(EStr::EMPTY.split(',').eq([""]));
    /// ```
    pub fn split(&self, delim: char) -> Split<'_> {
        assert!(
            table::RESERVED.allows(delim),
            "splitting with non-reserved character"
        );
        Split {
            inner: self.inner.split(delim),
        }
    }
}

impl AsRef<str> for EStr {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq for EStr {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl PartialEq<str> for EStr {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

impl PartialEq<EStr> for str {
    fn eq(&self, other: &EStr) -> bool {
        self == &other.inner
    }
}

impl Eq for EStr {}

impl hash::Hash for EStr {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl PartialOrd for EStr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EStr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl Default for &EStr {
    /// Creates an empty `EStr` slice.
    fn default() -> Self {
        EStr::EMPTY
    }
}

impl fmt::Debug for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

const fn gen_octet_table(hi: bool) -> [u8; 256] {
    let mut out = [0xff; 256];
    let shift = if hi { 4 } else { 0 };

    let mut i = 0;
    while i < 10 {
        out[(i + b'0') as usize] = i << shift;
        i += 1;
    }
    while i < 16 {
        out[(i - 10 + b'A') as usize] = i << shift;
        out[(i - 10 + b'a') as usize] = i << shift;
        i += 1;
    }
    out
}

const OCTET_TABLE_HI: &[u8; 256] = &gen_octet_table(true);
const OCTET_TABLE_LO: &[u8; 256] = &gen_octet_table(false);

pub(crate) const fn is_hexdig(x: u8) -> bool {
    OCTET_TABLE_LO[x as usize] != 0xff
}

pub(crate) const fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    is_hexdig(hi) && is_hexdig(lo)
}

pub(crate) fn decode_hexdigit(x: u8) -> Option<u8> {
    let v = OCTET_TABLE_LO[x as usize];
    (v != 0xff).then_some(v)
}

/// Decodes a percent-encoded octet, assuming that the bytes are hexadecimal.
fn decode_octet(hi: u8, lo: u8) -> u8 {
    debug_assert!(hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit());
    OCTET_TABLE_HI[hi as usize] | OCTET_TABLE_LO[lo as usize]
}

/// Returns the index of the first percent-encoded octet at or after `from`.
fn find_octet(s: &[u8], mut from: usize) -> Option<usize> {
    while let Some(i) = s[from..].iter().position(|&x| x == b'%') {
        let i = from + i;
        if let [_, hi, lo, ..] = s[i..] {
            if is_hexdig_pair(hi, lo) {
                return Some(i);
            }
        }
        from = i + 1;
    }
    None
}

/// Percent-encodes a byte with uppercase hexadecimal digits.
pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

/// An iterator used to decode an [`EStr`] slice.
///
/// This struct is created by [`EStr::decode`]. Normally you'll use the methods below
/// instead of iterating over a `Decode` manually, unless you need precise control
/// over allocation.
///
/// See the [`DecodedChunk`] type for documentation of the items yielded by this iterator.
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Decode<'a> {
    source: &'a str,
}

/// An item returned by the [`Decode`] iterator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedChunk<'a> {
    /// An unencoded subslice, possibly containing stray percent characters.
    Unencoded(&'a str),
    /// A percent-encoded octet, decoded (for example, `"%20"` decoded as `0x20`).
    PctDecoded(u8),
}

impl<'a> Decode<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn next_if_unencoded(&mut self) -> Option<&'a str> {
        let i = find_octet(self.source.as_bytes(), 0).unwrap_or(self.source.len());

        if i == 0 {
            None
        } else {
            let s;
            (s, self.source) = self.source.split_at(i);
            Some(s)
        }
    }

    /// Decodes the slice to bytes.
    ///
    /// This method allocates only when the slice contains any percent-encoded octet.
    #[must_use]
    pub fn to_bytes(mut self) -> Cow<'a, [u8]> {
        let first = match self.next_if_unencoded() {
            Some(s) if self.source.is_empty() => return Cow::Borrowed(s.as_bytes()),
            Some(s) => s,
            None if self.source.is_empty() => return Cow::Borrowed(&[]),
            None => "",
        };

        let mut buf = Vec::with_capacity(first.len() + self.source.len());
        buf.extend_from_slice(first.as_bytes());
        for chunk in self {
            match chunk {
                DecodedChunk::Unencoded(s) => buf.extend_from_slice(s.as_bytes()),
                DecodedChunk::PctDecoded(x) => buf.push(x),
            }
        }
        Cow::Owned(buf)
    }

    /// Decodes the slice to a string, replacing any invalid UTF-8 sequences with
    /// [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
    ///
    /// [U+FFFD]: char::REPLACEMENT_CHARACTER
    ///
    /// This method allocates only when the slice contains any percent-encoded octet.
    #[must_use]
    pub fn to_string_lossy(self) -> Cow<'a, str> {
        match self.to_bytes() {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Cow::Owned(s),
                Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
        }
    }
}

impl<'a> Iterator for Decode<'a> {
    type Item = DecodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_empty() {
            None
        } else if let Some(s) = self.next_if_unencoded() {
            Some(DecodedChunk::Unencoded(s))
        } else {
            let s;
            (s, self.source) = self.source.split_at(3);
            let x = decode_octet(s.as_bytes()[1], s.as_bytes()[2]);
            Some(DecodedChunk::PctDecoded(x))
        }
    }
}

impl FusedIterator for Decode<'_> {}

/// An iterator over subslices of an [`EStr`] slice separated by a delimiter.
///
/// This struct is created by [`EStr::split`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Split<'a> {
    inner: str::Split<'a, char>,
}

impl<'a> Iterator for Split<'a> {
    type Item = &'a EStr;

    fn next(&mut self) -> Option<&'a EStr> {
        self.inner.next().map(EStr::new)
    }
}

impl<'a> DoubleEndedIterator for Split<'a> {
    fn next_back(&mut self) -> Option<&'a EStr> {
        self.inner.next_back().map(EStr::new)
    }
}

impl FusedIterator for Split<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_byte_is_uppercase() {
        assert_eq!(encode_byte(0x7b), "%7B");
        assert_eq!(encode_byte(0x0b), "%0B");
        assert_eq!(encode_byte(b'%'), "%25");
    }

    #[test]
    fn hexdigits() {
        assert!(is_hexdig_pair(b'7', b'b'));
        assert!(!is_hexdig_pair(b'7', b'g'));
        assert_eq!(decode_hexdigit(b'F'), Some(15));
        assert_eq!(decode_hexdigit(b'%'), None);
        assert_eq!(decode_octet(b'6', b'3'), b'c');
    }

    #[test]
    fn decode_skips_stray_percent() {
        let chunks: Vec<_> = Decode::new("a%%41%4").collect();
        assert_eq!(
            chunks,
            [
                DecodedChunk::Unencoded("a%"),
                DecodedChunk::PctDecoded(b'A'),
                DecodedChunk::Unencoded("%4"),
            ]
        );
        assert_eq!(find_octet(b"%zz%2f", 0), Some(3));
        assert_eq!(find_octet(b"100%", 0), None);
    }

    #[test]
    fn to_bytes_borrows_when_unencoded() {
        assert!(matches!(Decode::new("abc%").to_bytes(), Cow::Borrowed(b"abc%")));
        assert!(matches!(Decode::new("").to_bytes(), Cow::Borrowed(b"")));
        assert_eq!(*Decode::new("%41b").to_bytes(), *b"Ab");
        assert_eq!(Decode::new("%FF").to_string_lossy(), "\u{FFFD}");
    }
}
