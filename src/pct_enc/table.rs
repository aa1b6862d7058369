//! Byte pattern tables from RFC 3986.
//!
//! The predefined table constants in this module are documented with
//! the ABNF notation of [RFC 5234].
//!
//! [RFC 5234]: https://datatracker.ietf.org/doc/html/rfc5234

const MASK_PCT_ENCODED: u64 = 1 << b'%';
const MASK_STRAY_PCT: u64 = 1;
const MASK_UNENCODED_ASCII: u64 = !(MASK_PCT_ENCODED | MASK_STRAY_PCT);

/// A table specifying the byte patterns allowed in a string.
#[derive(Clone, Copy, Debug)]
pub struct Table(u64, u64);

impl Table {
    /// Creates a table that only allows the given unencoded bytes.
    ///
    /// # Panics
    ///
    /// Panics if any of the bytes is not ASCII or equals `0` or `b'%'`.
    #[must_use]
    pub const fn new(mut bytes: &[u8]) -> Self {
        let mut table = 0;
        while let [cur, rem @ ..] = bytes {
            assert!(
                !matches!(cur, 0 | b'%' | 128..),
                "cannot allow non-ASCII byte, 0, or %"
            );
            table |= 1u128.wrapping_shl(*cur as u32);
            bytes = rem;
        }
        Self(table as u64, (table >> 64) as u64)
    }

    /// Combines two tables into one.
    ///
    /// Returns a new table that allows all the byte patterns allowed
    /// by `self` or by `other`.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    /// Marks this table as allowing percent-encoded octets.
    #[must_use]
    pub const fn or_pct_encoded(self) -> Self {
        Self(self.0 | MASK_PCT_ENCODED, self.1)
    }

    /// Marks this table as allowing a `'%'` that does not start a
    /// percent-encoded octet, such as in `"100%"` or `"%%"`.
    ///
    /// Such a percent character is taken as a literal byte.
    #[must_use]
    pub const fn or_stray_pct(self) -> Self {
        Self(self.0 | MASK_PCT_ENCODED | MASK_STRAY_PCT, self.1)
    }

    /// Checks whether the table is a subset of another, i.e., `other`
    /// allows at least all the byte patterns allowed by `self`.
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & other.0 == self.0 && self.1 & other.1 == self.1
    }

    #[inline]
    pub(crate) const fn allows_ascii(self, x: u8) -> bool {
        let table = if x < 64 {
            self.0 & MASK_UNENCODED_ASCII
        } else if x < 128 {
            self.1
        } else {
            0
        };
        table & 1u64.wrapping_shl(x as u32) != 0
    }

    /// Checks whether the given unencoded character is allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows(self, ch: char) -> bool {
        ch.is_ascii() && self.allows_ascii(ch as u8)
    }

    /// Checks whether percent-encoded octets are allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows_pct_encoded(self) -> bool {
        self.0 & MASK_PCT_ENCODED != 0
    }

    /// Checks whether stray percent characters are allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows_stray_pct(self) -> bool {
        self.0 & MASK_STRAY_PCT != 0
    }
}

const fn new(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

/// `ALPHA = %x41-5A / %x61-7A`
pub const ALPHA: Table = new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `DIGIT = %x30-39`
pub const DIGIT: Table = new(b"0123456789");

/// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`
pub const HEXDIG: Table = DIGIT.or(new(b"ABCDEFabcdef"));

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub const SCHEME: Table = ALPHA.or(DIGIT).or(new(b"+-."));

/// `userinfo = *( unreserved / pct-encoded / sub-delims / ":" )`
pub const USERINFO: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":")).or_pct_encoded();

/// `IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )`
pub const IPV_FUTURE: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":"));

/// `reg-name = *( unreserved / pct-encoded / sub-delims )`
pub const REG_NAME: Table = UNRESERVED.or(SUB_DELIMS).or_pct_encoded();

/// `port = *DIGIT`
pub const PORT: Table = DIGIT;

/// `path = *( pchar / "/" )`
pub const PATH: Table = PCHAR.or(new(b"/"));

/// `segment-nz-nc = 1*( unreserved / pct-encoded / sub-delims / "@" )`
pub const SEGMENT_NZ_NC: Table = UNRESERVED.or(SUB_DELIMS).or(new(b"@")).or_pct_encoded();

/// `pchar = unreserved / pct-encoded / sub-delims / ":" / "@"`
pub const PCHAR: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":@")).or_pct_encoded();

/// `query = *( pchar / "/" / "?" )`
pub const QUERY: Table = PCHAR.or(new(b"/?"));

/// `fragment = *( pchar / "/" / "?" )`
pub const FRAGMENT: Table = QUERY;

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub const UNRESERVED: Table = ALPHA.or(DIGIT).or(new(b"-._~"));

/// `reserved = gen-delims / sub-delims`
pub const RESERVED: Table = GEN_DELIMS.or(SUB_DELIMS);

/// `gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"`
pub const GEN_DELIMS: Table = new(b":/?#[]@");

/// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")"
///             / "*" / "+" / "," / ";" / "="`
pub const SUB_DELIMS: Table = new(b"!$&'()*+,;=");

// Relaxed rules for real-world input.

/// Printable ASCII characters outside of RFC 3986 that commonly appear
/// unescaped in the wild: `"[" / "]" / "|" / "{" / "}" / "^" / "`" / "\" / DQUOTE / "<" / ">"`.
///
/// The brackets are gen-delims, but only have a meaning within the authority.
pub const LENIENT_EXTRA: Table = new(b"[]|{}^`\\\"<>");

/// [`PATH`] plus [`LENIENT_EXTRA`] and stray percent characters.
pub const LENIENT_PATH: Table = PATH.or(LENIENT_EXTRA).or_stray_pct();

/// [`SEGMENT_NZ_NC`] plus [`LENIENT_EXTRA`] and stray percent characters.
pub const LENIENT_SEGMENT_NZ_NC: Table = SEGMENT_NZ_NC.or(LENIENT_EXTRA).or_stray_pct();

/// [`QUERY`] plus [`LENIENT_EXTRA`] and stray percent characters.
pub const LENIENT_QUERY: Table = QUERY.or(LENIENT_EXTRA).or_stray_pct();

/// [`FRAGMENT`] plus [`LENIENT_EXTRA`] and stray percent characters.
pub const LENIENT_FRAGMENT: Table = LENIENT_QUERY;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_tables_extend_strict_ones() {
        assert!(PATH.is_subset(LENIENT_PATH));
        assert!(SEGMENT_NZ_NC.is_subset(LENIENT_SEGMENT_NZ_NC));
        assert!(QUERY.is_subset(LENIENT_QUERY));
        assert!(!LENIENT_PATH.is_subset(PATH));
    }

    #[test]
    fn membership() {
        assert!(SCHEME.allows('+'));
        assert!(!SCHEME.allows('%'));
        assert!(!REG_NAME.allows('['));
        assert!(LENIENT_QUERY.allows('|'));
        assert!(!LENIENT_QUERY.allows('#'));
        assert!(!LENIENT_QUERY.allows(' '));
        assert!(!LENIENT_PATH.allows('é'));
        assert!(!LENIENT_PATH.allows('%'));
        assert!(LENIENT_PATH.allows_stray_pct());
        assert!(!PATH.allows_stray_pct());
        assert!(PATH.allows_pct_encoded());
        assert!(!IPV_FUTURE.allows_pct_encoded());
        assert!(UNRESERVED.allows('~'));
        assert!(!UNRESERVED.allows('!'));
        assert!(RESERVED.allows('!') && RESERVED.allows('#'));
        assert!(HEXDIG.allows('f') && !HEXDIG.allows('g'));
    }
}
