use alloc::string::String;
use core::ops::Range;

/// A handle to a string allocated in an [`Arena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Span {
    start: u32,
    end: u32,
}

impl Span {
    pub(crate) fn range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub(crate) fn len(self) -> usize {
        (self.end - self.start) as usize
    }

    /// Returns the subspan `self[range]`.
    pub(crate) fn slice(self, range: Range<usize>) -> Span {
        debug_assert!(range.start <= range.end && range.end <= self.len());
        Span {
            start: self.start + range.start as u32,
            end: self.start + range.end as u32,
        }
    }
}

/// A bump allocator for component strings.
///
/// Strings are appended to a single buffer and never freed individually.
/// [`reset`](Self::reset) drops every allocation at once while keeping
/// the capacity for reuse.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    buf: String,
}

impl Arena {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            buf: String::with_capacity(cap),
        }
    }

    /// Copies a string into the arena.
    pub(crate) fn alloc(&mut self, s: &str) -> Span {
        let start = self.buf.len();
        self.buf.push_str(s);
        Span {
            start: offset(start),
            end: offset(self.buf.len()),
        }
    }

    /// Allocates a string written by `f` directly into the arena.
    pub(crate) fn alloc_with(&mut self, f: impl FnOnce(&mut String)) -> Span {
        let start = self.buf.len();
        f(&mut self.buf);
        debug_assert!(self.buf.len() >= start);
        Span {
            start: offset(start),
            end: offset(self.buf.len()),
        }
    }

    pub(crate) fn get(&self, span: Span) -> &str {
        &self.buf[span.range()]
    }

    pub(crate) fn reset(&mut self) {
        self.buf.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

fn offset(i: usize) -> u32 {
    match u32::try_from(i) {
        Ok(i) => i,
        Err(_) => len_overflow(),
    }
}

#[cold]
fn len_overflow() -> ! {
    panic!("arena length exceeds u32::MAX");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get() {
        let mut arena = Arena::default();
        let a = arena.alloc("http");
        let b = arena.alloc("example.com");
        assert_eq!(arena.get(a), "http");
        assert_eq!(arena.get(b), "example.com");
        assert_eq!(arena.get(b.slice(0..7)), "example");
        assert_eq!(arena.len(), 15);

        let c = arena.alloc_with(|buf| buf.push_str("/path"));
        assert_eq!(arena.get(c), "/path");
        assert_eq!(c.len(), 5);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut arena = Arena::with_capacity(64);
        arena.alloc("a string that takes some room");
        let cap = arena.capacity();
        arena.reset();
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.capacity(), cap);

        let span = arena.alloc("x");
        assert_eq!(arena.get(span), "x");
        assert_eq!(arena.capacity(), cap);
    }
}
