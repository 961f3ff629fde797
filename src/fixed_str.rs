use std::fmt;

/// Fixed-capacity, `repr(C)` UTF-8 buffer.
///
/// `SharedState` and everything it owns must be pointer-free so the whole
/// graph can be mapped byte-for-byte into a second process; `String` and
/// `Vec<u8>` both carry a heap pointer that is meaningless across address
/// spaces, so every name and log line in the shared region uses this instead.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
    len: u8,
}

impl<const N: usize> FixedStr<N> {
    pub const EMPTY: Self = FixedStr {
        bytes: [0u8; N],
        len: 0,
    };

    /// Builds a `FixedStr`, silently truncating at a UTF-8 char boundary if
    /// `s` does not fit in `N` bytes.
    pub fn new(s: &str) -> Self {
        let mut bytes = [0u8; N];
        let mut end = s.len().min(N);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        bytes[..end].copy_from_slice(&s.as_bytes()[..end]);
        FixedStr {
            bytes,
            len: end as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<const N: usize> PartialEq for FixedStr<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
impl<const N: usize> Eq for FixedStr<N> {}

impl<const N: usize> PartialEq<&str> for FixedStr<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_strings() {
        let s: FixedStr<16> = FixedStr::new("bun_top");
        assert_eq!(s.as_str(), "bun_top");
        assert_eq!(s, "bun_top");
    }

    #[test]
    fn truncates_on_overflow_without_panicking() {
        let s: FixedStr<4> = FixedStr::new("bun_top");
        assert_eq!(s.as_str(), "bun_");
    }

    #[test]
    fn empty_is_empty() {
        let s: FixedStr<8> = FixedStr::EMPTY;
        assert!(s.is_empty());
    }
}
