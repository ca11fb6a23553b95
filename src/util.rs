//! Byte-sequence comparison from the right end.

/// Outcome of comparing two byte sequences from their right ends leftward.
///
/// This is the typed form of the classic integer code (see [`SuffixCmp::code`]):
/// `0` for equal sequences, a positive gap for a mismatch, and a negative gap
/// when the left side is strictly longer and ends with the right side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SuffixCmp {
    /// Both sequences are identical.
    Equal,
    /// `left` is strictly longer than `right` and ends with it.
    /// Carries `right.len() + 1`.
    Longer(usize),
    /// The sequences share `gap - 1` right-aligned bytes and then differ.
    /// When `left` is shorter and entirely a suffix of `right`, `gap` is
    /// `left.len() + 1`.
    Diverge(usize),
}

impl SuffixCmp {
    /// Integer encoding: `0`, `gap`, or `-gap` for [`SuffixCmp::Longer`].
    pub fn code(self) -> isize {
        match self {
            SuffixCmp::Equal => 0,
            SuffixCmp::Longer(gap) => -(gap as isize),
            SuffixCmp::Diverge(gap) => gap as isize,
        }
    }
}

/// Compares `left` against `right` starting at their last bytes.
pub(crate) fn suffix_cmp(left: &[u8], right: &[u8]) -> SuffixCmp {
    let shared = left
        .iter()
        .rev()
        .zip(right.iter().rev())
        .take_while(|(l, r)| l == r)
        .count();
    let min_len = left.len().min(right.len());

    if shared < min_len {
        return SuffixCmp::Diverge(shared + 1);
    }

    if left.len() < right.len() {
        SuffixCmp::Diverge(left.len() + 1)
    } else if left.len() == right.len() {
        SuffixCmp::Equal
    } else {
        SuffixCmp::Longer(right.len() + 1)
    }
}

/// Returns `true` if `key` ends with `suffix`.
#[inline]
pub(crate) fn has_suffix(key: &[u8], suffix: &[u8]) -> bool {
    key.len() >= suffix.len() && key[key.len() - suffix.len()..] == *suffix
}
