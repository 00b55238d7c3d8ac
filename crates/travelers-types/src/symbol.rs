//! Single-character event symbols.
//!
//! Uppercase letters are live travelers, their lowercase twin marks the same
//! traveler's death or deadlock. Digits are live squatters. Three markers
//! complete the alphabet: `.` for a squatter leaving, `*` for a squatter
//! walking into a trap, `#` for a trap being (re)born.

/// The character printed in the last column of an event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(char);

impl Symbol {
    /// A squatter voluntarily leaving its cell.
    pub const VACATED: Self = Self('.');

    /// A squatter's fatal attempt to enter a trap.
    pub const TRAP_ENTRY: Self = Self('*');

    /// A trap cell's birth or rebirth.
    pub const TRAP: Self = Self('#');

    /// Symbol of the traveler with the given 1-based number (`A`..=`Z`, cycling).
    pub fn traveler(number: u32) -> Self {
        let offset = number.saturating_sub(1).checked_rem(26).unwrap_or(0);
        Self(char::from_u32(u32::from(b'A').saturating_add(offset)).unwrap_or('A'))
    }

    /// Symbol of the squatter with the given 0-based index (`0`..=`9`, cycling).
    pub fn squatter(index: u32) -> Self {
        let offset = index.checked_rem(10).unwrap_or(0);
        Self(char::from_u32(u32::from(b'0').saturating_add(offset)).unwrap_or('0'))
    }

    /// The death form of a live traveler symbol (its lowercase letter).
    ///
    /// Anything that is not an uppercase letter is returned unchanged.
    pub const fn to_death(self) -> Self {
        Self(self.0.to_ascii_lowercase())
    }

    /// The underlying character.
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl core::fmt::Display for Symbol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
