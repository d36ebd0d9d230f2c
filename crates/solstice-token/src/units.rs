// crates/solstice-token/src/units.rs
//
// SLX denomination. The smallest unit of SLX is the "mote".
// 1 SLX = 10^9 motes. All internal accounting uses motes to avoid
// floating-point precision issues in settlement calculations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of motes in one SLX. 1 SLX = 10^9 motes.
pub const MOTE_PER_SLX: u128 = 1_000_000_000;

/// An SLX token amount.
///
/// Wraps an amount in motes (the smallest denomination).
/// All arithmetic is performed in integer motes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slx {
    /// Amount in motes (1 SLX = 10^9 motes).
    pub motes: u128,
}

impl Slx {
    /// Create an Slx amount from a whole-SLX value.
    pub fn from_slx(amount: u64) -> Self {
        Self {
            motes: amount as u128 * MOTE_PER_SLX,
        }
    }

    /// Create an Slx amount from a mote value.
    pub fn from_motes(motes: u128) -> Self {
        Self { motes }
    }

    /// Returns zero SLX.
    pub fn zero() -> Self {
        Self { motes: 0 }
    }
}

impl Add for Slx {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            motes: self.motes.saturating_add(rhs.motes),
        }
    }
}

impl Sub for Slx {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            motes: self.motes.saturating_sub(rhs.motes),
        }
    }
}

impl fmt::Display for Slx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.motes / MOTE_PER_SLX;
        let frac = self.motes % MOTE_PER_SLX;
        if frac == 0 {
            write!(f, "{} SLX", whole)
        } else {
            // Display up to 9 decimal places, trimming trailing zeros
            let frac_str = format!("{:09}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} SLX", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mote_per_slx() {
        assert_eq!(MOTE_PER_SLX, 1_000_000_000);
    }

    #[test]
    fn test_from_slx() {
        let amount = Slx::from_slx(2);
        assert_eq!(amount.motes, 2 * MOTE_PER_SLX);
    }

    #[test]
    fn test_add() {
        let a = Slx::from_slx(1);
        let b = Slx::from_motes(500_000_000);
        assert_eq!((a + b).motes, 1_500_000_000);
    }

    #[test]
    fn test_sub_saturating() {
        let a = Slx::from_slx(1);
        let b = Slx::from_slx(2);
        assert_eq!((a - b).motes, 0);
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(format!("{}", Slx::from_slx(42)), "42 SLX");
    }

    #[test]
    fn test_display_fractional() {
        assert_eq!(format!("{}", Slx::from_motes(1_500_000_000)), "1.5 SLX");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(format!("{}", Slx::zero()), "0 SLX");
    }
}
