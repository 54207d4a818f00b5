use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive, Decimal};

/// Decimals of SOL.
pub const LAMPORT_DECIMALS: u32 = 9;

/// A positive amount of SOL with at most [`LAMPORT_DECIMALS`] fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sol(Decimal);

impl fmt::Display for Sol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOL", self.0)
    }
}

impl FromStr for Sol {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str_exact(s.trim()).map_err(|_| {
            crate::Error::invalid_input(format!("`{s}` is not an exact decimal number"))
        })?;
        Self::new(amount)
    }
}

impl Sol {
    /// Create from a decimal amount.
    pub fn new(amount: Decimal) -> crate::Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(crate::Error::invalid_input(
                "amount must be greater than 0",
            ));
        }
        let amount = amount.normalize();
        if amount.scale() > LAMPORT_DECIMALS {
            return Err(crate::Error::invalid_input(format!(
                "amount has more than {LAMPORT_DECIMALS} decimal places"
            )));
        }
        Ok(Self(amount))
    }

    /// Returns the decimal amount.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Convert to lamports.
    pub fn to_lamports(&self) -> crate::Result<Lamport> {
        let lamports = self
            .0
            .checked_mul(Decimal::from(10u64.pow(LAMPORT_DECIMALS)))
            .and_then(|lamports| lamports.to_u64())
            .ok_or_else(|| crate::Error::invalid_input("amount is too large"))?;
        Ok(Lamport(lamports))
    }
}

/// Amount in lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Lamport(pub u64);

impl fmt::Display for Lamport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lamports", self.0)
    }
}

impl Lamport {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Returns the amount as `u64`.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Convert to SOL. Returns `None` for zero.
    pub fn to_sol(&self) -> Option<Sol> {
        let mut amount = Decimal::from(self.0);
        amount.set_scale(LAMPORT_DECIMALS).ok()?;
        Sol::new(amount).ok()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_sol() -> crate::Result<()> {
        assert_eq!("1.5".parse::<Sol>()?.to_lamports()?, Lamport(1_500_000_000));
        assert_eq!(" 2 ".parse::<Sol>()?.as_decimal(), dec!(2));
        assert_eq!(
            "0.000000001".parse::<Sol>()?.to_lamports()?,
            Lamport(1)
        );
        assert_eq!(
            "1.5000000000000".parse::<Sol>()?.to_lamports()?,
            Lamport(1_500_000_000)
        );
        Ok(())
    }

    #[test]
    fn reject_invalid_amounts() {
        for input in [
            "0",
            "-1",
            "abc",
            "",
            "0.0000000001",
            "NaN",
            "1.00000000000000000000000000001",
        ] {
            let err = input.parse::<Sol>().unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidInput, "{input}");
        }
    }

    #[test]
    fn reject_overflow() {
        let sol = Sol::new(Decimal::from(100_000_000_000u64)).unwrap();
        assert!(sol.to_lamports().is_err());
    }

    #[test]
    fn lamports_to_sol() {
        assert_eq!(
            Lamport(1_500_000_000).to_sol().map(|sol| sol.as_decimal()),
            Some(dec!(1.5))
        );
        assert!(Lamport::ZERO.to_sol().is_none());
    }
}
