//! Amounts, timestamps and signature material

use crate::errors::TallyError;
use crate::identifiers::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimals carried by token amounts
pub const TOKEN_DECIMALS: u32 = 18;

/// Basis-point denominator (100% = 10 000 bps)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Token amount in the smallest unit (18 decimals).
///
/// Arithmetic is checked; overflow surfaces as `None` and callers turn it
/// into [`TallyError::Internal`]. Serializes as a decimal token string
/// (`"9.5"`) so TOML configuration can express amounts above `i64::MAX`
/// units.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// Zero amount
    pub const ZERO: TokenAmount = TokenAmount(0);
    /// One whole token
    pub const ONE_TOKEN: TokenAmount = TokenAmount(10u128.pow(TOKEN_DECIMALS));

    /// Amount from smallest units
    pub const fn from_units(units: u128) -> Self {
        TokenAmount(units)
    }

    /// Amount from whole tokens, `None` on overflow
    pub fn from_tokens(tokens: u128) -> Option<Self> {
        tokens.checked_mul(Self::ONE_TOKEN.0).map(TokenAmount)
    }

    /// Smallest units
    pub const fn units(self) -> u128 {
        self.0
    }

    /// True for the zero amount
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, rhs: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(rhs.0).map(TokenAmount)
    }

    /// Checked subtraction
    pub fn checked_sub(self, rhs: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(rhs.0).map(TokenAmount)
    }

    /// Addition clamped at the largest representable amount
    pub fn saturating_add(self, rhs: TokenAmount) -> TokenAmount {
        TokenAmount(self.0.saturating_add(rhs.0))
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(self, rhs: TokenAmount) -> TokenAmount {
        TokenAmount(self.0.saturating_sub(rhs.0))
    }

    /// Checked multiplication by an integer factor
    pub fn checked_mul(self, factor: u128) -> Option<TokenAmount> {
        self.0.checked_mul(factor).map(TokenAmount)
    }

    /// `floor(self * bps / 10 000)`, exact for any amount when
    /// `bps <= 10 000`
    pub fn mul_bps(self, bps: u32) -> Option<TokenAmount> {
        let bps = u128::from(bps);
        let whole = (self.0 / BPS_DENOMINATOR).checked_mul(bps)?;
        let part = (self.0 % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR;
        whole.checked_add(part).map(TokenAmount)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::ONE_TOKEN.0;
        let frac = self.0 % Self::ONE_TOKEN.0;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenAmount({self})")
    }
}

impl FromStr for TokenAmount {
    type Err = TallyError;

    /// Parse a decimal token amount such as `"5"` or `"0.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || TallyError::invalid_amount(format!("not a token amount: {s:?}"));
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(bad());
        }
        if frac.len() > TOKEN_DECIMALS as usize
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(bad());
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| bad())?
        };
        let frac_units: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<18}");
            padded.parse().map_err(|_| bad())?
        };
        whole
            .checked_mul(Self::ONE_TOKEN.0)
            .and_then(|w| w.checked_add(frac_units))
            .map(TokenAmount)
            .ok_or_else(bad)
    }
}

impl TryFrom<String> for TokenAmount {
    type Error = TallyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenAmount> for String {
    fn from(value: TokenAmount) -> Self {
        value.to_string()
    }
}

/// Whole seconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Seconds since the epoch
    pub const fn secs(self) -> u64 {
        self.0
    }

    /// Timestamp `secs` later, saturating
    pub fn saturating_add(self, secs: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Ed25519 public key bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyBytes(pub [u8; 32]);

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyBytes({})", hex::encode(self.0))
    }
}

/// Ed25519 signature bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureBytes(pub [u8; 64]);

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureBytes({})", hex::encode(self.0))
    }
}

/// One owner's signature over a signed hash, together with the key that
/// produced it. The signer's address is derived from the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignerSignature {
    /// Key that produced `signature`
    pub public_key: PublicKeyBytes,
    /// Signature over the signed hash
    pub signature: SignatureBytes,
}

impl SignerSignature {
    /// Pair a public key with its signature
    pub fn new(public_key: PublicKeyBytes, signature: SignatureBytes) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    /// Address controlled by `public_key`
    pub fn signer(&self) -> Address {
        Address::from_public_key(&self.public_key.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TokenAmount {
        s.parse().unwrap_or(TokenAmount::ZERO)
    }

    #[test]
    fn test_decimal_parse_and_display() {
        assert_eq!(parse("5"), TokenAmount::from_units(5 * 10u128.pow(18)));
        assert_eq!(parse("9.5").to_string(), "9.5");
        assert_eq!(parse("0.5").units(), 5 * 10u128.pow(17));
        assert_eq!(parse("4.275").to_string(), "4.275");
        assert_eq!(TokenAmount::from_units(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_decimal_parse_rejects_garbage() {
        assert!("".parse::<TokenAmount>().is_err());
        assert!("1.2.3".parse::<TokenAmount>().is_err());
        assert!("-1".parse::<TokenAmount>().is_err());
        assert!("0.0000000000000000001".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn test_saturating_add_clamps() {
        let max = TokenAmount::from_units(u128::MAX);
        assert_eq!(max.saturating_add(TokenAmount::ONE_TOKEN), max);
        assert_eq!(
            TokenAmount::ONE_TOKEN.saturating_add(TokenAmount::ONE_TOKEN),
            TokenAmount::from_units(2 * TokenAmount::ONE_TOKEN.units())
        );
    }

    #[test]
    fn test_mul_bps_floors() {
        let hundred = TokenAmount::from_tokens(100).unwrap_or_default();
        assert_eq!(hundred.mul_bps(500), TokenAmount::from_tokens(5));
        assert_eq!(TokenAmount::from_units(19).mul_bps(500), Some(TokenAmount::ZERO));
        assert_eq!(
            TokenAmount::from_units(u128::MAX).mul_bps(10_000),
            Some(TokenAmount::from_units(u128::MAX))
        );
        assert_eq!(TokenAmount::from_units(u128::MAX).mul_bps(u32::MAX), None);
    }

    #[test]
    fn test_amount_serde_is_decimal_string() {
        let json = serde_json::to_string(&parse("0.5")).unwrap_or_default();
        assert_eq!(json, "\"0.5\"");
    }
}
