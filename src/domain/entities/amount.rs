use serde::{Deserialize, Serialize};
use std::fmt;

/// Money amount in the provider's wire shape: an ISO currency code and a
/// decimal string with up to two fraction digits ("19.99").
///
/// Arithmetic happens in integer minor units (cents); the string form is
/// kept verbatim so nothing is lost between the provider and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: String,
    pub value: String,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: impl Into<String>) -> Self {
        Amount {
            currency: currency.into(),
            value: value.into(),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Amount::new(currency, "0.00")
    }

    pub fn from_minor_units(currency: &str, cents: i64) -> Self {
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        Amount::new(currency, format!("{}{}.{:02}", sign, abs / 100, abs % 100))
    }

    /// Parse the decimal value into integer minor units.
    ///
    /// Rejects anything that is not a plain signed decimal with at most two
    /// fraction digits; the provider guarantees two but ledger-sourced
    /// values are validated the same way.
    pub fn minor_units(&self) -> Result<i64, String> {
        let malformed = || format!("Malformed amount value: {}", self.value);

        let raw = self.value.trim();
        let (negative, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let whole: i64 = whole.parse().map_err(|_| malformed())?;
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| malformed())? * 10,
            _ => frac.parse::<i64>().map_err(|_| malformed())?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(|| format!("Amount out of range: {}", self.value))?;

        Ok(if negative { -cents } else { cents })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}
