//! Decimal amounts carried as JSON strings.
//!
//! Amounts travel as decimal strings (`"0.001234"`), never as JSON numbers,
//! so no precision is lost to binary floating point on either end.
//!
//! Decoding is deliberately lenient: a string that does not parse as a
//! decimal decodes to zero instead of failing the whole message. Numeric JSON
//! literals are accepted as well, since older merchants sent ack amounts as
//! numbers.
//!
//! Use the submodules with `#[serde(with = "...")]`:
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Line {
//!     #[serde(with = "manta_wallet::amount::as_string")]
//!     amount: Decimal,
//! }
//!
//! let line: Line = serde_json::from_str(r#"{"amount": "1.50"}"#).unwrap();
//! assert_eq!(line.amount.to_string(), "1.50");
//! assert_eq!(serde_json::to_string(&line).unwrap(), r#"{"amount":"1.50"}"#);
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Parse a decimal amount, falling back to zero when `text` is not a number.
///
/// Digit separators (`1_000`) are not part of the wire format.
pub fn parse_amount(text: &str) -> Decimal {
    let text = text.trim();
    if text.contains('_') {
        return Decimal::ZERO;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

/// Render an amount the way it goes on the wire.
pub fn format_amount(amount: &Decimal) -> String {
    amount.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Number(serde_json::Number),
}

impl AmountRepr {
    fn into_decimal(self) -> Decimal {
        match self {
            AmountRepr::Text(text) => parse_amount(&text),
            AmountRepr::Number(number) => parse_amount(&number.to_string()),
        }
    }
}

/// `serde(with)` adapter for a required amount.
pub mod as_string {
    use super::{format_amount, AmountRepr};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        amount: &Decimal,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_amount(amount))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Decimal, D::Error> {
        AmountRepr::deserialize(deserializer).map(AmountRepr::into_decimal)
    }
}

/// `serde(with)` adapter for an optional amount. Combine with
/// `#[serde(default)]` so a missing field decodes to `None`.
pub mod option_as_string {
    use super::{format_amount, AmountRepr};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        amount: &Option<Decimal>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match amount {
            Some(amount) => serializer.serialize_some(&format_amount(amount)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Decimal>, D::Error> {
        Option::<AmountRepr>::deserialize(deserializer)
            .map(|amount| amount.map(AmountRepr::into_decimal))
    }
}
