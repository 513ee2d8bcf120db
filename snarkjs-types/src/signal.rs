//! Tagged representation of the loosely typed values snarkjs exchanges.
//!
//! snarkjs writes integers as strings so they survive JSON. Whether a string is an integer is
//! decided once, when a [`serde_json::Value`] enters [`SignalValue`]; after that every
//! conversion rule is an exhaustive `match`.
use std::{collections::BTreeMap, fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Errors produced when constructing [`DecimalString`] or [`HexString`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalParseError {
    /// The text is not one or more ASCII digits.
    #[error("expected a decimal number but got {0:?}")]
    NotDecimal(String),
    /// The text is not `0x` followed by one or more hex digits.
    #[error("expected a 0x-prefixed hex number but got {0:?}")]
    NotHex(String),
}

/// A non-negative integer written as plain decimal digits, e.g. `"6"`.
///
/// Keeps the original text next to the exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalString {
    text: String,
    value: BigUint,
}

/// A non-negative integer written as `0x` followed by hex digits, e.g. `"0x1f"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexString {
    text: String,
    value: BigUint,
}

/// A value that is neither an integer encoding, a sequence nor a mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A JSON boolean.
    Bool(bool),
    /// A native JSON number. Passed through untouched, it is never widened.
    Number(serde_json::Number),
    /// A string that does not encode an integer, e.g. `"groth16"`.
    Text(String),
}

/// A value as produced by an external prover, before or after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Decimal-encoded integer.
    Decimal(DecimalString),
    /// Hex-encoded integer.
    Hex(HexString),
    /// Exact integer. The only integer variant left after [`SignalValue::normalize`].
    Integer(BigUint),
    /// Ordered sequence.
    Sequence(Vec<SignalValue>),
    /// Keyed mapping.
    Mapping(BTreeMap<String, SignalValue>),
    /// Anything else.
    Scalar(Scalar),
    /// JSON `null`.
    Null,
}

impl DecimalString {
    /// The text as it was written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The exact value.
    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

impl FromStr for DecimalString {
    type Err = SignalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SignalParseError::NotDecimal(s.to_owned()));
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| SignalParseError::NotDecimal(s.to_owned()))?;
        Ok(Self {
            text: s.to_owned(),
            value,
        })
    }
}

impl From<BigUint> for DecimalString {
    fn from(value: BigUint) -> Self {
        Self {
            text: value.to_str_radix(10),
            value,
        }
    }
}

impl From<u64> for DecimalString {
    fn from(value: u64) -> Self {
        Self::from(BigUint::from(value))
    }
}

impl fmt::Display for DecimalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for DecimalString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for DecimalString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

impl HexString {
    /// The text as it was written, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The exact value.
    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

impl FromStr for HexString {
    type Err = SignalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| SignalParseError::NotHex(s.to_owned()))?;
        let value = BigUint::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| SignalParseError::NotHex(s.to_owned()))?;
        Ok(Self {
            text: s.to_owned(),
            value,
        })
    }
}

impl fmt::Display for HexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl SignalValue {
    /// Classifies a raw string: decimal digits become [`SignalValue::Decimal`], `0x`-prefixed hex
    /// digits become [`SignalValue::Hex`], everything else is kept as [`Scalar::Text`].
    pub fn classify(text: &str) -> Self {
        if let Ok(decimal) = text.parse::<DecimalString>() {
            Self::Decimal(decimal)
        } else if let Ok(hex) = text.parse::<HexString>() {
            Self::Hex(hex)
        } else {
            Self::Scalar(Scalar::Text(text.to_owned()))
        }
    }

    /// Converts every integer encoding into an exact [`SignalValue::Integer`].
    ///
    /// Sequences keep their length and order, mappings keep their keys, all other values are
    /// returned unchanged. `normalize(normalize(v)) == normalize(v)` for every `v`.
    pub fn normalize(&self) -> SignalValue {
        match self {
            Self::Decimal(decimal) => Self::Integer(decimal.value().clone()),
            Self::Hex(hex) => Self::Integer(hex.value().clone()),
            Self::Sequence(items) => Self::Sequence(items.iter().map(Self::normalize).collect()),
            Self::Mapping(entries) => Self::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.normalize()))
                    .collect(),
            ),
            Self::Integer(_) | Self::Scalar(_) | Self::Null => self.clone(),
        }
    }

    /// Returns `true` if no decimal or hex encoding is left anywhere in the value.
    pub fn is_normalized(&self) -> bool {
        match self {
            Self::Decimal(_) | Self::Hex(_) => false,
            Self::Sequence(items) => items.iter().all(Self::is_normalized),
            Self::Mapping(entries) => entries.values().all(Self::is_normalized),
            Self::Integer(_) | Self::Scalar(_) | Self::Null => true,
        }
    }

    /// The exact integer this value denotes, if it is an integer in any encoding.
    pub fn as_integer(&self) -> Option<&BigUint> {
        match self {
            Self::Integer(value) => Some(value),
            Self::Decimal(decimal) => Some(decimal.value()),
            Self::Hex(hex) => Some(hex.value()),
            _ => None,
        }
    }

    /// The elements of a sequence.
    pub fn as_sequence(&self) -> Option<&[SignalValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up `key` in a mapping.
    pub fn get(&self, key: &str) -> Option<&SignalValue> {
        match self {
            Self::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Looks up `index` in a sequence.
    pub fn at(&self, index: usize) -> Option<&SignalValue> {
        self.as_sequence().and_then(|items| items.get(index))
    }
}

impl From<serde_json::Value> for SignalValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::classify(&s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<BigUint> for SignalValue {
    fn from(value: BigUint) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<SignalValue>> for SignalValue {
    fn from(items: Vec<SignalValue>) -> Self {
        Self::Sequence(items)
    }
}

impl Serialize for SignalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Decimal(decimal) => serializer.serialize_str(decimal.as_str()),
            Self::Hex(hex) => serializer.serialize_str(hex.as_str()),
            Self::Integer(value) => serializer.serialize_str(&value.to_str_radix(10)),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(entries) => serializer.collect_map(entries),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            Self::Scalar(Scalar::Text(s)) => serializer.serialize_str(s),
            Self::Null => serializer.serialize_unit(),
        }
    }
}
