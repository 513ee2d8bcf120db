//! This module defines the [`Witness`] handed to an external prover as its `input.json`.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DecimalString;

/// Assignment of values to a circuit's named input signals.
///
/// Serializes to the snarkjs input format, e.g. `{"a":"1","b":"2"}`. Whether the values
/// satisfy the circuit is only known to the prover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Witness(BTreeMap<String, DecimalString>);

impl Witness {
    /// Creates an empty witness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Witness::insert`].
    pub fn with(mut self, signal: impl Into<String>, value: impl Into<DecimalString>) -> Self {
        self.insert(signal, value);
        self
    }

    /// Assigns `value` to `signal`, replacing any previous assignment.
    pub fn insert(&mut self, signal: impl Into<String>, value: impl Into<DecimalString>) {
        self.0.insert(signal.into(), value.into());
    }

    /// The value assigned to `signal`.
    pub fn get(&self, signal: &str) -> Option<&DecimalString> {
        self.0.get(signal)
    }

    /// Iterates over the assignments ordered by signal name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecimalString)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of assigned signals.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no signal is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<DecimalString>> FromIterator<(K, V)> for Witness {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut witness = Self::new();
        for (signal, value) in iter {
            witness.insert(signal, value);
        }
        witness
    }
}

#[cfg(test)]
mod tests {
    use super::Witness;

    #[test]
    fn serializes_as_snarkjs_input() {
        let witness = Witness::new().with("b", 2u64).with("a", 1u64);
        assert_eq!(
            serde_json::to_string(&witness).unwrap(),
            r#"{"a":"1","b":"2"}"#
        );
    }

    #[test]
    fn parses_snarkjs_input() {
        let witness: Witness = serde_json::from_str(r#"{"a":"1","b":"2","c":"3"}"#).unwrap();
        assert_eq!(witness.len(), 3);
        assert_eq!(witness.get("c").unwrap().as_str(), "3");
        assert!(serde_json::from_str::<Witness>(r#"{"a":1}"#).is_err());
        assert!(serde_json::from_str::<Witness>(r#"{"a":"x"}"#).is_err());
    }

    #[test]
    fn collects_from_pairs() {
        let witness: Witness = [("a", 1u64), ("b", 2u64), ("a", 5u64)].into_iter().collect();
        assert_eq!(witness.len(), 2);
        assert_eq!(witness.get("a").unwrap().as_str(), "5");
    }
}
