//! This module defines the [`PublicInput`] struct that allows loading public signals from the `public.json` written by snarkjs.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::SignalValue;

/// The public signals of a BN254 proof. Implements [`serde::Deserialize`] and [`serde::Serialize`] for loading/storing `public.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicInput(
    /// The values of the public input.
    #[serde(serialize_with = "crate::serde_compat::serialize_f_seq")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_f_seq")]
    pub Vec<Fr>,
);

impl PublicInput {
    /// Consumes `self` and returns the inner values.
    pub fn into_inner(self) -> Vec<Fr> {
        self.0
    }

    /// The signals as the untyped value a prover returns, one integer per signal.
    pub fn to_signal_value(&self) -> SignalValue {
        SignalValue::Sequence(
            self.0
                .iter()
                .map(|f| SignalValue::Integer((*f).into()))
                .collect(),
        )
    }
}

impl AsRef<[Fr]> for PublicInput {
    fn as_ref(&self) -> &[Fr] {
        &self.0
    }
}

impl From<Vec<Fr>> for PublicInput {
    fn from(values: Vec<Fr>) -> Self {
        Self(values)
    }
}
