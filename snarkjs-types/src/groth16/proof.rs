//! This module defines the [`Proof`] struct matching the `proof.json` snarkjs writes for Groth16.
use std::io::Read;

use ark_bn254::{Bn254, G1Affine, G2Affine};
use serde::{Deserialize, Serialize};

use crate::BN254_CURVE_NAME;

/// A Groth16 proof over BN254 in the layout snarkjs uses.
///
/// Can be converted to and from [`ark_groth16::Proof`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof element A (G1)
    #[serde(serialize_with = "crate::serde_compat::serialize_g1")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g1")]
    pub pi_a: G1Affine,
    /// Proof element B (G2)
    #[serde(serialize_with = "crate::serde_compat::serialize_g2")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g2")]
    pub pi_b: G2Affine,
    /// Proof element C (G1)
    #[serde(serialize_with = "crate::serde_compat::serialize_g1")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g1")]
    pub pi_c: G1Affine,
    /// Proof protocol, always `groth16`
    pub protocol: String,
    /// Curve name as written by snarkjs
    pub curve: String,
}

impl Proof {
    /// Deserializes a [`Proof`] from a reader over `proof.json`.
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl From<ark_groth16::Proof<Bn254>> for Proof {
    fn from(proof: ark_groth16::Proof<Bn254>) -> Self {
        Self {
            pi_a: proof.a,
            pi_b: proof.b,
            pi_c: proof.c,
            protocol: "groth16".to_owned(),
            curve: BN254_CURVE_NAME.to_owned(),
        }
    }
}

impl From<Proof> for ark_groth16::Proof<Bn254> {
    fn from(proof: Proof) -> Self {
        Self {
            a: proof.pi_a,
            b: proof.pi_b,
            c: proof.pi_c,
        }
    }
}
