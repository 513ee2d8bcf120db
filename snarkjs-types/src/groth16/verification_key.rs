//! This module defines the [`VerificationKey`] struct matching the `verification_key.json` snarkjs exports for Groth16.
use std::io::Read;

use ark_bn254::{Bn254, G1Affine, G2Affine};
use serde::{Deserialize, Serialize};

use crate::BN254_CURVE_NAME;

/// A Groth16 verification key over BN254 in the layout snarkjs uses.
///
/// The precomputed `vk_alphabeta_12` of the snarkjs file is ignored on read and not written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    /// Proof protocol, always `groth16`
    pub protocol: String,
    /// Curve name as written by snarkjs
    pub curve: String,
    /// Number of public signals
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    /// alpha in G1
    #[serde(serialize_with = "crate::serde_compat::serialize_g1")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g1")]
    pub vk_alpha_1: G1Affine,
    /// beta in G2
    #[serde(serialize_with = "crate::serde_compat::serialize_g2")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g2")]
    pub vk_beta_2: G2Affine,
    /// gamma in G2
    #[serde(serialize_with = "crate::serde_compat::serialize_g2")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g2")]
    pub vk_gamma_2: G2Affine,
    /// delta in G2
    #[serde(serialize_with = "crate::serde_compat::serialize_g2")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g2")]
    pub vk_delta_2: G2Affine,
    /// Input commitments, one more than there are public signals
    #[serde(rename = "IC")]
    #[serde(serialize_with = "crate::serde_compat::serialize_g1_seq")]
    #[serde(deserialize_with = "crate::serde_compat::deserialize_g1_seq")]
    pub ic: Vec<G1Affine>,
}

impl VerificationKey {
    /// Deserializes a [`VerificationKey`] from a reader over `verification_key.json`.
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl From<VerificationKey> for ark_groth16::VerifyingKey<Bn254> {
    fn from(vk: VerificationKey) -> Self {
        Self {
            alpha_g1: vk.vk_alpha_1,
            beta_g2: vk.vk_beta_2,
            gamma_g2: vk.vk_gamma_2,
            delta_g2: vk.vk_delta_2,
            gamma_abc_g1: vk.ic,
        }
    }
}

impl From<ark_groth16::VerifyingKey<Bn254>> for VerificationKey {
    fn from(vk: ark_groth16::VerifyingKey<Bn254>) -> Self {
        Self {
            protocol: "groth16".to_owned(),
            curve: BN254_CURVE_NAME.to_owned(),
            n_public: vk.gamma_abc_g1.len().saturating_sub(1),
            vk_alpha_1: vk.alpha_g1,
            vk_beta_2: vk.beta_g2,
            vk_gamma_2: vk.gamma_g2,
            vk_delta_2: vk.delta_g2,
            ic: vk.gamma_abc_g1,
        }
    }
}

#[cfg(test)]
mod tests {
    use ark_bn254::{Fr, G1Affine, G1Projective, G2Projective};
    use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};

    use super::VerificationKey;

    fn sample_vk() -> ark_groth16::VerifyingKey<ark_bn254::Bn254> {
        let g1 = |k: u64| (G1Projective::generator() * Fr::from(k)).into_affine();
        let g2 = |k: u64| (G2Projective::generator() * Fr::from(k)).into_affine();
        ark_groth16::VerifyingKey {
            alpha_g1: g1(2),
            beta_g2: g2(3),
            gamma_g2: g2(5),
            delta_g2: g2(7),
            gamma_abc_g1: vec![g1(11), g1(13)],
        }
    }

    #[test]
    fn can_serde_vk() {
        let vk = VerificationKey::from(sample_vk());
        assert_eq!(vk.n_public, 1);
        let ser = serde_json::to_string(&vk).unwrap();
        let der = VerificationKey::from_reader(ser.as_bytes()).unwrap();
        assert_eq!(der, vk);
        assert_eq!(ark_groth16::VerifyingKey::from(der), sample_vk());
    }

    #[test]
    fn ignores_precomputed_pairing() {
        let mut json = serde_json::to_value(VerificationKey::from(sample_vk())).unwrap();
        assert_eq!(json["IC"][0].as_array().unwrap().len(), 3);
        json["vk_alphabeta_12"] = serde_json::json!([[["1", "2"]]]);
        let der = serde_json::from_value::<VerificationKey>(json).unwrap();
        assert_eq!(der.ic.len(), 2);
        assert_ne!(der.ic[0], G1Affine::zero());
    }
}
