//! In-process counterpart of a generated BN254 Groth16 verifier contract.
use std::io::Read;

use alloy_primitives::U256;
use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInt, PrimeField};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use snarkjs_types::{ProofScheme, groth16::VerificationKey};

use crate::{CallArgs, Groth16CallArgs, VerifierContract, VerifierError};

/// Answers `verifyProof(a, b, c, input)` the way the deployed Groth16 verifier does, without a
/// chain.
///
/// Every malformed argument yields `false`: coordinates outside the base field, points that
/// are not on the curve or not in the prime-order subgroup, public signals outside the scalar
/// field and a wrong number of public signals. `(0, 0)` encodes the point at infinity.
pub struct NativeGroth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl NativeGroth16Verifier {
    /// Creates a verifier for `vk`.
    pub fn new(vk: &VerifyingKey<Bn254>) -> Self {
        Self {
            pvk: PreparedVerifyingKey::from(vk.clone()),
        }
    }

    /// Creates a verifier from a snarkjs `verification_key.json`.
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        let vk = VerificationKey::from_reader(reader)?;
        Ok(Self::new(&vk.into()))
    }

    /// The number of public signals the verifier expects.
    pub fn num_public_inputs(&self) -> usize {
        self.pvk.vk.gamma_abc_g1.len().saturating_sub(1)
    }

    /// Checks `args` and returns whether the proof verifies.
    pub fn check(&self, args: &Groth16CallArgs) -> bool {
        let Some(proof) = proof_from_args(args) else {
            tracing::debug!("proof points are not valid BN254 points");
            return false;
        };
        let Some(inputs) = args
            .input
            .iter()
            .map(field_from_u256::<Fr>)
            .collect::<Option<Vec<_>>>()
        else {
            tracing::debug!("public signal is not in the scalar field");
            return false;
        };
        if inputs.len() != self.num_public_inputs() {
            tracing::debug!(
                "expected {} public signals but got {}",
                self.num_public_inputs(),
                inputs.len()
            );
            return false;
        }
        Groth16::<Bn254>::verify_proof(&self.pvk, &proof, &inputs).unwrap_or(false)
    }
}

impl VerifierContract for NativeGroth16Verifier {
    fn scheme(&self) -> ProofScheme {
        ProofScheme::Groth16
    }

    async fn verify(&self, args: &CallArgs) -> Result<bool, VerifierError> {
        match args {
            CallArgs::Groth16(args) => Ok(self.check(args)),
            CallArgs::Plonk(_) => Err(VerifierError::SchemeMismatch {
                expected: ProofScheme::Groth16,
                actual: ProofScheme::Plonk,
            }),
        }
    }
}

fn field_from_u256<F: PrimeField<BigInt = BigInt<4>>>(value: &U256) -> Option<F> {
    F::from_bigint(BigInt(value.into_limbs()))
}

fn g1_from_coordinates(x: &U256, y: &U256) -> Option<G1Affine> {
    if x.is_zero() && y.is_zero() {
        return Some(G1Affine::zero());
    }
    let p = G1Affine::new_unchecked(field_from_u256::<Fq>(x)?, field_from_u256::<Fq>(y)?);
    (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve()).then_some(p)
}

fn g2_from_coordinates(b: &[[U256; 2]; 2]) -> Option<G2Affine> {
    let [[x1, x0], [y1, y0]] = b;
    if b.iter().flatten().all(U256::is_zero) {
        return Some(G2Affine::zero());
    }
    let x = Fq2::new(field_from_u256(x0)?, field_from_u256(x1)?);
    let y = Fq2::new(field_from_u256(y0)?, field_from_u256(y1)?);
    let p = G2Affine::new_unchecked(x, y);
    (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve()).then_some(p)
}

fn proof_from_args(args: &Groth16CallArgs) -> Option<Proof<Bn254>> {
    Some(Proof {
        a: g1_from_coordinates(&args.a[0], &args.a[1])?,
        b: g2_from_coordinates(&args.b)?,
        c: g1_from_coordinates(&args.c[0], &args.c[1])?,
    })
}
