//! # Verifier calls
//!
//! A crate for turning snarkjs proofs into calldata for the `verifyProof` entry points of
//! generated Groth16 and PLONK verifier contracts, and for invoking those entry points.
//!
//! The data flow mirrors the way the proofs are used from a test harness:
//! normalized proof and public signals → [`export_solidity_calldata`] → calldata string →
//! [`to_calldata_args`] → [`CallArgs`] → [`VerifierContract::verify`] → `bool`.
//!
//! ## Example usage
//! ```rust,no_run
//! # async fn run() -> eyre::Result<()> {
//! # let proof_json: serde_json::Value = todo!();
//! # let public_json: serde_json::Value = todo!();
//! use snarkjs_types::{ProofScheme, SignalValue};
//! use verifier_call::{RpcDeployer, VerifierContract};
//!
//! let proof = SignalValue::from(proof_json).normalize();
//! let public_signals = SignalValue::from(public_json).normalize();
//! let calldata =
//!     verifier_call::export_solidity_calldata(ProofScheme::Groth16, &proof, &public_signals)?;
//! let args = verifier_call::to_calldata_args(&calldata, ProofScheme::Groth16)?;
//!
//! let deployer = RpcDeployer::new("http://127.0.0.1:8545", "artifacts/contracts")?;
//! let verifier = deployer.deploy("HelloWorldVerifier", ProofScheme::Groth16).await?;
//! assert!(verifier.verify(&args).await?);
//! # Ok(())
//! # }
//! ```
//! ## Preparing proofs
//! Arguments can also be built directly from an arkworks proof:
//! ```rust,no_run
//! # fn load_proof() -> ark_groth16::Proof<ark_bn254::Bn254> { todo!() }
//! let proof: ark_groth16::Proof<ark_bn254::Bn254> = load_proof();
//! let uncompressed_proof = verifier_call::prepare_uncompressed_proof(&proof);
//! let args = verifier_call::Groth16CallArgs::from_proof(&proof, &[ark_bn254::Fr::from(2u64)]);
//! ```
#![deny(missing_docs)]

use alloy_primitives::U256;
use ark_ec::AffineRepr;
use ark_groth16::Proof;

pub mod abi;
mod calldata;
mod contract;
mod native;
mod rpc;

pub use calldata::{
    CallArgs, CalldataError, Groth16CallArgs, PlonkCallArgs, export_solidity_calldata,
    to_calldata_args,
};
pub use contract::{VerifierContract, VerifierError};
pub use native::NativeGroth16Verifier;
pub use rpc::{RpcClient, RpcDeployer, RpcVerifier};

/// Prepare an uncompressed Groth16 proof for verification in the generated contract.
/// The proof is represented as an array of 8 U256 values, corresponding to the
/// x and y coordinates of the points A, B, and C in the proof.
///
/// The coordinates of B are in the order the EVM pairing precompile expects them, i.e. the
/// imaginary part `c1` before the real part `c0`.
pub fn prepare_uncompressed_proof(proof: &Proof<ark_bn254::Bn254>) -> [U256; 8] {
    // Infinity is represented as (0, 0)
    let (ax, ay) = proof.a.xy().unwrap_or_default();
    // Infinity is represented as (0, 0, 0, 0)
    let (bx, by) = proof.b.xy().unwrap_or_default();
    // Infinity is represented as (0, 0)
    let (cx, cy) = proof.c.xy().unwrap_or_default();

    [
        ax.into(),
        ay.into(),
        bx.c1.into(),
        bx.c0.into(),
        by.c1.into(),
        by.c0.into(),
        cx.into(),
        cy.into(),
    ]
}

#[cfg(test)]
pub(crate) mod test_utils {
    //! A `c = a * b` circuit with one public output, proven with arkworks.
    use ark_bn254::{Bn254, Fr};
    use ark_groth16::{Groth16, Proof, VerifyingKey};
    use ark_relations::r1cs::{
        ConstraintSynthesizer, ConstraintSystemRef, LinearCombination, SynthesisError,
    };

    #[derive(Clone)]
    pub(crate) struct MultiplyCircuit {
        pub a: Option<Fr>,
        pub b: Option<Fr>,
    }

    impl ConstraintSynthesizer<Fr> for MultiplyCircuit {
        fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
            let a = cs.new_witness_variable(|| self.a.ok_or(SynthesisError::AssignmentMissing))?;
            let b = cs.new_witness_variable(|| self.b.ok_or(SynthesisError::AssignmentMissing))?;
            let c = cs.new_input_variable(|| {
                let a = self.a.ok_or(SynthesisError::AssignmentMissing)?;
                let b = self.b.ok_or(SynthesisError::AssignmentMissing)?;
                Ok(a * b)
            })?;
            cs.enforce_constraint(
                LinearCombination::from(a),
                LinearCombination::from(b),
                LinearCombination::from(c),
            )?;
            Ok(())
        }
    }

    /// Returns a verifying key and a proof of `a * b` with public output `a * b`.
    pub(crate) fn prove_multiply(a: u64, b: u64) -> (VerifyingKey<Bn254>, Proof<Bn254>, Fr) {
        let mut rng = ark_std::test_rng();
        let pk = Groth16::<Bn254>::generate_random_parameters_with_reduction(
            MultiplyCircuit { a: None, b: None },
            &mut rng,
        )
        .unwrap();
        let (a, b) = (Fr::from(a), Fr::from(b));
        let proof = Groth16::<Bn254>::create_random_proof_with_reduction(
            MultiplyCircuit {
                a: Some(a),
                b: Some(b),
            },
            &pk,
            &mut rng,
        )
        .unwrap();
        (pk.vk, proof, a * b)
    }
}
