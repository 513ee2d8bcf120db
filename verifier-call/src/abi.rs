//! ABI bindings of the two `verifyProof` entry points.
use alloy_sol_types::SolCall;

use crate::{CallArgs, VerifierError};

#[allow(missing_docs)]
pub mod groth16 {
    alloy_sol_types::sol! {
        function verifyProof(
            uint256[2] a,
            uint256[2][2] b,
            uint256[2] c,
            uint256[] input
        ) external view returns (bool);
    }
}

#[allow(missing_docs)]
pub mod plonk {
    alloy_sol_types::sol! {
        function verifyProof(bytes proof, uint256[] input) external view returns (bool);
    }
}

/// ABI-encodes a `verifyProof` call, selector included.
pub fn encode_verify_call(args: &CallArgs) -> Vec<u8> {
    match args {
        CallArgs::Groth16(args) => groth16::verifyProofCall {
            a: args.a,
            b: args.b,
            c: args.c,
            input: args.input.clone(),
        }
        .abi_encode(),
        CallArgs::Plonk(args) => plonk::verifyProofCall {
            proof: args.proof.clone(),
            input: args.input.clone(),
        }
        .abi_encode(),
    }
}

/// Decodes the single `bool` a `verifyProof` call returns.
///
/// Both entry points return the same word, so the Groth16 binding decodes either. Dirty padding,
/// values other than `0` and `1`, and trailing bytes are rejected.
pub fn decode_verify_result(data: &[u8]) -> Result<bool, VerifierError> {
    if data.len() != 32 {
        return Err(VerifierError::Decode(hex::encode(data)));
    }
    groth16::verifyProofCall::abi_decode_returns_validate(data)
        .map_err(|_| VerifierError::Decode(hex::encode(data)))
}
