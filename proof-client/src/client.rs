use snarkjs_types::{SignalValue, Witness};
use tracing::instrument;
use verifier_call::{CallArgs, CalldataError, VerifierContract, VerifierError};

use crate::{
    artifacts::CircuitArtifacts,
    prover::{Prover, ProverError},
};

/// Errors that abort a check. A proof that does not verify is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The prover failed.
    #[error("failed to generate proof")]
    Prover(#[from] ProverError),
    /// The prover output could not be shaped into verifier arguments.
    #[error("failed to build verifier calldata")]
    Calldata(#[from] CalldataError),
    /// The verifier could not be deployed or called.
    #[error("verifier call failed")]
    Verifier(#[from] VerifierError),
}

/// Bridges a prover's JSON output to a verifier entry point.
///
/// The verifier's answer is returned unmodified. Nothing is retried.
pub struct ProofSubmissionClient<P, V> {
    prover: P,
    verifier: V,
}

impl<P: Prover, V: VerifierContract> ProofSubmissionClient<P, V> {
    /// Creates a client that proves with `prover` and submits to `verifier`.
    pub fn new(prover: P, verifier: V) -> Self {
        Self { prover, verifier }
    }

    /// The verifier proofs are submitted to.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Proves `witness`, submits the proof and returns the verifier's answer.
    #[instrument(level = "debug", skip_all, fields(circuit = artifacts.circuit(), scheme = %artifacts.scheme()))]
    pub async fn prove_and_verify(
        &self,
        witness: &Witness,
        artifacts: &CircuitArtifacts,
    ) -> Result<bool, ClientError> {
        let args = self.prove(witness, artifacts).await?;
        self.verify_args(&args).await
    }

    /// Proves `witness` and shapes the proof into verifier arguments.
    pub async fn prove(
        &self,
        witness: &Witness,
        artifacts: &CircuitArtifacts,
    ) -> Result<CallArgs, ClientError> {
        let output = self.prover.full_prove(witness, artifacts).await?;
        let proof = SignalValue::from(output.proof).normalize();
        let public_signals = SignalValue::from(output.public_signals).normalize();
        if let Some(out) = public_signals.at(0).and_then(SignalValue::as_integer) {
            tracing::info!("{} = {out}", witness_product(witness));
        }
        let calldata =
            self.prover
                .export_solidity_calldata(artifacts.scheme(), &proof, &public_signals)?;
        Ok(verifier_call::to_calldata_args(&calldata, artifacts.scheme())?)
    }

    /// Submits raw arguments, e.g. deliberately invalid ones.
    pub async fn verify_args(&self, args: &CallArgs) -> Result<bool, ClientError> {
        let valid = self.verifier.verify(args).await?;
        tracing::debug!(valid, "verifier answered");
        Ok(valid)
    }
}

/// Renders the witness values as `1x2x3`, the product the circuits output.
fn witness_product(witness: &Witness) -> String {
    witness
        .iter()
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join("x")
}
