//! The external prover seam and its snarkjs implementation.
use std::{
    future::Future,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use eyre::Context as _;
use snarkjs_types::{ProofScheme, SignalValue, Witness};
use tracing::instrument;
use verifier_call::CalldataError;

use crate::artifacts::{ArtifactError, CircuitArtifacts};

/// The proof and public signals as the prover returned them, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProverOutput {
    /// The proof object, `proof.json`
    pub proof: serde_json::Value,
    /// The public signals, `public.json`
    pub public_signals: serde_json::Value,
}

/// Errors that can occur while generating a proof.
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    /// The circuit artifacts are missing or do not match their fingerprints.
    #[error(transparent)]
    Artifacts(#[from] ArtifactError),
    /// The prover executable could not be started.
    #[error("failed to run {}", .program.display())]
    Spawn {
        /// The executable
        program: PathBuf,
        /// The reason
        #[source]
        source: std::io::Error,
    },
    /// The prover ran but did not produce a proof.
    #[error("{scheme} fullprove failed ({status}): {stderr}")]
    Failed {
        /// The proof system that was requested
        scheme: ProofScheme,
        /// Exit status of the prover
        status: ExitStatus,
        /// Diagnostic output of the prover
        stderr: String,
    },
    /// The prover output could not be read.
    #[error("failed to read prover output")]
    Output(#[source] eyre::Report),
    /// Failed to generate the proof in process.
    #[error("failed to generate proof")]
    ProofGeneration(#[source] eyre::Report),
    /// Any I/O error encountered while preparing the prover input
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Generates proofs for circuit witnesses.
///
/// The calldata export is part of the prover because its format is defined by the prover's
/// tooling, not by the verifier contract.
pub trait Prover {
    /// Computes the full witness from `witness` and proves it with the artifacts.
    fn full_prove(
        &self,
        witness: &Witness,
        artifacts: &CircuitArtifacts,
    ) -> impl Future<Output = Result<ProverOutput, ProverError>> + Send;

    /// Serializes normalized proof values into the calldata string for `scheme`.
    fn export_solidity_calldata(
        &self,
        scheme: ProofScheme,
        proof: &SignalValue,
        public_signals: &SignalValue,
    ) -> Result<String, CalldataError> {
        verifier_call::export_solidity_calldata(scheme, proof, public_signals)
    }
}

impl<P: Prover + Sync> Prover for &P {
    fn full_prove(
        &self,
        witness: &Witness,
        artifacts: &CircuitArtifacts,
    ) -> impl Future<Output = Result<ProverOutput, ProverError>> + Send {
        (**self).full_prove(witness, artifacts)
    }

    fn export_solidity_calldata(
        &self,
        scheme: ProofScheme,
        proof: &SignalValue,
        public_signals: &SignalValue,
    ) -> Result<String, CalldataError> {
        (**self).export_solidity_calldata(scheme, proof, public_signals)
    }
}

/// Runs `snarkjs <groth16|plonk> fullprove` as a child process.
///
/// Every call works in a fresh temporary directory which is removed afterwards.
#[derive(Debug, Clone)]
pub struct SnarkjsProver {
    program: PathBuf,
}

impl Default for SnarkjsProver {
    fn default() -> Self {
        Self::new("snarkjs")
    }
}

impl SnarkjsProver {
    /// A prover that invokes the snarkjs CLI at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The snarkjs executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

async fn read_json(path: &Path) -> Result<serde_json::Value, ProverError> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("while reading {}", path.display()))
        .map_err(ProverError::Output)?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("while parsing {}", path.display()))
        .map_err(ProverError::Output)
}

impl Prover for SnarkjsProver {
    #[instrument(level = "debug", skip_all, fields(circuit = artifacts.circuit(), scheme = %artifacts.scheme()))]
    async fn full_prove(
        &self,
        witness: &Witness,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProverOutput, ProverError> {
        artifacts.check().await?;
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.json");
        let proof = dir.path().join("proof.json");
        let public = dir.path().join("public.json");
        let witness = serde_json::to_vec(witness)
            .context("while serializing witness")
            .map_err(ProverError::ProofGeneration)?;
        tokio::fs::write(&input, witness).await?;

        tracing::debug!("running {} fullprove", self.program.display());
        let output = tokio::process::Command::new(&self.program)
            .arg(artifacts.scheme().as_str())
            .arg("fullprove")
            .arg(&input)
            .arg(artifacts.wasm_path())
            .arg(artifacts.zkey_path())
            .arg(&proof)
            .arg(&public)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProverError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ProverError::Failed {
                scheme: artifacts.scheme(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(ProverOutput {
            proof: read_json(&proof).await?,
            public_signals: read_json(&public).await?,
        })
    }
}
