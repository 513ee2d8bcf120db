//! Proof submission for circom circuits.
//!
//! This crate proves witnesses with an external prover, reshapes the prover's JSON output into
//! the positional arguments of a verifier contract and reports what the verifier answers.
//!
//! ```rust,no_run
//! # async fn run() -> eyre::Result<()> {
//! use proof_client::{CircuitArtifacts, ProofSubmissionClient, SnarkjsProver};
//! use snarkjs_types::{ProofScheme, Witness};
//! use verifier_call::RpcDeployer;
//!
//! let deployer = RpcDeployer::new("http://127.0.0.1:8545", "artifacts/contracts")?;
//! let verifier = deployer.deploy("HelloWorldVerifier", ProofScheme::Groth16).await?;
//! let client = ProofSubmissionClient::new(SnarkjsProver::default(), verifier);
//!
//! let witness = Witness::new().with("a", 1u64).with("b", 2u64);
//! let artifacts = CircuitArtifacts::locate(".", "HelloWorld", ProofScheme::Groth16);
//! assert!(client.prove_and_verify(&witness, &artifacts).await?);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

mod artifacts;
mod client;
mod prover;
pub mod scenario;

pub use artifacts::{ArtifactError, CircuitArtifacts};
pub use client::{ClientError, ProofSubmissionClient};
pub use prover::{Prover, ProverError, ProverOutput, SnarkjsProver};
pub use scenario::{
    Scenario, ScenarioInput, ScenarioOutcome, VerifierFactory, builtin_scenarios, run_scenario,
};
