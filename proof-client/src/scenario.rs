//! Checks of a verifier contract against a known outcome.
//!
//! Every [`Scenario`] is a self-contained value: it names the contract to deploy, the circuit
//! artifacts to prove with and what the verifier must answer. Each run deploys a fresh verifier
//! so no state is shared between scenarios.
use std::{future::Future, path::Path};

use snarkjs_types::{ProofScheme, Witness};
use tracing::instrument;
use verifier_call::{
    CallArgs, Groth16CallArgs, PlonkCallArgs, RpcDeployer, RpcVerifier, VerifierContract,
    VerifierError,
};

use crate::{
    artifacts::CircuitArtifacts,
    client::{ClientError, ProofSubmissionClient},
    prover::Prover,
};

/// What is submitted to the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioInput {
    /// Prove the witness and submit the proof.
    Prove(Witness),
    /// Submit the arguments as they are.
    Raw(CallArgs),
}

/// One check of a verifier contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Human readable name
    pub name: String,
    /// Name of the verifier contract
    pub contract: String,
    /// Name of the circuit the contract was generated for
    pub circuit: String,
    /// Proof system of circuit and contract
    pub scheme: ProofScheme,
    /// What is submitted
    pub input: ScenarioInput,
    /// The answer the verifier must give
    pub expected: bool,
}

/// The result of running a [`Scenario`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Name of the scenario
    pub name: String,
    /// The answer the verifier had to give
    pub expected: bool,
    /// The answer the verifier gave
    pub actual: bool,
}

impl ScenarioOutcome {
    /// Whether the verifier answered as expected.
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl Scenario {
    /// The artifacts of the scenario's circuit below `project_root`.
    pub fn artifacts(&self, project_root: impl AsRef<Path>) -> CircuitArtifacts {
        CircuitArtifacts::locate(project_root, &self.circuit, self.scheme)
    }
}

/// Provides a freshly deployed verifier for every scenario.
pub trait VerifierFactory {
    /// The verifier type
    type Verifier: VerifierContract;

    /// Deploys the verifier contract of `scenario`.
    fn fresh_verifier(
        &self,
        scenario: &Scenario,
    ) -> impl Future<Output = Result<Self::Verifier, VerifierError>> + Send;
}

impl VerifierFactory for RpcDeployer {
    type Verifier = RpcVerifier;

    async fn fresh_verifier(&self, scenario: &Scenario) -> Result<RpcVerifier, VerifierError> {
        self.deploy(&scenario.contract, scenario.scheme).await
    }
}

/// Deploys a verifier for `scenario`, submits its input and compares the answer.
#[instrument(level = "debug", skip_all, fields(scenario = %scenario.name))]
pub async fn run_scenario<P: Prover, F: VerifierFactory>(
    scenario: &Scenario,
    prover: P,
    factory: &F,
    project_root: &Path,
) -> Result<ScenarioOutcome, ClientError> {
    let verifier = factory.fresh_verifier(scenario).await?;
    let client = ProofSubmissionClient::new(prover, verifier);
    let actual = match &scenario.input {
        ScenarioInput::Prove(witness) => {
            client
                .prove_and_verify(witness, &scenario.artifacts(project_root))
                .await?
        }
        ScenarioInput::Raw(args) => client.verify_args(args).await?,
    };
    let outcome = ScenarioOutcome {
        name: scenario.name.clone(),
        expected: scenario.expected,
        actual,
    };
    if outcome.passed() {
        tracing::info!(expected = outcome.expected, "{}: ok", outcome.name);
    } else {
        tracing::warn!(
            expected = outcome.expected,
            actual = outcome.actual,
            "{}: verifier answered differently",
            outcome.name
        );
    }
    Ok(outcome)
}

/// The checks of the HelloWorld and Multiplier3 verifier contracts.
///
/// The PLONK verifier is expected to reject the calldata of a correct proof. This records the
/// known behavior of the deployed contract, which looks like a mismatch between the exported
/// calldata and the entry point rather than intended semantics.
pub fn builtin_scenarios() -> Vec<Scenario> {
    let multiplier3 = || {
        Witness::new()
            .with("a", 1u64)
            .with("b", 2u64)
            .with("c", 3u64)
    };
    vec![
        Scenario {
            name: "HelloWorld: correct proof".to_owned(),
            contract: "HelloWorldVerifier".to_owned(),
            circuit: "HelloWorld".to_owned(),
            scheme: ProofScheme::Groth16,
            input: ScenarioInput::Prove(Witness::new().with("a", 1u64).with("b", 2u64)),
            expected: true,
        },
        Scenario {
            name: "HelloWorld: invalid proof".to_owned(),
            contract: "HelloWorldVerifier".to_owned(),
            circuit: "HelloWorld".to_owned(),
            scheme: ProofScheme::Groth16,
            input: ScenarioInput::Raw(Groth16CallArgs::zeroed(1).into()),
            expected: false,
        },
        Scenario {
            name: "Multiplier3 with Groth16: correct proof".to_owned(),
            contract: "Multiplier3Verifier".to_owned(),
            circuit: "Multiplier3".to_owned(),
            scheme: ProofScheme::Groth16,
            input: ScenarioInput::Prove(multiplier3()),
            expected: true,
        },
        Scenario {
            name: "Multiplier3 with Groth16: invalid proof".to_owned(),
            contract: "Multiplier3Verifier".to_owned(),
            circuit: "Multiplier3".to_owned(),
            scheme: ProofScheme::Groth16,
            input: ScenarioInput::Raw(Groth16CallArgs::zeroed(1).into()),
            expected: false,
        },
        Scenario {
            name: "Multiplier3 with PLONK: correct proof".to_owned(),
            contract: "Multiplier3Verifier_plonk".to_owned(),
            circuit: "Multiplier3".to_owned(),
            scheme: ProofScheme::Plonk,
            input: ScenarioInput::Prove(multiplier3()),
            expected: false,
        },
        Scenario {
            name: "Multiplier3 with PLONK: invalid proof".to_owned(),
            contract: "Multiplier3Verifier_plonk".to_owned(),
            circuit: "Multiplier3".to_owned(),
            scheme: ProofScheme::Plonk,
            input: ScenarioInput::Raw(
                PlonkCallArgs {
                    proof: vec![0u8].into(),
                    input: vec![Default::default()],
                }
                .into(),
            ),
            expected: false,
        },
    ]
}
