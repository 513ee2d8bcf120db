use clap::Parser;
use eyre::Context;
use proof_client::{SnarkjsProver, builtin_scenarios, run_scenario};
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;
use verifier_call::RpcDeployer;

/// Proves the HelloWorld and Multiplier3 circuits with snarkjs and checks the answers of their verifier contracts on a development node. Every check deploys a fresh verifier.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Config {
    /// JSON-RPC endpoint of the development node. The node must manage an unlocked account.
    #[clap(long, env = "CIRCUIT_CHECK_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,
    /// Directory containing `contracts/circuits` and the hardhat `artifacts`.
    #[clap(long, env = "CIRCUIT_CHECK_PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,
    /// The snarkjs executable.
    #[clap(long, env = "CIRCUIT_CHECK_SNARKJS", default_value = "snarkjs")]
    pub snarkjs: PathBuf,
    /// Only run scenarios whose name contains this text.
    #[clap(long)]
    pub scenario: Option<String>,
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config = Config::parse();

    let deployer = RpcDeployer::new(
        config.rpc_url.as_str(),
        config.project_root.join("artifacts").join("contracts"),
    )
    .context("while creating JSON-RPC client")?;
    let prover = SnarkjsProver::new(config.snarkjs);

    let scenarios = builtin_scenarios()
        .into_iter()
        .filter(|s| {
            config
                .scenario
                .as_deref()
                .is_none_or(|filter| s.name.contains(filter))
        })
        .collect::<Vec<_>>();
    if scenarios.is_empty() {
        eyre::bail!("no scenario matches the filter");
    }

    let mut failed = 0;
    for scenario in &scenarios {
        let outcome = run_scenario(scenario, &prover, &deployer, &config.project_root)
            .await
            .with_context(|| format!("while running {}", scenario.name))?;
        let status = if outcome.passed() { "ok" } else { "FAILED" };
        println!(
            "{status:>6}  {} (expected {}, got {})",
            outcome.name, outcome.expected, outcome.actual
        );
        if !outcome.passed() {
            failed += 1;
        }
    }
    println!("{} passed, {failed} failed", scenarios.len() - failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
