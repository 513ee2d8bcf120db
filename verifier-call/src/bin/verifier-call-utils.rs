use clap::{Args, Parser, Subcommand};
use eyre::Context;
use snarkjs_types::{ProofScheme, SignalValue};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;
use verifier_call::{CallArgs, NativeGroth16Verifier, VerifierContract};

/// Utility tools for calling verifier contracts generated by snarkjs. This CLI can turn a snarkjs proof and its public signals into `verifyProof` arguments and check Groth16 proofs against a verification key without a chain.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Config {
    #[clap(subcommand)]
    subcommand: SubCommand,
}

#[derive(Debug, Subcommand)]
enum SubCommand {
    GenerateCall(GenerateCallConfig),
    Verify(VerifyConfig),
}

#[derive(Debug, Args)]
struct GenerateCallConfig {
    /// Path to snarkjs proof.
    #[clap(long)]
    pub proof: PathBuf,
    /// Path to snarkjs public signals.
    #[clap(long)]
    pub public: PathBuf,
    /// Proof system of the verifier contract.
    #[clap(long, default_value_t = ProofScheme::Groth16)]
    pub scheme: ProofScheme,
    /// Print the positional `verifyProof` arguments instead of the calldata string.
    #[clap(long)]
    pub argv: bool,
    /// Location of the output file. Write to stdout if omitted.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct VerifyConfig {
    /// Path to snarkjs Groth16 verification key.
    #[clap(long)]
    pub vk: PathBuf,
    /// Path to snarkjs proof.
    #[clap(long)]
    pub proof: PathBuf,
    /// Path to snarkjs public signals.
    #[clap(long)]
    pub public: PathBuf,
}

fn read_signals(path: &Path) -> eyre::Result<SignalValue> {
    let file = File::open(path).with_context(|| format!("while opening {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("while parsing {}", path.display()))?;
    Ok(SignalValue::from(value).normalize())
}

fn call_args(proof: &Path, public: &Path, scheme: ProofScheme) -> eyre::Result<(String, CallArgs)> {
    let proof = read_signals(proof)?;
    let public_signals = read_signals(public)?;
    let calldata = verifier_call::export_solidity_calldata(scheme, &proof, &public_signals)
        .context("while exporting calldata")?;
    let args = verifier_call::to_calldata_args(&calldata, scheme)
        .context("while parsing calldata")?;
    Ok((calldata, args))
}

fn generate_call(config: GenerateCallConfig) -> eyre::Result<ExitCode> {
    let GenerateCallConfig {
        proof,
        public,
        scheme,
        argv,
        output,
    } = config;
    let (calldata, args) = call_args(&proof, &public, scheme)?;
    let result = if argv {
        serde_json::to_string_pretty(&args.argv())?
    } else {
        calldata
    };
    if let Some(output) = output {
        std::fs::write(output, result).context("while writing output")?;
    } else {
        println!("{result}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn verify(config: VerifyConfig) -> eyre::Result<ExitCode> {
    let VerifyConfig { vk, proof, public } = config;
    let verifier = NativeGroth16Verifier::from_reader(BufReader::new(
        File::open(&vk).context("while opening verification key")?,
    ))
    .context("while parsing verification key")?;
    let (_, args) = call_args(&proof, &public, ProofScheme::Groth16)?;
    if verifier.verify(&args).await? {
        println!("proof is valid");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("proof is invalid");
        Ok(ExitCode::FAILURE)
    }
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let config = Config::parse();
    match config.subcommand {
        SubCommand::GenerateCall(config) => generate_call(config),
        SubCommand::Verify(config) => verify(config).await,
    }
}
