//! Verifier contracts on an Ethereum JSON-RPC node.
//!
//! Deployment uses `eth_sendTransaction` from an account the node unlocks, as development
//! nodes (hardhat, anvil) do. Verification is a plain `eth_call`.
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use alloy_primitives::Address;
use eyre::Context as _;
use reqwest::{IntoUrl, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use snarkjs_types::ProofScheme;
use tracing::instrument;

use crate::{CallArgs, VerifierContract, VerifierError, abi};

const RECEIPT_POLL_ATTEMPTS: usize = 50;
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A minimal JSON-RPC client.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    contract_address: Option<String>,
    status: Option<String>,
}

/// The part of a hardhat compilation artifact needed to deploy a contract.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    bytecode: String,
}

impl RpcClient {
    /// Creates a client for the node at `url`.
    pub fn new(url: impl IntoUrl) -> Result<Self, VerifierError> {
        Ok(Self {
            http: reqwest::Client::new(),
            url: url.into_url()?,
            next_id: AtomicU64::new(1),
        })
    }

    /// Sends one request and deserializes its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, VerifierError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(id, method, "sending JSON-RPC request");
        let response = self
            .http
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await?;
        if let Some(error) = response.error {
            return Err(classify_error(error));
        }
        serde_json::from_value(response.result).map_err(|err| VerifierError::Rpc {
            code: 0,
            message: format!("unexpected {method} result: {err}"),
        })
    }
}

fn classify_error(error: RpcErrorObject) -> VerifierError {
    // geth-style nodes answer reverts with code 3, others only mention it in the message
    if error.code == 3 || error.message.contains("revert") {
        let reason = match error.data {
            Some(Value::String(data)) => format!("{} ({data})", error.message),
            _ => error.message,
        };
        VerifierError::Execution(reason)
    } else {
        VerifierError::Rpc {
            code: error.code,
            message: error.message,
        }
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, VerifierError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|_| VerifierError::Decode(digits.to_owned()))
}

/// A verifier contract deployed at a known address.
#[derive(Debug, Clone)]
pub struct RpcVerifier {
    client: Arc<RpcClient>,
    address: Address,
    scheme: ProofScheme,
}

impl RpcVerifier {
    /// A verifier with the `scheme` calling convention at `address`.
    pub fn new(client: Arc<RpcClient>, address: Address, scheme: ProofScheme) -> Self {
        Self {
            client,
            address,
            scheme,
        }
    }

    /// The contract address.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl VerifierContract for RpcVerifier {
    fn scheme(&self) -> ProofScheme {
        self.scheme
    }

    #[instrument(level = "debug", skip_all, fields(address = %self.address, scheme = %self.scheme))]
    async fn verify(&self, args: &CallArgs) -> Result<bool, VerifierError> {
        self.ensure_scheme(args)?;
        let data = abi::encode_verify_call(args);
        tracing::debug!("eth_call with {} bytes of calldata", data.len());
        let returned: String = self
            .client
            .request(
                "eth_call",
                json!([
                    {"to": self.address.to_string(), "data": format!("0x{}", hex::encode(data))},
                    "latest"
                ]),
            )
            .await?;
        abi::decode_verify_result(&decode_hex(&returned)?)
    }
}

/// Deploys verifier contracts compiled by hardhat.
///
/// Artifacts are read from `<artifacts_dir>/<Contract>.sol/<Contract>.json`.
#[derive(Debug, Clone)]
pub struct RpcDeployer {
    client: Arc<RpcClient>,
    artifacts_dir: PathBuf,
    from: Option<Address>,
}

impl RpcDeployer {
    /// Creates a deployer for the node at `url`.
    pub fn new(url: impl IntoUrl, artifacts_dir: impl Into<PathBuf>) -> Result<Self, VerifierError> {
        Ok(Self {
            client: Arc::new(RpcClient::new(url)?),
            artifacts_dir: artifacts_dir.into(),
            from: None,
        })
    }

    /// Deploys from `from` instead of the node's first account.
    pub fn from_account(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// The path of the hardhat artifact for `contract`.
    pub fn artifact_path(&self, contract: &str) -> PathBuf {
        self.artifacts_dir
            .join(format!("{contract}.sol"))
            .join(format!("{contract}.json"))
    }

    /// Deploys a fresh instance of `contract` and returns a verifier for it.
    #[instrument(level = "debug", skip(self))]
    pub async fn deploy(
        &self,
        contract: &str,
        scheme: ProofScheme,
    ) -> Result<RpcVerifier, VerifierError> {
        let bytecode = load_bytecode(&self.artifact_path(contract))?;
        let from = match self.from {
            Some(from) => from,
            None => self.first_account().await?,
        };
        let tx_hash: String = self
            .client
            .request(
                "eth_sendTransaction",
                json!([{"from": from.to_string(), "data": bytecode}]),
            )
            .await?;
        tracing::debug!(%tx_hash, "sent deployment of {contract}");
        let address = self.wait_for_contract(&tx_hash).await?;
        tracing::info!(%address, "deployed {contract}");
        Ok(RpcVerifier::new(Arc::clone(&self.client), address, scheme))
    }

    async fn first_account(&self) -> Result<Address, VerifierError> {
        let accounts: Vec<String> = self.client.request("eth_accounts", json!([])).await?;
        let account = accounts.first().ok_or_else(|| {
            VerifierError::Deployment(eyre::eyre!("node does not manage any account"))
        })?;
        Address::from_str(account).map_err(|err| VerifierError::Deployment(err.into()))
    }

    async fn wait_for_contract(&self, tx_hash: &str) -> Result<Address, VerifierError> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let receipt: Option<TransactionReceipt> = self
                .client
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if let Some(receipt) = receipt {
                if receipt.status.as_deref() == Some("0x0") {
                    return Err(VerifierError::Deployment(eyre::eyre!(
                        "deployment transaction {tx_hash} reverted"
                    )));
                }
                let address = receipt.contract_address.ok_or_else(|| {
                    VerifierError::Deployment(eyre::eyre!("receipt of {tx_hash} has no contract address"))
                })?;
                return Address::from_str(&address)
                    .map_err(|err| VerifierError::Deployment(err.into()));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(VerifierError::Deployment(eyre::eyre!(
            "deployment transaction {tx_hash} was not mined"
        )))
    }
}

fn load_bytecode(path: &Path) -> Result<String, VerifierError> {
    let read = || -> eyre::Result<HardhatArtifact> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("while opening artifact {}", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("while parsing artifact {}", path.display()))
    };
    let artifact = read().map_err(VerifierError::Deployment)?;
    if artifact.bytecode.len() <= 2 {
        return Err(VerifierError::Deployment(eyre::eyre!(
            "{} has no creation bytecode",
            artifact.contract_name
        )));
    }
    Ok(artifact.bytecode)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::Address;
    use serde_json::json;

    use super::*;

    #[test]
    fn reverts_are_execution_errors() {
        let error = serde_json::from_value::<RpcErrorObject>(json!({
            "code": 3,
            "message": "execution reverted: verifier-gte-snark-scalar-field",
            "data": "0x08c379a0",
        }))
        .unwrap();
        assert!(matches!(classify_error(error), VerifierError::Execution(msg) if msg.contains("0x08c379a0")));

        let error = serde_json::from_value::<RpcErrorObject>(json!({
            "code": -32603,
            "message": "Error: VM Exception while processing transaction: revert",
        }))
        .unwrap();
        assert!(matches!(classify_error(error), VerifierError::Execution(_)));

        let error = serde_json::from_value::<RpcErrorObject>(json!({
            "code": -32601,
            "message": "method not found",
        }))
        .unwrap();
        assert!(matches!(
            classify_error(error),
            VerifierError::Rpc { code: -32601, .. }
        ));
    }

    #[test]
    fn parses_receipts() {
        let receipt = serde_json::from_value::<Option<TransactionReceipt>>(json!({
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "status": "0x1",
        }))
        .unwrap()
        .unwrap();
        assert_eq!(
            Address::from_str(&receipt.contract_address.unwrap()).unwrap(),
            Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap()
        );
        assert!(
            serde_json::from_value::<Option<TransactionReceipt>>(Value::Null)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn artifact_layout_follows_hardhat() {
        let deployer = RpcDeployer::new("http://127.0.0.1:8545", "artifacts/contracts").unwrap();
        assert_eq!(
            deployer.artifact_path("HelloWorldVerifier"),
            PathBuf::from("artifacts/contracts/HelloWorldVerifier.sol/HelloWorldVerifier.json")
        );
    }

    #[test]
    fn loads_creation_bytecode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Empty.json");
        std::fs::write(
            &path,
            json!({"contractName": "Empty", "abi": [], "bytecode": "0x"}).to_string(),
        )
        .unwrap();
        assert!(matches!(load_bytecode(&path), Err(VerifierError::Deployment(_))));
        std::fs::write(
            &path,
            json!({"contractName": "Verifier", "abi": [], "bytecode": "0x6080"}).to_string(),
        )
        .unwrap();
        assert_eq!(load_bytecode(&path).unwrap(), "0x6080");
        assert!(load_bytecode(&dir.path().join("Missing.json")).is_err());
    }

    #[test]
    fn decodes_prefixed_hex() {
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert!(matches!(decode_hex("0xz"), Err(VerifierError::Decode(_))));
    }

    #[tokio::test]
    #[ignore = "needs a development node with the verifier artifacts compiled"]
    async fn deploys_and_rejects_zero_proof() {
        let deployer = RpcDeployer::new("http://127.0.0.1:8545", "artifacts/contracts").unwrap();
        let verifier = deployer
            .deploy("HelloWorldVerifier", ProofScheme::Groth16)
            .await
            .unwrap();
        let args = CallArgs::Groth16(crate::Groth16CallArgs::zeroed(1));
        assert!(!verifier.verify(&args).await.unwrap());
    }
}
