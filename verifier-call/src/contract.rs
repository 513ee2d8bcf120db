use std::future::Future;

use snarkjs_types::ProofScheme;

use crate::CallArgs;

/// Errors that abort a verification call.
///
/// A proof that does not verify is not an error, the entry point answers `false` for it.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// The arguments are shaped for the other proof system.
    #[error("verifier expects {expected} arguments but got {actual} arguments")]
    SchemeMismatch {
        /// Calling convention of the verifier
        expected: ProofScheme,
        /// Calling convention of the arguments
        actual: ProofScheme,
    },
    /// The call reverted.
    #[error("verifier call reverted: {0}")]
    Execution(String),
    /// The call returned something that is not an ABI-encoded `bool`.
    #[error("cannot decode verifier return data 0x{0}")]
    Decode(String),
    /// The node answered with a JSON-RPC error.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },
    /// The node could not be reached.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The verifier contract could not be deployed.
    #[error("failed to deploy verifier contract")]
    Deployment(#[source] eyre::Report),
}

/// A deployed verifier with a read-only `verifyProof` entry point.
pub trait VerifierContract {
    /// The calling convention of the entry point.
    fn scheme(&self) -> ProofScheme;

    /// Calls `verifyProof` once and returns its result unmodified.
    fn verify(&self, args: &CallArgs) -> impl Future<Output = Result<bool, VerifierError>> + Send;

    /// Fails with [`VerifierError::SchemeMismatch`] if `args` do not fit the entry point.
    fn ensure_scheme(&self, args: &CallArgs) -> Result<(), VerifierError> {
        let (expected, actual) = (self.scheme(), args.scheme());
        if expected == actual {
            Ok(())
        } else {
            Err(VerifierError::SchemeMismatch { expected, actual })
        }
    }
}
