//! Locating the compiled circuit and proving key of a circuit variant.
use std::path::{Path, PathBuf};

use sha2::Digest as _;
use snarkjs_types::ProofScheme;

/// Errors that can occur while checking circuit artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// An artifact does not exist at its fixed location.
    #[error("missing circuit artifact {}", .0.display())]
    Missing(PathBuf),
    /// The SHA-256 fingerprint of the `.zkey` did not match the expected value.
    #[error("invalid zkey - wrong sha256 fingerprint: {0}")]
    ZkeyFingerprintMismatch(String),
    /// Any I/O error encountered while reading an artifact
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// The compiled circuit (`.wasm`) and proving key (`.zkey`) for one circuit and proof system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitArtifacts {
    circuit: String,
    scheme: ProofScheme,
    wasm: PathBuf,
    zkey: PathBuf,
    zkey_fingerprint: Option<String>,
}

impl CircuitArtifacts {
    /// Artifacts at explicit paths.
    pub fn new(
        circuit: impl Into<String>,
        scheme: ProofScheme,
        wasm: impl Into<PathBuf>,
        zkey: impl Into<PathBuf>,
    ) -> Self {
        Self {
            circuit: circuit.into(),
            scheme,
            wasm: wasm.into(),
            zkey: zkey.into(),
            zkey_fingerprint: None,
        }
    }

    /// Artifacts at the locations the circuit build scripts write them to below `root`.
    ///
    /// Groth16 artifacts live in `contracts/circuits/<circuit>/` with the final key of the
    /// phase-2 ceremony (`circuit_final.zkey`). PLONK artifacts live in
    /// `contracts/circuits/<circuit>_plonk/` with the key of its universal setup
    /// (`circuit_0000.zkey`).
    pub fn locate(root: impl AsRef<Path>, circuit: &str, scheme: ProofScheme) -> Self {
        let (dir, zkey) = match scheme {
            ProofScheme::Groth16 => (circuit.to_owned(), "circuit_final.zkey"),
            ProofScheme::Plonk => (format!("{circuit}_plonk"), "circuit_0000.zkey"),
        };
        let dir = root.as_ref().join("contracts").join("circuits").join(dir);
        Self::new(
            circuit,
            scheme,
            dir.join(format!("{circuit}_js")).join(format!("{circuit}.wasm")),
            dir.join(zkey),
        )
    }

    /// Requires the `.zkey` to have the given hex encoded SHA-256 fingerprint.
    pub fn with_zkey_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.zkey_fingerprint = Some(fingerprint.into().to_ascii_lowercase());
        self
    }

    /// The circuit name.
    pub fn circuit(&self) -> &str {
        &self.circuit
    }

    /// The proof system the proving key was set up for.
    pub fn scheme(&self) -> ProofScheme {
        self.scheme
    }

    /// Path of the compiled circuit.
    pub fn wasm_path(&self) -> &Path {
        &self.wasm
    }

    /// Path of the proving key.
    pub fn zkey_path(&self) -> &Path {
        &self.zkey
    }

    /// Fails with [`ArtifactError::Missing`] for the first artifact that is not a file.
    pub async fn ensure_present(&self) -> Result<(), ArtifactError> {
        for path in [&self.wasm, &self.zkey] {
            let is_file = tokio::fs::metadata(path)
                .await
                .is_ok_and(|metadata| metadata.is_file());
            if !is_file {
                return Err(ArtifactError::Missing(path.clone()));
            }
        }
        Ok(())
    }

    /// Checks the `.zkey` fingerprint if one is required.
    pub async fn verify_fingerprint(&self) -> Result<(), ArtifactError> {
        let Some(should_fingerprint) = &self.zkey_fingerprint else {
            return Ok(());
        };
        let zkey = tokio::fs::read(&self.zkey).await?;
        let is_fingerprint = hex::encode(sha2::Sha256::digest(zkey));
        if &is_fingerprint != should_fingerprint {
            return Err(ArtifactError::ZkeyFingerprintMismatch(is_fingerprint));
        }
        Ok(())
    }

    /// Runs every check that must pass before proving.
    pub async fn check(&self) -> Result<(), ArtifactError> {
        self.ensure_present().await?;
        self.verify_fingerprint().await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use snarkjs_types::ProofScheme;

    use super::{ArtifactError, CircuitArtifacts};

    #[test]
    fn locates_groth16_artifacts() {
        let artifacts = CircuitArtifacts::locate(".", "HelloWorld", ProofScheme::Groth16);
        assert_eq!(
            artifacts.wasm_path(),
            Path::new("./contracts/circuits/HelloWorld/HelloWorld_js/HelloWorld.wasm")
        );
        assert_eq!(
            artifacts.zkey_path(),
            Path::new("./contracts/circuits/HelloWorld/circuit_final.zkey")
        );
        assert_eq!(artifacts.circuit(), "HelloWorld");
        assert_eq!(artifacts.scheme(), ProofScheme::Groth16);
    }

    #[test]
    fn locates_plonk_artifacts() {
        let artifacts = CircuitArtifacts::locate("/work", "Multiplier3", ProofScheme::Plonk);
        assert_eq!(
            artifacts.wasm_path(),
            Path::new("/work/contracts/circuits/Multiplier3_plonk/Multiplier3_js/Multiplier3.wasm")
        );
        assert_eq!(
            artifacts.zkey_path(),
            Path::new("/work/contracts/circuits/Multiplier3_plonk/circuit_0000.zkey")
        );
    }

    #[tokio::test]
    async fn reports_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = CircuitArtifacts::locate(dir.path(), "HelloWorld", ProofScheme::Groth16);
        let err = artifacts.check().await.unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(path) if path == artifacts.wasm_path()));

        std::fs::create_dir_all(artifacts.wasm_path().parent().unwrap()).unwrap();
        std::fs::write(artifacts.wasm_path(), b"wasm").unwrap();
        let err = artifacts.ensure_present().await.unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(path) if path == artifacts.zkey_path()));

        // a directory in place of the key is not an artifact
        std::fs::create_dir(artifacts.zkey_path()).unwrap();
        let err = artifacts.ensure_present().await.unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(path) if path == artifacts.zkey_path()));

        std::fs::remove_dir(artifacts.zkey_path()).unwrap();
        std::fs::write(artifacts.zkey_path(), b"zkey").unwrap();
        artifacts.check().await.unwrap();
    }

    #[tokio::test]
    async fn checks_zkey_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let wasm = dir.path().join("circuit.wasm");
        let zkey = dir.path().join("circuit.zkey");
        std::fs::write(&wasm, b"wasm").unwrap();
        std::fs::write(&zkey, b"zkey").unwrap();
        let artifacts = CircuitArtifacts::new("Circuit", ProofScheme::Groth16, wasm, zkey);

        let computed = {
            use sha2::Digest as _;
            hex::encode(sha2::Sha256::digest(b"zkey"))
        };
        artifacts
            .clone()
            .with_zkey_fingerprint(computed.to_ascii_uppercase())
            .check()
            .await
            .unwrap();

        let err = artifacts
            .with_zkey_fingerprint("00".repeat(32))
            .check()
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::ZkeyFingerprintMismatch(fp) if fp == computed));
    }
}
