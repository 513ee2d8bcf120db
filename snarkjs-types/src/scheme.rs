use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The proof systems a circuit can be proven and verified with.
///
/// The string forms are the protocol names snarkjs uses on its command line and in the
/// `protocol` field of `proof.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofScheme {
    /// Groth16 over BN254.
    Groth16,
    /// PLONK over BN254.
    Plonk,
}

/// Error returned when parsing an unknown proof scheme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown proof scheme {0:?}, expected \"groth16\" or \"plonk\"")]
pub struct SchemeParseError(String);

impl ProofScheme {
    /// The snarkjs protocol name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofScheme::Groth16 => "groth16",
            ProofScheme::Plonk => "plonk",
        }
    }
}

impl fmt::Display for ProofScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofScheme {
    type Err = SchemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "groth16" => Ok(ProofScheme::Groth16),
            "plonk" => Ok(ProofScheme::Plonk),
            _ => Err(SchemeParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProofScheme;

    #[test]
    fn parses_protocol_names() {
        assert_eq!("groth16".parse::<ProofScheme>(), Ok(ProofScheme::Groth16));
        assert_eq!("PLONK".parse::<ProofScheme>(), Ok(ProofScheme::Plonk));
        assert!("fflonk".parse::<ProofScheme>().is_err());
        assert_eq!(
            serde_json::to_string(&ProofScheme::Plonk).unwrap(),
            "\"plonk\""
        );
    }
}
