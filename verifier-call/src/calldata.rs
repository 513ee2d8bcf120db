//! Calldata for the `verifyProof` entry points.
//!
//! The string format is the one snarkjs prints from `zkey export soliditycalldata`:
//!
//! - Groth16: `["0x..", "0x.."],[["0x..", "0x.."],["0x..", "0x.."]],["0x..", "0x.."],["0x..",..]`
//! - PLONK: `0x<proof>,["0x..",..]`
use alloy_primitives::{Bytes, U256};
use ark_bn254::{Bn254, Fr};
use ark_groth16::Proof;
use num_bigint::BigUint;
use snarkjs_types::{ProofScheme, SignalValue};
use tracing::instrument;

/// G1 points of a snarkjs PLONK proof, in the order the verifier reads them.
const PLONK_POINTS: [&str; 9] = ["A", "B", "C", "Z", "T1", "T2", "T3", "Wxi", "Wxiw"];
/// Evaluations of a snarkjs PLONK proof, in the order the verifier reads them.
const PLONK_EVALUATIONS: [&str; 6] = [
    "eval_a", "eval_b", "eval_c", "eval_s1", "eval_s2", "eval_zw",
];
/// Only written by older snarkjs releases.
const PLONK_OPTIONAL_EVALUATION: &str = "eval_r";
/// Number of leading calldata elements that make up a Groth16 proof.
const GROTH16_PROOF_ELEMENTS: usize = 8;

/// Errors that can occur while building or parsing calldata.
#[derive(Debug, thiserror::Error)]
pub enum CalldataError {
    /// The proof lacks a required element.
    #[error("proof has no element {0}")]
    MissingElement(String),
    /// A proof element or public signal is not an integer.
    #[error("{0} is not an integer")]
    NotAnInteger(String),
    /// A value is wider than a `uint256`.
    #[error("{0} does not fit into 256 bits")]
    Overflow(String),
    /// The public signals are not a sequence.
    #[error("public signals must be a sequence")]
    SignalsNotSequence,
    /// The calldata has fewer elements than a Groth16 proof needs.
    #[error("expected at least {expected} calldata elements but got {actual}")]
    TooFewElements {
        /// Minimum number of elements
        expected: usize,
        /// Number of elements found
        actual: usize,
    },
    /// A calldata element is not a decimal or 0x-hex `uint256`.
    #[error("invalid calldata element {0:?}")]
    InvalidElement(String),
    /// PLONK calldata is not `<proof hex>,[<inputs>]`.
    #[error("malformed PLONK calldata: {0}")]
    MalformedPlonk(&'static str),
    /// The PLONK proof is not valid hex.
    #[error(transparent)]
    InvalidHex(#[from] hex::FromHexError),
}

/// Positional arguments of `verifyProof(uint256[2],uint256[2][2],uint256[2],uint256[])`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groth16CallArgs {
    /// Proof element A
    pub a: [U256; 2],
    /// Proof element B, each coordinate as `[c1, c0]`
    pub b: [[U256; 2]; 2],
    /// Proof element C
    pub c: [U256; 2],
    /// Public signals
    pub input: Vec<U256>,
}

/// Positional arguments of `verifyProof(bytes,uint256[])`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlonkCallArgs {
    /// The encoded proof
    pub proof: Bytes,
    /// Public signals
    pub input: Vec<U256>,
}

/// Arguments for one of the two verifier calling conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgs {
    /// Groth16 calling convention
    Groth16(Groth16CallArgs),
    /// PLONK calling convention
    Plonk(PlonkCallArgs),
}

impl Groth16CallArgs {
    /// All-zero proof points with `num_inputs` zero public signals.
    pub fn zeroed(num_inputs: usize) -> Self {
        Self {
            input: vec![U256::ZERO; num_inputs],
            ..Default::default()
        }
    }

    /// Builds the arguments from an arkworks proof and its public inputs.
    pub fn from_proof(proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Self {
        let [ax, ay, bx1, bx0, by1, by0, cx, cy] = crate::prepare_uncompressed_proof(proof);
        Self {
            a: [ax, ay],
            b: [[bx1, bx0], [by1, by0]],
            c: [cx, cy],
            input: public_inputs.iter().map(|x| (*x).into()).collect(),
        }
    }

    /// Every argument as a decimal string, in positional order.
    pub fn argv(&self) -> Vec<String> {
        self.a
            .iter()
            .chain(self.b.iter().flatten())
            .chain(self.c.iter())
            .chain(self.input.iter())
            .map(|x| x.to_string())
            .collect()
    }
}

impl PlonkCallArgs {
    /// The proof as 0x-hex followed by every public signal as a decimal string.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(format!("0x{}", hex::encode(&self.proof)))
            .chain(self.input.iter().map(|x| x.to_string()))
            .collect()
    }
}

impl CallArgs {
    /// The calling convention these arguments are shaped for.
    pub fn scheme(&self) -> ProofScheme {
        match self {
            CallArgs::Groth16(_) => ProofScheme::Groth16,
            CallArgs::Plonk(_) => ProofScheme::Plonk,
        }
    }

    /// The public signals.
    pub fn input(&self) -> &[U256] {
        match self {
            CallArgs::Groth16(args) => &args.input,
            CallArgs::Plonk(args) => &args.input,
        }
    }

    /// See [`Groth16CallArgs::argv`] and [`PlonkCallArgs::argv`].
    pub fn argv(&self) -> Vec<String> {
        match self {
            CallArgs::Groth16(args) => args.argv(),
            CallArgs::Plonk(args) => args.argv(),
        }
    }
}

impl From<Groth16CallArgs> for CallArgs {
    fn from(args: Groth16CallArgs) -> Self {
        CallArgs::Groth16(args)
    }
}

impl From<PlonkCallArgs> for CallArgs {
    fn from(args: PlonkCallArgs) -> Self {
        CallArgs::Plonk(args)
    }
}

/// Serializes a proof and its public signals into the snarkjs calldata string for `scheme`.
///
/// `proof` and `public_signals` are the values returned by the prover; integer leaves may be
/// in any encoding, see [`SignalValue::as_integer`].
#[instrument(level = "debug", skip(proof, public_signals))]
pub fn export_solidity_calldata(
    scheme: ProofScheme,
    proof: &SignalValue,
    public_signals: &SignalValue,
) -> Result<String, CalldataError> {
    let inputs = public_signals
        .as_sequence()
        .ok_or(CalldataError::SignalsNotSequence)?
        .iter()
        .enumerate()
        .map(|(i, signal)| {
            let name = format!("publicSignals[{i}]");
            let value = signal
                .as_integer()
                .ok_or_else(|| CalldataError::NotAnInteger(name.clone()))?;
            p256(value, &name)
        })
        .collect::<Result<Vec<_>, _>>()?
        .join(",");

    match scheme {
        ProofScheme::Groth16 => {
            let a = [coordinate(proof, "pi_a", &[0])?, coordinate(proof, "pi_a", &[1])?];
            let b = [
                [
                    coordinate(proof, "pi_b", &[0, 1])?,
                    coordinate(proof, "pi_b", &[0, 0])?,
                ],
                [
                    coordinate(proof, "pi_b", &[1, 1])?,
                    coordinate(proof, "pi_b", &[1, 0])?,
                ],
            ];
            let c = [coordinate(proof, "pi_c", &[0])?, coordinate(proof, "pi_c", &[1])?];
            Ok(format!(
                "[{}, {}],[[{}, {}],[{}, {}]],[{}, {}],[{inputs}]",
                a[0], a[1], b[0][0], b[0][1], b[1][0], b[1][1], c[0], c[1]
            ))
        }
        ProofScheme::Plonk => {
            let mut blob = Vec::with_capacity(32 * (2 * PLONK_POINTS.len() + 7));
            for key in PLONK_POINTS {
                blob.extend_from_slice(&be32(integer_at(proof, key, &[0])?, key)?);
                blob.extend_from_slice(&be32(integer_at(proof, key, &[1])?, key)?);
            }
            for key in PLONK_EVALUATIONS {
                blob.extend_from_slice(&be32(integer_at(proof, key, &[])?, key)?);
            }
            if proof.get(PLONK_OPTIONAL_EVALUATION).is_some() {
                let eval_r = integer_at(proof, PLONK_OPTIONAL_EVALUATION, &[])?;
                blob.extend_from_slice(&be32(eval_r, PLONK_OPTIONAL_EVALUATION)?);
            }
            Ok(format!("0x{},[{inputs}]", hex::encode(blob)))
        }
    }
}

/// Parses a snarkjs calldata string into the positional arguments of the `scheme` entry point.
///
/// Groth16: quotes, brackets and whitespace are removed and the remaining comma separated
/// elements are read in order as `a` (2), `b` (2x2), `c` (2) and the public signals.
/// PLONK: everything before the first comma is the hex encoded proof, the bracketed array after
/// it holds the public signals.
#[instrument(level = "debug", skip(calldata))]
pub fn to_calldata_args(calldata: &str, scheme: ProofScheme) -> Result<CallArgs, CalldataError> {
    match scheme {
        ProofScheme::Groth16 => {
            let argv = parse_elements(calldata)?;
            if argv.len() < GROTH16_PROOF_ELEMENTS {
                return Err(CalldataError::TooFewElements {
                    expected: GROTH16_PROOF_ELEMENTS,
                    actual: argv.len(),
                });
            }
            tracing::debug!("parsed {} Groth16 calldata elements", argv.len());
            Ok(CallArgs::Groth16(Groth16CallArgs {
                a: [argv[0], argv[1]],
                b: [[argv[2], argv[3]], [argv[4], argv[5]]],
                c: [argv[6], argv[7]],
                input: argv[GROTH16_PROOF_ELEMENTS..].to_vec(),
            }))
        }
        ProofScheme::Plonk => {
            let (proof, inputs) = calldata
                .split_once(',')
                .ok_or(CalldataError::MalformedPlonk("missing public signal array"))?;
            let digits = strip_decoration(proof);
            let digits = digits
                .strip_prefix("0x")
                .ok_or(CalldataError::MalformedPlonk("proof is not 0x-prefixed hex"))?;
            let proof = Bytes::from(hex::decode(digits)?);
            let input = parse_elements(inputs)?;
            tracing::debug!(
                "parsed PLONK calldata with {} proof bytes and {} public signals",
                proof.len(),
                input.len()
            );
            Ok(CallArgs::Plonk(PlonkCallArgs { proof, input }))
        }
    }
}

fn strip_decoration(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, '"' | '[' | ']') && !c.is_whitespace())
        .collect()
}

fn parse_elements(calldata: &str) -> Result<Vec<U256>, CalldataError> {
    let tokens = calldata.split(',').collect::<Vec<_>>();
    let last = tokens.len() - 1;
    let mut elements = Vec::with_capacity(tokens.len());
    for (i, raw) in tokens.into_iter().enumerate() {
        let token = strip_decoration(raw);
        if token.is_empty() {
            // only a trailing empty array `[]` may contribute no element
            let raw = raw.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            if i == last && raw.ends_with("[]") {
                continue;
            }
            return Err(CalldataError::InvalidElement(token));
        }
        elements.push(
            token
                .parse::<U256>()
                .map_err(|_| CalldataError::InvalidElement(token))?,
        );
    }
    Ok(elements)
}

fn render_path(key: &str, path: &[usize]) -> String {
    path.iter().fold(key.to_owned(), |mut name, i| {
        name.push_str(&format!("[{i}]"));
        name
    })
}

fn integer_at<'a>(
    proof: &'a SignalValue,
    key: &str,
    path: &[usize],
) -> Result<&'a BigUint, CalldataError> {
    let mut value = proof
        .get(key)
        .ok_or_else(|| CalldataError::MissingElement(key.to_owned()))?;
    for (depth, index) in path.iter().enumerate() {
        value = value
            .at(*index)
            .ok_or_else(|| CalldataError::MissingElement(render_path(key, &path[..=depth])))?;
    }
    value
        .as_integer()
        .ok_or_else(|| CalldataError::NotAnInteger(render_path(key, path)))
}

fn coordinate(proof: &SignalValue, key: &str, path: &[usize]) -> Result<String, CalldataError> {
    p256(integer_at(proof, key, path)?, &render_path(key, path))
}

fn p256(value: &BigUint, name: &str) -> Result<String, CalldataError> {
    if value.bits() > 256 {
        return Err(CalldataError::Overflow(name.to_owned()));
    }
    Ok(format!("\"0x{:0>64}\"", value.to_str_radix(16)))
}

fn be32(value: &BigUint, name: &str) -> Result<[u8; 32], CalldataError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(CalldataError::Overflow(name.to_owned()));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use ark_bn254::Fr;
    use serde_json::json;
    use snarkjs_types::{ProofScheme, SignalValue, groth16::PublicInput};

    use super::*;
    use crate::test_utils::prove_multiply;

    const BN254_Q: &str =
        "21888242871839275222246405745257275088696311157297823662689037894645226208583";

    fn groth16_proof_json() -> SignalValue {
        SignalValue::from(json!({
            "pi_a": ["1", "2", "1"],
            "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
            "pi_c": ["7", "8", "1"],
            "protocol": "groth16",
            "curve": "bn128",
        }))
        .normalize()
    }

    fn plonk_proof_json(with_eval_r: bool) -> SignalValue {
        let mut proof = json!({"protocol": "plonk", "curve": "bn128"});
        for (i, key) in PLONK_POINTS.iter().enumerate() {
            proof[*key] = json!([(2 * i + 1).to_string(), (2 * i + 2).to_string(), "1"]);
        }
        for (i, key) in PLONK_EVALUATIONS.iter().enumerate() {
            proof[*key] = json!((100 + i).to_string());
        }
        if with_eval_r {
            proof["eval_r"] = json!("0xff");
        }
        SignalValue::from(proof).normalize()
    }

    #[test]
    fn groth16_export_matches_snarkjs_layout() {
        let signals = SignalValue::from(json!(["2"])).normalize();
        let calldata =
            export_solidity_calldata(ProofScheme::Groth16, &groth16_proof_json(), &signals).unwrap();
        let word = |n: u8| format!("\"0x{:0>64}\"", n);
        assert_eq!(
            calldata,
            format!(
                "[{}, {}],[[{}, {}],[{}, {}]],[{}, {}],[{}]",
                word(1),
                word(2),
                word(4),
                word(3),
                word(6),
                word(5),
                word(7),
                word(8),
                word(2)
            )
        );
    }

    #[test]
    fn groth16_round_trip_through_calldata() {
        let signals = SignalValue::from(json!(["6", "0x10"]));
        let calldata =
            export_solidity_calldata(ProofScheme::Groth16, &groth16_proof_json(), &signals).unwrap();
        let CallArgs::Groth16(args) = to_calldata_args(&calldata, ProofScheme::Groth16).unwrap()
        else {
            panic!("expected Groth16 arguments");
        };
        assert_eq!(args.a, [U256::from(1), U256::from(2)]);
        assert_eq!(
            args.b,
            [[U256::from(4), U256::from(3)], [U256::from(6), U256::from(5)]]
        );
        assert_eq!(args.c, [U256::from(7), U256::from(8)]);
        assert_eq!(args.input, vec![U256::from(6), U256::from(16)]);
        assert_eq!(args.argv(), ["1", "2", "4", "3", "6", "5", "7", "8", "6", "16"]);
    }

    #[test]
    fn groth16_calldata_matches_prepared_proof() {
        let (_, proof, output) = prove_multiply(2, 3);
        let public = PublicInput::from(vec![output]);
        let proof_json =
            SignalValue::from(serde_json::to_value(snarkjs_types::groth16::Proof::from(proof.clone())).unwrap())
                .normalize();
        let calldata =
            export_solidity_calldata(ProofScheme::Groth16, &proof_json, &public.to_signal_value())
                .unwrap();
        let args = to_calldata_args(&calldata, ProofScheme::Groth16).unwrap();
        assert_eq!(
            args,
            CallArgs::Groth16(Groth16CallArgs::from_proof(&proof, &[Fr::from(6u64)]))
        );
    }

    #[test]
    fn full_width_values_keep_precision() {
        let proof = SignalValue::from(json!({
            "pi_a": [BN254_Q, "0", "1"],
            "pi_b": [["0", "0"], ["0", "0"], ["1", "0"]],
            "pi_c": ["0", "0", "1"],
        }));
        let calldata =
            export_solidity_calldata(ProofScheme::Groth16, &proof, &SignalValue::from(json!([])))
                .unwrap();
        let args = to_calldata_args(&calldata, ProofScheme::Groth16).unwrap();
        let CallArgs::Groth16(args) = args else {
            panic!("expected Groth16 arguments");
        };
        assert_eq!(args.a[0].to_string(), BN254_Q);
        assert!(args.input.is_empty());
    }

    #[test]
    fn groth16_export_reports_missing_and_malformed_elements() {
        let signals = SignalValue::from(json!([]));
        let proof = SignalValue::from(json!({"pi_a": ["1", "2", "1"], "pi_b": [["3"]]}));
        assert!(matches!(
            export_solidity_calldata(ProofScheme::Groth16, &proof, &signals),
            Err(CalldataError::MissingElement(name)) if name == "pi_b[0][1]"
        ));
        let proof = SignalValue::from(json!({"pi_a": ["x", "2", "1"]}));
        assert!(matches!(
            export_solidity_calldata(ProofScheme::Groth16, &proof, &signals),
            Err(CalldataError::NotAnInteger(name)) if name == "pi_a[0]"
        ));
        assert!(matches!(
            export_solidity_calldata(
                ProofScheme::Groth16,
                &groth16_proof_json(),
                &SignalValue::from(json!({"0": "1"}))
            ),
            Err(CalldataError::SignalsNotSequence)
        ));
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(matches!(
            export_solidity_calldata(
                ProofScheme::Groth16,
                &groth16_proof_json(),
                &SignalValue::from(json!([too_wide]))
            ),
            Err(CalldataError::Overflow(_))
        ));
    }

    #[test]
    fn groth16_parse_rejects_short_or_invalid_calldata() {
        assert!(matches!(
            to_calldata_args("[\"0x1\", \"0x2\"],[[\"0x3\"]]", ProofScheme::Groth16),
            Err(CalldataError::TooFewElements {
                expected: 8,
                actual: 3
            })
        ));
        assert!(matches!(
            to_calldata_args("1,2,3,4,5,6,7,8,nine", ProofScheme::Groth16),
            Err(CalldataError::InvalidElement(token)) if token == "nine"
        ));
    }

    #[test]
    fn plonk_export_concatenates_points_and_evaluations() {
        let signals = SignalValue::from(json!(["6"]));
        let calldata =
            export_solidity_calldata(ProofScheme::Plonk, &plonk_proof_json(false), &signals)
                .unwrap();
        let (proof, inputs) = calldata.split_once(',').unwrap();
        assert_eq!(proof.len(), 2 + 64 * (18 + 6));
        assert!(proof.starts_with(&format!("0x{:0>64}{:0>64}", 1, 2)));
        assert!(proof.ends_with(&format!("{:0>64x}", 105)));
        assert_eq!(inputs, format!("[\"0x{:0>64}\"]", 6));

        let with_r =
            export_solidity_calldata(ProofScheme::Plonk, &plonk_proof_json(true), &signals)
                .unwrap();
        assert!(with_r.split_once(',').unwrap().0.ends_with(&format!("{:0>64}", "ff")));
    }

    #[test]
    fn plonk_round_trip_through_calldata() {
        let signals = SignalValue::from(json!(["6", "7"]));
        let calldata =
            export_solidity_calldata(ProofScheme::Plonk, &plonk_proof_json(false), &signals)
                .unwrap();
        let CallArgs::Plonk(args) = to_calldata_args(&calldata, ProofScheme::Plonk).unwrap() else {
            panic!("expected PLONK arguments");
        };
        assert_eq!(args.proof.len(), 32 * 24);
        assert_eq!(args.proof[31], 1);
        assert_eq!(args.input, vec![U256::from(6), U256::from(7)]);
        assert_eq!(args.argv()[1..], ["6", "7"]);
        assert_eq!(args.argv()[0], calldata.split_once(',').unwrap().0);
    }

    #[test]
    fn plonk_parse_rejects_malformed_calldata() {
        assert!(matches!(
            to_calldata_args("0x00", ProofScheme::Plonk),
            Err(CalldataError::MalformedPlonk(_))
        ));
        assert!(matches!(
            to_calldata_args("00,[\"0x1\"]", ProofScheme::Plonk),
            Err(CalldataError::MalformedPlonk(_))
        ));
        assert!(matches!(
            to_calldata_args("0xzz,[\"0x1\"]", ProofScheme::Plonk),
            Err(CalldataError::InvalidHex(_))
        ));
    }

    #[test]
    fn empty_elements_are_rejected() {
        let groth16 = "[\"0x1\",,\"0x2\"],[[\"0x3\",\"0x4\"],[\"0x5\",\"0x6\"]],[\"0x7\",\"0x8\"],[\"0x9\"]";
        assert!(matches!(
            to_calldata_args(groth16, ProofScheme::Groth16),
            Err(CalldataError::InvalidElement(token)) if token.is_empty()
        ));
        let groth16 = "[\"0x1\",\"0x2\"],[[\"0x3\",\"0x4\"],[\"0x5\",\"0x6\"]],[\"0x7\",\"0x8\"],[\"0x9\",]";
        assert!(matches!(
            to_calldata_args(groth16, ProofScheme::Groth16),
            Err(CalldataError::InvalidElement(token)) if token.is_empty()
        ));
        assert!(matches!(
            to_calldata_args("0x00,[\"0x1\",,\"0x2\"]", ProofScheme::Plonk),
            Err(CalldataError::InvalidElement(token)) if token.is_empty()
        ));
    }

    #[test]
    fn empty_public_array_yields_no_inputs() {
        let groth16 = "[\"0x1\",\"0x2\"],[[\"0x3\",\"0x4\"],[\"0x5\",\"0x6\"]],[\"0x7\",\"0x8\"],[]";
        let CallArgs::Groth16(args) = to_calldata_args(groth16, ProofScheme::Groth16).unwrap() else {
            panic!("expected Groth16 arguments");
        };
        assert_eq!(args.c, [U256::from(7), U256::from(8)]);
        assert!(args.input.is_empty());

        let CallArgs::Plonk(args) = to_calldata_args("0x00, []", ProofScheme::Plonk).unwrap() else {
            panic!("expected PLONK arguments");
        };
        assert!(args.input.is_empty());
    }

    #[test]
    fn plonk_export_requires_all_points() {
        let mut proof = plonk_proof_json(false);
        if let SignalValue::Mapping(entries) = &mut proof {
            entries.remove("Wxiw");
        }
        assert!(matches!(
            export_solidity_calldata(ProofScheme::Plonk, &proof, &SignalValue::from(json!([]))),
            Err(CalldataError::MissingElement(name)) if name == "Wxiw"
        ));
    }

    #[test]
    fn zeroed_args_have_requested_inputs() {
        let args = Groth16CallArgs::zeroed(1);
        assert_eq!(args.argv(), vec!["0"; 9]);
        assert_eq!(CallArgs::from(args).scheme(), ProofScheme::Groth16);
    }
}
