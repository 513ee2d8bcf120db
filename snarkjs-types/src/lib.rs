#![warn(missing_docs)]
//! This crate defines the values exchanged with snarkjs and utilities to read them from JSON.
//!
//! snarkjs encodes every field element as a decimal string (sometimes as a `0x` hex string)
//! because the values exceed the range of native JSON numbers. [`SignalValue`] is the tagged
//! representation of such untyped values and [`SignalValue::normalize`] turns every encoded
//! integer into an exact [`num_bigint::BigUint`].
#[cfg(feature = "groth16")]
pub mod groth16;
mod scheme;
pub mod serde_compat;
mod signal;
mod witness;

pub use scheme::ProofScheme;
pub use scheme::SchemeParseError;
pub use signal::DecimalString;
pub use signal::HexString;
pub use signal::Scalar;
pub use signal::SignalParseError;
pub use signal::SignalValue;
pub use witness::Witness;

/// The curve name snarkjs writes into its JSON files for BN254.
pub const BN254_CURVE_NAME: &str = "bn128";
