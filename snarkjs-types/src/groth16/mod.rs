//! This module defines the Groth16 files written by snarkjs and their conversions to arkworks.
mod proof;
mod public_input;
mod verification_key;

pub use proof::Proof;
pub use public_input::PublicInput;
pub use verification_key::VerificationKey;
