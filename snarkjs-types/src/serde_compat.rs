//! Serde helpers for BN254 values in the JSON layout written by snarkjs.
//!
//! Field elements are decimal strings. Points are written in projective form: a G1 point is
//! `[x, y, z]` and a G2 point is `[[x0, x1], [y0, y1], [z0, z1]]`. snarkjs always normalizes
//! to `z = 1` before writing, and the point at infinity is `["0", "1", "0"]`.
//!
//! Use the functions with serde's field attributes:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct MyStruct {
//!     #[serde(serialize_with = "snarkjs_types::serde_compat::serialize_g1")]
//!     #[serde(deserialize_with = "snarkjs_types::serde_compat::deserialize_g1")]
//!     point: ark_bn254::G1Affine,
//! }
//! ```
use std::{marker::PhantomData, str::FromStr};

use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use num_bigint::BigUint;
use serde::{Deserialize, Serializer, de, ser::SerializeSeq as _};

/// Renders a prime field element as its canonical decimal string.
pub fn field_to_decimal<F: PrimeField>(f: &F) -> String {
    let value: BigUint = (*f).into();
    value.to_str_radix(10)
}

/// Parses a canonical decimal string into a prime field element.
///
/// Returns `None` for anything that is not a plain decimal number below the field modulus.
/// Unlike `F::from_str`, out-of-range values are rejected instead of reduced.
pub fn field_from_decimal<F: PrimeField>(s: &str) -> Option<F> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = BigUint::from_str(s).ok()?;
    let bigint = F::BigInt::try_from(value).ok()?;
    F::from_bigint(bigint)
}

/// Serialize a prime field element as a decimal string.
pub fn serialize_f<S: Serializer>(p: &impl PrimeField, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&field_to_decimal(p))
}

/// Serialize a sequence of prime field elements as an array of decimal strings.
pub fn serialize_f_seq<S: Serializer, F: PrimeField>(ps: &[F], ser: S) -> Result<S::Ok, S::Error> {
    let mut seq = ser.serialize_seq(Some(ps.len()))?;
    for p in ps {
        seq.serialize_element(&field_to_decimal(p))?;
    }
    seq.end()
}

/// Deserialize a prime field element from a decimal string.
pub fn deserialize_f<'de, F, D>(deserializer: D) -> Result<F, D::Error>
where
    D: de::Deserializer<'de>,
    F: PrimeField,
{
    deserializer.deserialize_str(PrimeFieldVisitor::<F>(PhantomData))
}

/// Deserialize a sequence of prime field elements from an array of decimal strings.
pub fn deserialize_f_seq<'de, D, F>(deserializer: D) -> Result<Vec<F>, D::Error>
where
    D: de::Deserializer<'de>,
    F: PrimeField,
{
    deserializer.deserialize_seq(PrimeFieldSeqVisitor::<F>(PhantomData))
}

/// Serialize a G1 point as `[x, y, "1"]`, or `["0", "1", "0"]` for the point at infinity.
pub fn serialize_g1<S: Serializer>(p: &G1Affine, ser: S) -> Result<S::Ok, S::Error> {
    let strings = g1_to_strings_projective(p);
    let mut seq = ser.serialize_seq(Some(strings.len()))?;
    for ele in strings {
        seq.serialize_element(&ele)?;
    }
    seq.end()
}

/// Serialize a G2 point as `[[x0, x1], [y0, y1], ["1", "0"]]`.
///
/// The point at infinity is `[["0", "0"], ["1", "0"], ["0", "0"]]`.
pub fn serialize_g2<S: Serializer>(p: &G2Affine, ser: S) -> Result<S::Ok, S::Error> {
    let mut seq = ser.serialize_seq(Some(3))?;
    match p.xy() {
        Some((x, y)) => {
            seq.serialize_element(&[field_to_decimal(&x.c0), field_to_decimal(&x.c1)])?;
            seq.serialize_element(&[field_to_decimal(&y.c0), field_to_decimal(&y.c1)])?;
            seq.serialize_element(&["1", "0"])?;
        }
        None => {
            seq.serialize_element(&["0", "0"])?;
            seq.serialize_element(&["1", "0"])?;
            seq.serialize_element(&["0", "0"])?;
        }
    }
    seq.end()
}

/// Serialize a sequence of G1 points as an array of `[x, y, z]` arrays.
pub fn serialize_g1_seq<S: Serializer>(ps: &[G1Affine], ser: S) -> Result<S::Ok, S::Error> {
    let mut seq = ser.serialize_seq(Some(ps.len()))?;
    for p in ps {
        seq.serialize_element(&g1_to_strings_projective(p))?;
    }
    seq.end()
}

/// Deserialize a G1 point from `[x, y, z]` decimal strings.
///
/// Performs on-curve and subgroup checks.
pub fn deserialize_g1<'de, D>(deserializer: D) -> Result<G1Affine, D::Error>
where
    D: de::Deserializer<'de>,
{
    let strings = <[String; 3]>::deserialize(deserializer)?;
    g1_from_strings_projective(&strings).map_err(de::Error::custom)
}

/// Deserialize a G2 point from `[[x0, x1], [y0, y1], [z0, z1]]` decimal strings.
///
/// Performs on-curve and subgroup checks.
pub fn deserialize_g2<'de, D>(deserializer: D) -> Result<G2Affine, D::Error>
where
    D: de::Deserializer<'de>,
{
    let strings = <[[String; 2]; 3]>::deserialize(deserializer)?;
    g2_from_strings_projective(&strings).map_err(de::Error::custom)
}

/// Deserialize a sequence of G1 points from an array of `[x, y, z]` arrays.
pub fn deserialize_g1_seq<'de, D>(deserializer: D) -> Result<Vec<G1Affine>, D::Error>
where
    D: de::Deserializer<'de>,
{
    let points = Vec::<[String; 3]>::deserialize(deserializer)?;
    points
        .iter()
        .map(|strings| g1_from_strings_projective(strings).map_err(de::Error::custom))
        .collect()
}

fn g1_to_strings_projective(p: &G1Affine) -> [String; 3] {
    if let Some((x, y)) = p.xy() {
        [field_to_decimal(&x), field_to_decimal(&y), "1".to_owned()]
    } else {
        //point at infinity
        ["0".to_owned(), "1".to_owned(), "0".to_owned()]
    }
}

fn parse_fq(s: &str) -> Result<Fq, String> {
    field_from_decimal(s).ok_or_else(|| format!("invalid base field element: {s:?}"))
}

fn g1_from_strings_projective(strings: &[String; 3]) -> Result<G1Affine, String> {
    let [x, y, z] = strings;
    let z = parse_fq(z)?;
    if z.is_zero() {
        return Ok(G1Affine::zero());
    }
    if z != Fq::from(1u64) {
        return Err(format!("expected normalized point with z = 1, got z = {z}"));
    }
    let p = G1Affine::new_unchecked(parse_fq(x)?, parse_fq(y)?);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err("G1 point is not on the curve or not in the prime-order subgroup".to_owned());
    }
    Ok(p)
}

fn g2_from_strings_projective(strings: &[[String; 2]; 3]) -> Result<G2Affine, String> {
    let [[x0, x1], [y0, y1], [z0, z1]] = strings;
    let z = Fq2::new(parse_fq(z0)?, parse_fq(z1)?);
    if z.is_zero() {
        return Ok(G2Affine::zero());
    }
    if z != Fq2::new(Fq::from(1u64), Fq::zero()) {
        return Err("expected normalized G2 point with z = 1".to_owned());
    }
    let x = Fq2::new(parse_fq(x0)?, parse_fq(x1)?);
    let y = Fq2::new(parse_fq(y0)?, parse_fq(y1)?);
    let p = G2Affine::new_unchecked(x, y);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err("G2 point is not on the curve or not in the prime-order subgroup".to_owned());
    }
    Ok(p)
}

struct PrimeFieldVisitor<F>(PhantomData<F>);

struct PrimeFieldSeqVisitor<F>(PhantomData<F>);

impl<'de, F: PrimeField> de::Visitor<'de> for PrimeFieldVisitor<F> {
    type Value = F;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal string below the field modulus")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        field_from_decimal(v).ok_or_else(|| E::custom(format!("invalid field element: {v:?}")))
    }
}

impl<'de, F: PrimeField> de::Visitor<'de> for PrimeFieldSeqVisitor<F> {
    type Value = Vec<F>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of decimal strings")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(s) = seq.next_element::<String>()? {
            values.push(field_from_decimal(&s).ok_or_else(|| {
                de::Error::custom(format!("invalid field element: {s:?}"))
            })?);
        }
        Ok(values)
    }
}
