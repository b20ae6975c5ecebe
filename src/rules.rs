//! Brand rule source records.
//!
//! Mirrors the JSON documents produced by the bin data pipeline: a flat
//! list of per-brand regex rules, plus an optional detailed table keyed by
//! scheme. Field names stay camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One brand rule from the simplified table.
///
/// The `regexp_*` fields hold pattern source text, not compiled regexes;
/// compilation happens once when a [`BrandMatcher`](crate::BrandMatcher)
/// is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    /// Unique brand identifier, e.g. `"visa"`.
    pub name: String,
    /// Brand names this rule outranks when both match the same number.
    /// May name brands that are not in the table; such edges are simply
    /// inert at match time.
    #[serde(default)]
    pub priority_over: Vec<String>,
    /// Prefix pattern over the leading digits.
    pub regexp_bin: String,
    /// Pattern over the whole number, length constraints included.
    pub regexp_full: String,
    /// CVV format pattern.
    pub regexp_cvv: String,
}

/// One scheme record from the detailed table: issuer metadata plus the
/// sub-pattern and BIN-range breakdown behind the scheme-level rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedBrand {
    #[serde(flatten)]
    pub details: BrandDetails,
    /// Explicit BIN-range records. Kept out of [`BrandDetails`] so match
    /// results can carry everything else without dragging this table along.
    #[serde(default)]
    pub bins: Vec<BinRange>,
}

/// Every detailed field except the raw `bins` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDetails {
    /// Scheme identifier; ties back to [`Brand::name`].
    pub scheme: String,
    /// Display name, e.g. `"American Express"`.
    pub brand: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub priority_over: Vec<String>,
    pub number: NumberFormat,
    pub cvv: CvvFormat,
    /// Ordered sub-pattern descriptors; a stricter partition of the
    /// scheme-level rule, possibly incomplete.
    pub patterns: Vec<BinPattern>,
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Card number shape for a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub lengths: Vec<u32>,
    pub luhn: bool,
}

/// CVV shape for a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvvFormat {
    pub length: u32,
}

/// One sub-pattern descriptor inside a detailed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinPattern {
    /// BIN prefix pattern for this sub-range.
    pub bin: String,
    pub length: LengthSpec,
    pub luhn: bool,
    pub cvv_length: u32,
}

/// Number-length constraint: a single length or a set of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthSpec {
    Exact(u32),
    OneOf(Vec<u32>),
}

/// One explicit BIN-range record: a literal digit prefix plus issuer
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinRange {
    /// Literal BIN prefix, 6-8 digits.
    pub bin: String,
    #[serde(rename = "type", default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub countries: Option<Vec<String>>,
}

/// Parse a simplified brand table document.
pub fn parse_brands(json: &str) -> Result<Vec<Brand>, DataError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a detailed brand table document.
pub fn parse_detailed(json: &str) -> Result<Vec<DetailedBrand>, DataError> {
    Ok(serde_json::from_str(json)?)
}
