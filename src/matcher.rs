//! Brand resolution over a compiled rule table.
//!
//! A [`BrandMatcher`] compiles every brand pattern once at construction and
//! then answers classification queries without further allocation of regex
//! state. Tables are immutable after load, so a matcher can be shared
//! freely across threads.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::DataError;
use crate::rules::{self, BinPattern, BinRange, Brand, BrandDetails, DetailedBrand};

const BUNDLED_BRANDS: &str = include_str!("../data/brands.json");
const BUNDLED_DETAILED: &str = include_str!("../data/brands-detailed.json");

/// Length guard emitted by the bin data pipeline as a lookahead, e.g.
/// `(?=.{16}$)` or `(?=.{13,16}$)`. The regex engine has no lookaround, so
/// the guard is lifted into explicit digit-count bounds and stripped from
/// the pattern before compilation.
static LENGTH_GUARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\?=\.\{(\d+)(?:,(\d+))?\}\$\)").expect("length guard pattern"));

/// One brand rule, ready to match.
#[derive(Debug)]
struct CompiledBrand {
    /// Digit-count bounds lifted from the full pattern's length guard.
    length: Option<(usize, usize)>,
    full: Regex,
    cvv: Regex,
}

impl CompiledBrand {
    fn accepts(&self, number: &str) -> bool {
        if let Some((min, max)) = self.length {
            if number.len() < min || number.len() > max {
                return false;
            }
        }
        self.full.is_match(number)
    }
}

/// Immutable brand rule table with compiled patterns.
#[derive(Debug)]
pub struct BrandMatcher {
    brands: Vec<Brand>,
    compiled: Vec<CompiledBrand>,
    detailed: Vec<DetailedBrand>,
    /// Compiled sub-pattern BIN regexes, parallel to `detailed`.
    detailed_patterns: Vec<Vec<Regex>>,
}

/// Outcome of a detailed lookup. The detail record is only available when
/// one exists for the winning brand; otherwise the rule fields stand in.
#[derive(Debug, Clone)]
pub enum BrandMatch<'a> {
    /// No detailed record for the winning brand.
    Brand(&'a Brand),
    /// Detailed record, enriched with the sub-pattern and BIN range hit.
    Detailed(DetailedMatch<'a>),
}

impl<'a> BrandMatch<'a> {
    /// Winning brand name, whichever side carries it.
    pub fn name(&self) -> &'a str {
        match self {
            BrandMatch::Brand(brand) => &brand.name,
            BrandMatch::Detailed(found) => &found.info.scheme,
        }
    }
}

/// A detailed match: everything from the detail record except its raw
/// BIN-range table. The one range covering the number is surfaced on its
/// own instead.
#[derive(Debug, Clone)]
pub struct DetailedMatch<'a> {
    pub info: &'a BrandDetails,
    /// First sub-pattern whose BIN regex matched, if any. The scheme-level
    /// rule can match while every sub-pattern misses.
    pub matched_pattern: Option<&'a BinPattern>,
    /// First BIN-range record covering the number's 6-digit prefix, if any.
    pub matched_bin: Option<&'a BinRange>,
}

/// Brand argument to [`BrandMatcher::validate_cvv`]: a bare name, a rule
/// returned by [`BrandMatcher::find_brand`], or a detailed match.
#[derive(Debug, Clone, Copy)]
pub enum BrandRef<'a> {
    Name(&'a str),
    Brand(&'a Brand),
    Detailed(&'a DetailedMatch<'a>),
}

impl<'a> From<&'a str> for BrandRef<'a> {
    fn from(name: &'a str) -> Self {
        BrandRef::Name(name)
    }
}

impl<'a> From<&'a Brand> for BrandRef<'a> {
    fn from(brand: &'a Brand) -> Self {
        BrandRef::Brand(brand)
    }
}

impl<'a> From<&'a DetailedMatch<'a>> for BrandRef<'a> {
    fn from(found: &'a DetailedMatch<'a>) -> Self {
        BrandRef::Detailed(found)
    }
}

impl<'a> From<&'a BrandMatch<'a>> for BrandRef<'a> {
    fn from(found: &'a BrandMatch<'a>) -> Self {
        match found {
            BrandMatch::Brand(brand) => BrandRef::Brand(brand),
            BrandMatch::Detailed(detailed) => BrandRef::Detailed(detailed),
        }
    }
}

impl BrandMatcher {
    /// Build a matcher from already-parsed rule tables, compiling every
    /// pattern once. Fails on a duplicate brand name or a pattern the
    /// regex engine rejects.
    pub fn new(brands: Vec<Brand>, detailed: Vec<DetailedBrand>) -> Result<Self, DataError> {
        for (i, brand) in brands.iter().enumerate() {
            if brands[..i].iter().any(|b| b.name == brand.name) {
                return Err(DataError::DuplicateName(brand.name.clone()));
            }
        }

        let mut compiled = Vec::with_capacity(brands.len());
        for brand in &brands {
            // The BIN pattern is not consulted during matching, but a
            // malformed one must still fail at load rather than later.
            compile_anchored(&brand.name, "regexpBin", &brand.regexp_bin)?;

            let (full_source, length) = lift_length_guard(&brand.regexp_full);
            compiled.push(CompiledBrand {
                length,
                full: compile_anchored(&brand.name, "regexpFull", &full_source)?,
                cvv: compile_anchored(&brand.name, "regexpCvv", &brand.regexp_cvv)?,
            });
        }

        let mut detailed_patterns = Vec::with_capacity(detailed.len());
        for record in &detailed {
            if !brands.iter().any(|b| b.name == record.details.scheme) {
                warn!(scheme = %record.details.scheme, "detailed record has no brand rule");
            }
            let mut bins = Vec::with_capacity(record.details.patterns.len());
            for pattern in &record.details.patterns {
                bins.push(compile_anchored(&record.details.scheme, "bin", &pattern.bin)?);
            }
            detailed_patterns.push(bins);
        }

        debug!(
            brands = brands.len(),
            detailed = detailed.len(),
            "compiled brand rule table"
        );

        Ok(Self {
            brands,
            compiled,
            detailed,
            detailed_patterns,
        })
    }

    /// Build a matcher from the two pipeline JSON documents.
    pub fn from_json(brands_json: &str, detailed_json: &str) -> Result<Self, DataError> {
        Self::new(
            rules::parse_brands(brands_json)?,
            rules::parse_detailed(detailed_json)?,
        )
    }

    /// Build a matcher over the bundled brand data.
    pub fn bundled() -> Result<Self, DataError> {
        Self::from_json(BUNDLED_BRANDS, BUNDLED_DETAILED)
    }

    /// Identify the brand of a card number.
    ///
    /// Patterns match anchored at the first digit and need not consume the
    /// whole number. When several brands match, the first one in table
    /// order with a priority edge over another current candidate wins;
    /// without any edge, the first match wins. Empty and unsupported
    /// numbers return `None`.
    pub fn find_brand(&self, card_number: &str) -> Option<&Brand> {
        if card_number.is_empty() {
            return None;
        }

        let matching: Vec<usize> = (0..self.brands.len())
            .filter(|&i| self.compiled[i].accepts(card_number))
            .collect();

        self.resolve(&matching).map(|i| &self.brands[i])
    }

    /// Pick the winner among the matching rules. Priority edges are direct
    /// only: not transitive, never followed outside the matching set, so
    /// cyclic declarations resolve to whichever candidate comes first in
    /// table order.
    fn resolve(&self, matching: &[usize]) -> Option<usize> {
        if matching.len() > 1 {
            for &i in matching {
                let outranks = self.brands[i].priority_over.iter().any(|name| {
                    matching
                        .iter()
                        .any(|&j| j != i && self.brands[j].name == *name)
                });
                if outranks {
                    return Some(i);
                }
            }
        }
        matching.first().copied()
    }

    /// Identify the brand of a card number and enrich the result with the
    /// detail record for its scheme. Degrades to [`BrandMatch::Brand`]
    /// when no detail record exists.
    pub fn find_brand_detailed(&self, card_number: &str) -> Option<BrandMatch<'_>> {
        let brand = self.find_brand(card_number)?;
        let Some(pos) = self
            .detailed
            .iter()
            .position(|d| d.details.scheme == brand.name)
        else {
            return Some(BrandMatch::Brand(brand));
        };

        let record = &self.detailed[pos];
        let matched_pattern = self.detailed_patterns[pos]
            .iter()
            .position(|bin| bin.is_match(card_number))
            .map(|i| &record.details.patterns[i]);

        // First six digits identify the BIN; shorter inputs are used as-is.
        let prefix = card_number.get(..6).unwrap_or(card_number);
        let matched_bin = record
            .bins
            .iter()
            .find(|range| prefix.starts_with(range.bin.as_str()));

        Some(BrandMatch::Detailed(DetailedMatch {
            info: &record.details,
            matched_pattern,
            matched_bin,
        }))
    }

    /// Whether the card number belongs to any known brand.
    pub fn is_supported(&self, card_number: &str) -> bool {
        self.find_brand(card_number).is_some()
    }

    /// Validate a CVV for a brand. Returns `false` for an empty CVV or an
    /// unknown brand name rather than erroring.
    pub fn validate_cvv<'a>(&self, cvv: &str, brand: impl Into<BrandRef<'a>>) -> bool {
        if cvv.is_empty() {
            return false;
        }

        match brand.into() {
            BrandRef::Detailed(found) => {
                // Exactly the declared number of digits, nothing else.
                let expected = found.info.cvv.length as usize;
                cvv.len() == expected && cvv.bytes().all(|b| b.is_ascii_digit())
            }
            BrandRef::Brand(brand) => self.cvv_matches(cvv, &brand.name),
            BrandRef::Name(name) => self.cvv_matches(cvv, name),
        }
    }

    fn cvv_matches(&self, cvv: &str, name: &str) -> bool {
        self.brands
            .iter()
            .position(|b| b.name == name)
            .is_some_and(|i| self.compiled[i].cvv.is_match(cvv))
    }

    /// Look up a brand rule by name.
    pub fn brand_info(&self, name: &str) -> Option<&Brand> {
        self.brands.iter().find(|b| b.name == name)
    }

    /// Look up a detail record by scheme name.
    pub fn brand_info_detailed(&self, scheme: &str) -> Option<&DetailedBrand> {
        self.detailed.iter().find(|d| d.details.scheme == scheme)
    }

    /// All brand names, in table order.
    pub fn list_brands(&self) -> Vec<&str> {
        self.brands.iter().map(|b| b.name.as_str()).collect()
    }
}

/// Compile `pattern` so it must match starting at the first byte, the way
/// `re.match` behaves: the pattern does not have to consume the whole
/// input, full-length rules carry their own `$`.
fn compile_anchored(brand: &str, field: &'static str, pattern: &str) -> Result<Regex, DataError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| DataError::BadPattern {
        brand: brand.to_string(),
        field,
        source: Box::new(source),
    })
}

/// Split a full pattern into its regex body and the digit-count bounds
/// encoded by its lookahead length guard, if one is present.
fn lift_length_guard(pattern: &str) -> (Cow<'_, str>, Option<(usize, usize)>) {
    let Some(caps) = LENGTH_GUARD.captures(pattern) else {
        return (Cow::Borrowed(pattern), None);
    };

    let min: Option<usize> = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let max: Option<usize> = match caps.get(2) {
        Some(m) => m.as_str().parse().ok(),
        None => min,
    };

    match (min, max) {
        (Some(min), Some(max)) => (LENGTH_GUARD.replace_all(pattern, ""), Some((min, max))),
        // Unreadable bounds: leave the guard in place and let compilation
        // report the pattern as-is.
        _ => (Cow::Borrowed(pattern), None),
    }
}
