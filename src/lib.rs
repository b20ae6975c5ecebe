//! Card brand identification and validation.
//!
//! Matches a card number against a table of per-brand regex rules, with
//! declared priority edges resolving overlapping BIN ranges. Also validates
//! CVV formats and Luhn checksums. Rule tables compile once at load and are
//! read-shared from then on.

mod error;
mod matcher;
mod rules;
mod validators;

pub use error::DataError;
pub use matcher::{BrandMatch, BrandMatcher, BrandRef, DetailedMatch};
pub use rules::{
    parse_brands, parse_detailed, BinPattern, BinRange, Brand, BrandDetails, CvvFormat,
    DetailedBrand, LengthSpec, NumberFormat,
};
pub use validators::luhn;

use once_cell::sync::Lazy;

static BUNDLED: Lazy<BrandMatcher> =
    Lazy::new(|| BrandMatcher::bundled().expect("bundled brand data is valid"));

/// Shared matcher over the bundled brand data, built on first use.
pub fn bundled() -> &'static BrandMatcher {
    &BUNDLED
}

/// Identify the brand of a card number using the bundled data.
pub fn find_brand(card_number: &str) -> Option<&'static Brand> {
    BUNDLED.find_brand(card_number)
}

/// Identify the brand of a card number with detailed enrichment, using
/// the bundled data.
pub fn find_brand_detailed(card_number: &str) -> Option<BrandMatch<'static>> {
    BUNDLED.find_brand_detailed(card_number)
}

/// Whether the card number belongs to any bundled brand.
pub fn is_supported(card_number: &str) -> bool {
    BUNDLED.is_supported(card_number)
}

/// Validate a CVV against a bundled brand, given by name or by a value
/// previously returned from a lookup.
pub fn validate_cvv<'a>(cvv: &str, brand: impl Into<BrandRef<'a>>) -> bool {
    BUNDLED.validate_cvv(cvv, brand)
}

/// Look up a bundled brand rule by name.
pub fn brand_info(name: &str) -> Option<&'static Brand> {
    BUNDLED.brand_info(name)
}

/// Look up a bundled detail record by scheme name.
pub fn brand_info_detailed(scheme: &str) -> Option<&'static DetailedBrand> {
    BUNDLED.brand_info_detailed(scheme)
}

/// All bundled brand names, in table order.
pub fn list_brands() -> Vec<&'static str> {
    BUNDLED.list_brands()
}
