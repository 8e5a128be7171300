//! Unit-of-measure normalization and conversion.
//!
//! Template authors write units loosely ("pcs", "g", "tbs"); inventory rows
//! carry the canonical spelling. Everything that compares or converts
//! quantities goes through [`normalize_unit`] first so "pc" and "pieces"
//! never count as different units.

use rust_decimal::Decimal;

/// Alias table mapping canonical units to their accepted spellings.
const UNIT_ALIASES: &[(&str, &[&str])] = &[
    ("pieces", &["pcs", "pc", "piece", "units", "unit"]),
    ("grams", &["g", "gram", "gms"]),
    ("kg", &["kilogram", "kilograms", "kilo"]),
    ("ml", &["milliliter", "milliliters"]),
    ("liters", &["l", "liter"]),
    ("cups", &["cup", "c"]),
    ("tbsp", &["tablespoon", "tablespoons", "tbs"]),
    ("tsp", &["teaspoon", "teaspoons", "ts"]),
    ("ounces", &["oz", "ounce"]),
];

/// Packaging units that can never back a recipe ingredient.
///
/// Items stocked in these units (boxes of cups, packs of napkins) are
/// excluded from recipe matching; they are sold or consumed whole.
const RECIPE_EXCLUDED_UNITS: &[&str] = &["box", "boxes", "pack", "packs", "roll", "rolls"];

/// Normalize a unit string to its canonical spelling.
///
/// Lowercases, trims, and collapses known aliases. Unknown units are
/// returned normalized but otherwise untouched.
#[must_use]
pub fn normalize_unit(unit: &str) -> String {
    let cleaned = unit.trim().to_lowercase();
    for (canonical, aliases) in UNIT_ALIASES {
        if cleaned == *canonical || aliases.contains(&cleaned.as_str()) {
            return (*canonical).to_string();
        }
    }
    cleaned
}

/// Whether an inventory item stocked in this unit may back recipe ingredients.
#[must_use]
pub fn is_recipe_compatible_unit(unit: &str) -> bool {
    let normalized = normalize_unit(unit);
    !RECIPE_EXCLUDED_UNITS.contains(&normalized.as_str())
}

/// Conversion factor from one unit to another, if the pair is convertible.
///
/// The result is the multiplier that turns a quantity in `from` units into
/// the equivalent quantity in `to` units. Identical (normalized) units
/// always convert with factor 1. Unknown pairs return `None`; callers
/// decide whether that means "treat as same scale" or "reject".
#[must_use]
pub fn conversion_factor(from: &str, to: &str) -> Option<Decimal> {
    let from = normalize_unit(from);
    let to = normalize_unit(to);
    if from == to {
        return Some(Decimal::ONE);
    }
    match (from.as_str(), to.as_str()) {
        ("grams", "kg") | ("ml", "liters") => Some(Decimal::new(1, 3)),
        ("kg", "grams") | ("liters", "ml") => Some(Decimal::new(1000, 0)),
        ("grams", "ounces") => Some(Decimal::new(35274, 6)),
        ("ounces", "grams") => Some(Decimal::new(2_834_952, 5)),
        ("kg", "ounces") => Some(Decimal::new(35274, 3)),
        ("ounces", "kg") => Some(Decimal::new(2_834_952, 8)),
        ("ml", "cups") => Some(Decimal::new(4227, 6)),
        ("cups", "ml") => Some(Decimal::new(236_588, 3)),
        ("liters", "cups") => Some(Decimal::new(4227, 3)),
        ("cups", "liters") => Some(Decimal::new(236_588, 6)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_unit("PCS"), "pieces");
        assert_eq!(normalize_unit(" g "), "grams");
        assert_eq!(normalize_unit("tablespoon"), "tbsp");
        assert_eq!(normalize_unit("serving"), "serving");
    }

    #[test]
    fn test_identity_conversion() {
        assert_eq!(conversion_factor("pcs", "pieces"), Some(Decimal::ONE));
        assert_eq!(conversion_factor("g", "grams"), Some(Decimal::ONE));
    }

    #[test]
    fn test_metric_conversions() {
        assert_eq!(
            conversion_factor("kg", "grams"),
            Some(Decimal::new(1000, 0))
        );
        assert_eq!(conversion_factor("grams", "kg"), Some(Decimal::new(1, 3)));
        assert_eq!(conversion_factor("liters", "ml"), Some(Decimal::new(1000, 0)));
    }

    #[test]
    fn test_unknown_pair() {
        assert_eq!(conversion_factor("pieces", "grams"), None);
    }

    #[test]
    fn test_recipe_excluded_units() {
        assert!(!is_recipe_compatible_unit("box"));
        assert!(!is_recipe_compatible_unit("Packs"));
        assert!(is_recipe_compatible_unit("grams"));
        assert!(is_recipe_compatible_unit("pieces"));
    }
}
