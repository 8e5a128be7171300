//! Ingredient matching: free-text ingredient names to inventory items.
//!
//! Template authors write "whip cream"; the store's stock row says
//! "Whipped Cream". [`match_ingredient`] bridges the two with a strict
//! priority ladder - exact, then partial (substring), then synonym lookup -
//! where the first hit wins. No hit is a normal return value, never an
//! error: the ingredient is surfaced for manual resolution.
//!
//! The matcher is query-only. It never mutates inventory or templates, and
//! the synonym table is explicit configuration rather than a hidden static,
//! so tests can pin down exactly what it will and will not match.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::InventoryItem;
use crate::types::{InventoryItemId, conversion_factor};

/// Confidence tier of a resolved mapping, in descending strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Case-insensitive, whitespace-trimmed name equality.
    Exact,
    /// Substring containment in either direction.
    Partial,
    /// Both names belong to the same synonym group.
    Suggested,
    /// Assigned by a human; the matcher never produces this tier itself.
    Manual,
}

impl MatchConfidence {
    /// Database/text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Suggested => "suggested",
            Self::Manual => "manual",
        }
    }
}

/// Error for unrecognized confidence strings.
#[derive(Debug, Error)]
#[error("unknown match confidence: {0}")]
pub struct ParseConfidenceError(String);

impl FromStr for MatchConfidence {
    type Err = ParseConfidenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "partial" => Ok(Self::Partial),
            "suggested" => Ok(Self::Suggested),
            "manual" => Ok(Self::Manual),
            other => Err(ParseConfidenceError(other.to_string())),
        }
    }
}

impl std::fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mapping candidate produced by [`match_ingredient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub inventory_item_id: InventoryItemId,
    pub item_name: String,
    pub confidence: MatchConfidence,
    /// Multiplier converting quantities in the ingredient's unit into the
    /// matched item's unit. 1 when the units are the same or unconvertible.
    pub conversion_factor: Decimal,
}

/// Groups of ingredient names considered interchangeable for matching.
///
/// Passed into the matcher explicitly so callers can extend or replace the
/// built-in set per deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynonymTable {
    groups: Vec<Vec<String>>,
}

impl SynonymTable {
    /// Build a table from raw groups. Member names are normalized on entry.
    #[must_use]
    pub fn from_groups<I, G, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|g| g.into_iter().map(|s| normalize_name(s.as_ref())).collect())
                .collect(),
        }
    }

    /// The synonym groups observed across the chain's historical templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_groups([
            vec!["regular croissant", "croissant", "plain croissant", "butter croissant"],
            vec!["whipped cream", "whip cream", "cream", "heavy cream"],
            vec!["milk", "fresh milk", "whole milk"],
            vec!["blueberry jam", "blueberry", "jam blueberry"],
            vec!["strawberry jam", "strawberry", "jam strawberry"],
            vec!["chocolate syrup", "choco syrup", "chocolate sauce", "cocoa syrup"],
            vec!["caramel syrup", "caramel sauce", "caramel", "butterscotch syrup"],
            vec!["nutella", "hazelnut spread", "chocolate hazelnut"],
            vec!["biscoff spread", "biscoff", "cookie butter", "speculoos"],
            vec!["oreo cookies", "oreo", "sandwich cookies"],
            vec!["kitkat", "kit kat", "chocolate wafer"],
        ])
    }

    /// The group containing `name` (already normalized), if any.
    fn group_for(&self, name: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|g| g.iter().any(|member| member == name))
            .map(Vec::as_slice)
    }
}

/// Normalize a name for comparison: lowercase, trim, strip punctuation,
/// collapse runs of whitespace.
#[must_use]
pub fn normalize_name(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a free-text ingredient name against a store's matchable items.
///
/// Priority order, first match wins:
/// 1. Exact - normalized name equality.
/// 2. Partial - substring containment in either direction.
/// 3. Suggested - ingredient and item fall in the same synonym group.
///
/// Inactive or non-recipe-compatible items are never matched. Returns
/// `None` when nothing matches; that is the normal "unresolved" outcome.
/// Given the same inputs in the same order, the result is deterministic.
#[must_use]
pub fn match_ingredient(
    ingredient_name: &str,
    ingredient_unit: &str,
    items: &[InventoryItem],
    synonyms: &SynonymTable,
) -> Option<MatchCandidate> {
    let target = normalize_name(ingredient_name);
    if target.is_empty() {
        return None;
    }

    let candidates: Vec<&InventoryItem> = items.iter().filter(|it| it.matchable()).collect();

    let exact = candidates
        .iter()
        .find(|it| normalize_name(&it.name) == target);
    if let Some(item) = exact {
        return Some(candidate(item, MatchConfidence::Exact, ingredient_unit));
    }

    let partial = candidates.iter().find(|it| {
        let name = normalize_name(&it.name);
        name.contains(&target) || target.contains(&name)
    });
    if let Some(item) = partial {
        return Some(candidate(item, MatchConfidence::Partial, ingredient_unit));
    }

    // Synonym lookup: the target must contain some group member, and the
    // item must contain a member of the same group.
    if let Some(group) = synonyms
        .group_for(&target)
        .or_else(|| find_containing_group(synonyms, &target))
    {
        let suggested = candidates.iter().find(|it| {
            let name = normalize_name(&it.name);
            group.iter().any(|member| name.contains(member.as_str()))
        });
        if let Some(item) = suggested {
            return Some(candidate(item, MatchConfidence::Suggested, ingredient_unit));
        }
    }

    None
}

/// First group with a member contained in `target`.
fn find_containing_group<'a>(synonyms: &'a SynonymTable, target: &str) -> Option<&'a [String]> {
    synonyms
        .groups
        .iter()
        .find(|g| g.iter().any(|member| target.contains(member.as_str())))
        .map(Vec::as_slice)
}

fn candidate(
    item: &InventoryItem,
    confidence: MatchConfidence,
    ingredient_unit: &str,
) -> MatchCandidate {
    MatchCandidate {
        inventory_item_id: item.id,
        item_name: item.name.clone(),
        confidence,
        conversion_factor: conversion_factor(ingredient_unit, &item.unit)
            .unwrap_or(Decimal::ONE),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::StoreId;

    fn item(name: &str, unit: &str) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::generate(),
            store_id: StoreId::generate(),
            name: name.to_string(),
            unit: unit.to_string(),
            on_hand_quantity: Decimal::from(100),
            minimum_threshold: Decimal::from(10),
            maximum_capacity: None,
            is_active: true,
            recipe_compatible: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let items = vec![item("Whipped Cream", "pieces")];
        let m = match_ingredient("  whipped cream ", "pieces", &items, &SynonymTable::default())
            .expect("match");
        assert_eq!(m.confidence, MatchConfidence::Exact);
        assert_eq!(m.item_name, "Whipped Cream");
        assert_eq!(m.conversion_factor, Decimal::ONE);
    }

    #[test]
    fn test_partial_match_either_direction() {
        let items = vec![item("Chocolate Syrup (Dark)", "ml")];
        let m = match_ingredient("chocolate syrup", "ml", &items, &SynonymTable::default())
            .expect("match");
        assert_eq!(m.confidence, MatchConfidence::Partial);

        let items = vec![item("Syrup", "ml")];
        let m = match_ingredient("Vanilla Syrup", "ml", &items, &SynonymTable::default())
            .expect("match");
        assert_eq!(m.confidence, MatchConfidence::Partial);
    }

    #[test]
    fn test_exact_beats_partial() {
        let items = vec![item("Milk Chocolate", "grams"), item("Milk", "ml")];
        let m = match_ingredient("milk", "ml", &items, &SynonymTable::default()).expect("match");
        assert_eq!(m.confidence, MatchConfidence::Exact);
        assert_eq!(m.item_name, "Milk");
    }

    #[test]
    fn test_suggested_via_synonym_group() {
        let items = vec![item("Heavy Cream", "ml")];
        let m = match_ingredient("whip cream", "ml", &items, &SynonymTable::builtin())
            .expect("match");
        assert_eq!(m.confidence, MatchConfidence::Suggested);
        assert_eq!(m.item_name, "Heavy Cream");
    }

    #[test]
    fn test_no_match_is_none_not_error() {
        let items = vec![item("Flour", "grams")];
        assert!(match_ingredient("Dragon Fruit", "pieces", &items, &SynonymTable::builtin()).is_none());
    }

    #[test]
    fn test_ignores_non_matchable_items() {
        let mut boxed = item("Milk", "ml");
        boxed.recipe_compatible = false;
        let mut inactive = item("Milk", "ml");
        inactive.is_active = false;
        assert!(
            match_ingredient("milk", "ml", &[boxed, inactive], &SynonymTable::default()).is_none()
        );
    }

    #[test]
    fn test_conversion_factor_applied() {
        let items = vec![item("Sugar", "kg")];
        let m = match_ingredient("sugar", "grams", &items, &SynonymTable::default())
            .expect("match");
        // grams -> kg
        assert_eq!(m.conversion_factor, Decimal::new(1, 3));
    }

    #[test]
    fn test_deterministic_first_wins() {
        let a = item("Strawberry Jam", "grams");
        let b = item("Strawberry Jam", "grams");
        let items = vec![a.clone(), b];
        for _ in 0..3 {
            let m = match_ingredient("strawberry jam", "grams", &items, &SynonymTable::default())
                .expect("match");
            assert_eq!(m.inventory_item_id, a.id);
        }
    }

    #[test]
    fn test_confidence_roundtrip() {
        for c in [
            MatchConfidence::Exact,
            MatchConfidence::Partial,
            MatchConfidence::Suggested,
            MatchConfidence::Manual,
        ] {
            assert_eq!(c.as_str().parse::<MatchConfidence>().ok(), Some(c));
        }
    }
}
