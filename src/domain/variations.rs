//! Variation summaries and the variant fold rule
//!
//! A sellable item's variations are summarized into the distinct set of
//! variation-defining properties (the future OrderCloud specs) and, per
//! concrete variation, the specific property/value pairs. The summary
//! drives spec creation and is later used to match remote-generated
//! variants back to their source variations.
//!
//! Variation-defining properties are a closed set ([`VariationPropertyKind`]);
//! adding a new property is a data change here, not a dynamic-dispatch one.

use crate::domain::entities::{SellableItem, Variation};
use serde::{Deserialize, Serialize};

/// The closed set of variation-defining property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariationPropertyKind {
    Color,
    Size,
}

impl VariationPropertyKind {
    /// All known kinds, in spec-creation order.
    pub const ALL: [VariationPropertyKind; 2] =
        [VariationPropertyKind::Color, VariationPropertyKind::Size];

    /// The property name as it appears on destination specs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationPropertyKind::Color => "Color",
            VariationPropertyKind::Size => "Size",
        }
    }

    /// Reads this property's value off a source variation, if set and
    /// non-blank.
    pub fn value_of<'a>(&self, variation: &'a Variation) -> Option<&'a str> {
        let value = match self {
            VariationPropertyKind::Color => variation.color.as_deref(),
            VariationPropertyKind::Size => variation.size.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

impl std::fmt::Display for VariationPropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property/value pair on a concrete variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationProperty {
    pub kind: VariationPropertyKind,
    pub value: String,
}

/// The property set of one concrete source variation.
#[derive(Debug, Clone, Default)]
pub struct VariationSummary {
    /// The source variation identifier
    pub id: String,

    /// The variation-defining property/value pairs
    pub properties: Vec<VariationProperty>,
}

/// Derived view over a sellable item's variation components.
#[derive(Debug, Clone, Default)]
pub struct VariationsSummary {
    /// One summary per variation that carries at least one property
    pub variations: Vec<VariationSummary>,

    /// The distinct property kinds across all variations, in first-seen order
    pub unique_properties: Vec<VariationPropertyKind>,
}

impl VariationsSummary {
    /// Builds the summary for a sellable item.
    ///
    /// A variation with no property-bearing display component voids the
    /// whole summary: such items cannot drive spec generation.
    pub fn of(item: &SellableItem) -> VariationsSummary {
        let mut summary = VariationsSummary::default();

        for variation in &item.variations {
            let mut variation_summary = VariationSummary {
                id: variation.id.clone(),
                properties: Vec::new(),
            };

            for kind in VariationPropertyKind::ALL {
                if let Some(value) = kind.value_of(variation) {
                    if !summary.unique_properties.contains(&kind) {
                        summary.unique_properties.push(kind);
                    }
                    variation_summary.properties.push(VariationProperty {
                        kind,
                        value: value.to_string(),
                    });
                }
            }

            if !variation_summary.properties.is_empty() {
                summary.variations.push(variation_summary);
            }
        }

        summary
    }

    /// The distinct values of one property kind across all variations, in
    /// first-seen order.
    pub fn distinct_values(&self, kind: VariationPropertyKind) -> Vec<&str> {
        let mut values: Vec<&str> = Vec::new();
        for variation in &self.variations {
            for property in variation.properties.iter().filter(|p| p.kind == kind) {
                if !values.contains(&property.value.as_str()) {
                    values.push(&property.value);
                }
            }
        }
        values
    }
}

/// Determines whether variants must be created for the OrderCloud product.
///
/// A sellable item with a single variation folds into a standalone product
/// when the variation has no variation-defining properties configured. This
/// is a hard business rule of the migration, not a heuristic.
pub fn requires_variants(item: &SellableItem) -> bool {
    if item.variations.is_empty() {
        return false;
    }
    if item.variations.len() > 1 {
        return true;
    }

    let variation = &item.variations[0];
    VariationPropertyKind::ALL
        .iter()
        .any(|kind| kind.value_of(variation).is_some())
}

/// Determines whether the item's sole variation folds into a standalone
/// product (the complement of [`requires_variants`] for single-variation
/// items).
pub fn will_fold_into_standalone_product(item: &SellableItem) -> bool {
    if item.variations.len() != 1 {
        return false;
    }

    let variation = &item.variations[0];
    VariationPropertyKind::ALL
        .iter()
        .all(|kind| kind.value_of(variation).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_variations(variations: Vec<Variation>) -> SellableItem {
        SellableItem {
            id: "item-1".to_string(),
            friendly_id: "Item1".to_string(),
            display_name: String::new(),
            description: String::new(),
            brand: String::new(),
            manufacturer: String::new(),
            type_of_good: String::new(),
            tags: vec![],
            published: true,
            physical: true,
            specifications: None,
            pricing: vec![],
            inventory: vec![],
            variations,
        }
    }

    fn variation(id: &str, color: Option<&str>, size: Option<&str>) -> Variation {
        Variation {
            id: id.to_string(),
            disabled: false,
            color: color.map(String::from),
            size: size.map(String::from),
            description: None,
            tags: vec![],
            specifications: None,
            pricing: vec![],
            inventory: vec![],
        }
    }

    #[test]
    fn test_fold_rule_single_variation_without_properties() {
        let item = item_with_variations(vec![variation("v1", None, None)]);
        assert!(!requires_variants(&item));
        assert!(will_fold_into_standalone_product(&item));
    }

    #[test]
    fn test_fold_rule_single_variation_with_color() {
        let item = item_with_variations(vec![variation("v1", Some("Red"), None)]);
        assert!(requires_variants(&item));
        assert!(!will_fold_into_standalone_product(&item));
    }

    #[test]
    fn test_fold_rule_blank_color_is_no_property() {
        let item = item_with_variations(vec![variation("v1", Some("   "), None)]);
        assert!(!requires_variants(&item));
        assert!(will_fold_into_standalone_product(&item));
    }

    #[test]
    fn test_fold_rule_multiple_variations() {
        let item = item_with_variations(vec![
            variation("v1", None, None),
            variation("v2", None, None),
        ]);
        assert!(requires_variants(&item));
        assert!(!will_fold_into_standalone_product(&item));
    }

    #[test]
    fn test_fold_rule_no_variations() {
        let item = item_with_variations(vec![]);
        assert!(!requires_variants(&item));
        assert!(!will_fold_into_standalone_product(&item));
    }

    #[test]
    fn test_summary_unique_properties_and_values() {
        let item = item_with_variations(vec![
            variation("v1", Some("Red"), Some("M")),
            variation("v2", Some("Blue"), Some("M")),
        ]);
        let summary = VariationsSummary::of(&item);

        assert_eq!(
            summary.unique_properties,
            vec![VariationPropertyKind::Color, VariationPropertyKind::Size]
        );
        assert_eq!(
            summary.distinct_values(VariationPropertyKind::Color),
            vec!["Red", "Blue"]
        );
        assert_eq!(summary.distinct_values(VariationPropertyKind::Size), vec!["M"]);
        assert_eq!(summary.variations.len(), 2);
    }

    #[test]
    fn test_summary_skips_property_less_variations() {
        let item = item_with_variations(vec![
            variation("v1", Some("Red"), None),
            variation("v2", None, None),
        ]);
        let summary = VariationsSummary::of(&item);
        assert_eq!(summary.variations.len(), 1);
        assert_eq!(summary.variations[0].id, "v1");
    }
}
