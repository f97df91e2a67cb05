use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of material categories the engine understands.
///
/// The ordinal is part of the clustering feature space, so the mapping is
/// frozen: adding a category appends, never renumbers.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
    Structural,
    Finishing,
    Electrical,
    Plumbing,
    Roofing,
}

impl MaterialCategory {
    /// Fixed category -> integer table used as a clustering feature.
    pub fn ordinal(&self) -> u8 {
        match self {
            MaterialCategory::Structural => 1,
            MaterialCategory::Finishing => 2,
            MaterialCategory::Electrical => 3,
            MaterialCategory::Plumbing => 4,
            MaterialCategory::Roofing => 5,
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MaterialCategory::Structural => write!(f, "structural"),
            MaterialCategory::Finishing => write!(f, "finishing"),
            MaterialCategory::Electrical => write!(f, "electrical"),
            MaterialCategory::Plumbing => write!(f, "plumbing"),
            MaterialCategory::Roofing => write!(f, "roofing"),
        }
    }
}

/// A purchasable construction material. Owned by the inventory side;
/// the engine only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,
    pub price_per_unit: f64,
}

impl Material {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: MaterialCategory,
        price_per_unit: f64,
    ) -> Self {
        Material {
            id: id.into(),
            name: name.into(),
            category,
            price_per_unit,
        }
    }
}

/// One quoted line item, the input to construction cost factor analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub material_id: String,
    pub category: MaterialCategory,
    pub quantity: f64,
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_category_ordinals_are_stable() {
        // The ordinal feeds the clustering feature space; renumbering would
        // silently shift every stored centroid
        let ordinals: Vec<u8> = MaterialCategory::iter().map(|c| c.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&MaterialCategory::Roofing).unwrap();
        assert_eq!(json, "\"roofing\"");
        let back: MaterialCategory = serde_json::from_str("\"plumbing\"").unwrap();
        assert_eq!(back, MaterialCategory::Plumbing);
    }
}
