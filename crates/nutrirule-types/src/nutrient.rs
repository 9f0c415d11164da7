//! Nutrient key enumeration.
//!
//! The engine recognises a closed set of nutrients. Any other key found in
//! seed data or a custom rule is a data-authoring error and is rejected at
//! load time with [`ValidationError::UnknownNutrientKey`].

use std::str::FromStr;

use crate::ValidationError;

/// Unit a nutrient value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NutrientUnit {
    /// Kilocalories.
    Kcal,
    /// Grams.
    Gram,
    /// Milligrams.
    Milligram,
}

impl NutrientUnit {
    /// Returns the unit symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kcal => "kcal",
            Self::Gram => "g",
            Self::Milligram => "mg",
        }
    }
}

/// A recognised nutrient.
///
/// Values are per 100 g for a food, or per serving for an aggregated meal.
///
/// # Examples
///
/// ```
/// use nutrirule_types::{NutrientKey, NutrientUnit};
///
/// let key: NutrientKey = "sodium_mg".parse().unwrap();
/// assert_eq!(key, NutrientKey::SodiumMg);
/// assert_eq!(key.unit(), NutrientUnit::Milligram);
///
/// // Legacy column names are accepted as aliases.
/// assert_eq!("carbs".parse::<NutrientKey>().unwrap(), NutrientKey::CarbohydrateG);
/// assert!("vitamin_q".parse::<NutrientKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NutrientKey {
    /// Energy in kilocalories.
    #[cfg_attr(feature = "serde", serde(alias = "calories"))]
    EnergyKcal,
    /// Total carbohydrate in grams.
    #[cfg_attr(feature = "serde", serde(alias = "carbs"))]
    CarbohydrateG,
    /// Dietary fibre in grams.
    #[cfg_attr(feature = "serde", serde(alias = "fiber"))]
    FiberG,
    /// Total fat in grams.
    #[cfg_attr(feature = "serde", serde(alias = "fat"))]
    FatG,
    /// Protein in grams.
    #[cfg_attr(feature = "serde", serde(alias = "protein"))]
    ProteinG,
    /// Sodium in milligrams.
    #[cfg_attr(feature = "serde", serde(alias = "sodium"))]
    SodiumMg,
    /// Potassium in grams.
    PotassiumG,
    /// Total sugars in grams.
    #[cfg_attr(feature = "serde", serde(alias = "sugar"))]
    SugarG,
    /// Saturated fat in grams.
    SaturatedFatG,
    /// Cholesterol in milligrams.
    CholesterolMg,
    /// Purines in milligrams.
    PurineMg,
    /// Phosphorus in milligrams.
    PhosphorusMg,
}

impl NutrientKey {
    /// Every recognised nutrient, in canonical order.
    pub const ALL: [NutrientKey; 12] = [
        Self::EnergyKcal,
        Self::CarbohydrateG,
        Self::FiberG,
        Self::FatG,
        Self::ProteinG,
        Self::SodiumMg,
        Self::PotassiumG,
        Self::SugarG,
        Self::SaturatedFatG,
        Self::CholesterolMg,
        Self::PurineMg,
        Self::PhosphorusMg,
    ];

    /// Returns the canonical snake_case key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnergyKcal => "energy_kcal",
            Self::CarbohydrateG => "carbohydrate_g",
            Self::FiberG => "fiber_g",
            Self::FatG => "fat_g",
            Self::ProteinG => "protein_g",
            Self::SodiumMg => "sodium_mg",
            Self::PotassiumG => "potassium_g",
            Self::SugarG => "sugar_g",
            Self::SaturatedFatG => "saturated_fat_g",
            Self::CholesterolMg => "cholesterol_mg",
            Self::PurineMg => "purine_mg",
            Self::PhosphorusMg => "phosphorus_mg",
        }
    }

    /// Returns the unit this nutrient is measured in.
    pub fn unit(self) -> NutrientUnit {
        match self {
            Self::EnergyKcal => NutrientUnit::Kcal,
            Self::SodiumMg | Self::CholesterolMg | Self::PurineMg | Self::PhosphorusMg => {
                NutrientUnit::Milligram
            }
            _ => NutrientUnit::Gram,
        }
    }

    /// Looks up a key by its canonical name or a legacy alias.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if let Some(key) = Self::ALL.iter().copied().find(|k| k.as_str() == name) {
            return Some(key);
        }
        match name.as_str() {
            "calories" | "energy" => Some(Self::EnergyKcal),
            "carbs" | "carbohydrate" => Some(Self::CarbohydrateG),
            "fiber" | "fibre" => Some(Self::FiberG),
            "fat" => Some(Self::FatG),
            "protein" => Some(Self::ProteinG),
            "sodium" => Some(Self::SodiumMg),
            "sugar" | "sugars" => Some(Self::SugarG),
            _ => None,
        }
    }
}

impl FromStr for NutrientKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::UnknownNutrientKey(s.to_string()))
    }
}

impl std::fmt::Display for NutrientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_roundtrip() {
        for key in NutrientKey::ALL {
            assert_eq!(key.as_str().parse::<NutrientKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(NutrientKey::from_name("Calories"), Some(NutrientKey::EnergyKcal));
        assert_eq!(NutrientKey::from_name(" sodium "), Some(NutrientKey::SodiumMg));
        assert_eq!(NutrientKey::from_name("FIBRE"), Some(NutrientKey::FiberG));
        assert_eq!(NutrientKey::from_name("gluten_g"), None);
    }

    #[test]
    fn test_unknown_key_error() {
        let err = "omega_9".parse::<NutrientKey>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownNutrientKey("omega_9".into()));
    }

    #[test]
    fn test_units() {
        assert_eq!(NutrientKey::EnergyKcal.unit().symbol(), "kcal");
        assert_eq!(NutrientKey::PotassiumG.unit().symbol(), "g");
        assert_eq!(NutrientKey::PurineMg.unit().symbol(), "mg");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&NutrientKey::SaturatedFatG).unwrap();
        assert_eq!(json, "\"saturated_fat_g\"");
        let parsed: NutrientKey = serde_json::from_str("\"carbs\"").unwrap();
        assert_eq!(parsed, NutrientKey::CarbohydrateG);
    }
}
