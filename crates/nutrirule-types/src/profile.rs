//! Nutrient profile type.
//!
//! A [`NutrientProfile`] holds the nutrient values of one food (per 100 g)
//! or one meal aggregate (per serving). It is immutable once built.

use std::collections::BTreeMap;

use crate::error::check_value;
use crate::{NutrientKey, ValidationError};

/// Fixed-schema nutrient values for a food or meal.
///
/// A nutrient that is absent from the profile is *unknown*, not zero.
///
/// # Examples
///
/// ```
/// use nutrirule_types::{NutrientKey, NutrientProfile};
///
/// let pho = NutrientProfile::builder()
///     .value(NutrientKey::EnergyKcal, 450.0)
///     .value(NutrientKey::SodiumMg, 1200.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(pho.get(NutrientKey::SodiumMg), Some(1200.0));
/// assert_eq!(pho.get(NutrientKey::FiberG), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")
)]
pub struct NutrientProfile {
    values: BTreeMap<NutrientKey, f64>,
}

impl NutrientProfile {
    /// Returns an empty builder.
    pub fn builder() -> NutrientProfileBuilder {
        NutrientProfileBuilder::default()
    }

    /// Creates a profile from typed values.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] for a negative or
    /// non-finite value.
    pub fn from_values<I>(values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (NutrientKey, f64)>,
    {
        let mut builder = Self::builder();
        for (key, value) in values {
            builder = builder.value(key, value);
        }
        builder.build()
    }

    /// Creates a profile from raw string keys, as supplied by an API layer.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownNutrientKey`] for a key outside the
    /// recognised set and [`ValidationError::InvalidValue`] for bad values.
    pub fn from_raw<'a, I>(values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut typed = Vec::new();
        for (key, value) in values {
            typed.push((key.parse::<NutrientKey>()?, value));
        }
        Self::from_values(typed)
    }

    /// Returns the value for a nutrient, or `None` if it was not reported.
    pub fn get(&self, key: NutrientKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Returns true if the profile reports the nutrient.
    pub fn contains(&self, key: NutrientKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Returns the number of reported nutrients.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no nutrient is reported.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over reported nutrients in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (NutrientKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Scales a per-100 g profile to a portion of `grams`.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] for a negative or
    /// non-finite portion.
    pub fn scaled(&self, grams: f64) -> Result<Self, ValidationError> {
        let grams = check_value("portion_g", grams)?;
        let factor = grams / 100.0;
        Ok(Self {
            values: self.values.iter().map(|(k, v)| (*k, v * factor)).collect(),
        })
    }

    /// Sums portions into a meal aggregate.
    ///
    /// A nutrient appears in the aggregate only if every portion reports it;
    /// a partially reported nutrient stays unknown rather than being summed
    /// as if the missing portions contained none.
    pub fn combine<'a, I>(portions: I) -> Self
    where
        I: IntoIterator<Item = &'a NutrientProfile>,
    {
        let mut portions = portions.into_iter();
        let Some(first) = portions.next() else {
            return Self::default();
        };
        let mut values = first.values.clone();
        for portion in portions {
            values.retain(|key, total| match portion.values.get(key) {
                Some(v) => {
                    *total += v;
                    true
                }
                None => false,
            });
        }
        Self { values }
    }
}

impl TryFrom<BTreeMap<String, f64>> for NutrientProfile {
    type Error = ValidationError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_raw(raw.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}

impl From<NutrientProfile> for BTreeMap<String, f64> {
    fn from(profile: NutrientProfile) -> Self {
        profile
            .values
            .into_iter()
            .map(|(k, v)| (k.as_str().to_string(), v))
            .collect()
    }
}

/// Builder for [`NutrientProfile`].
///
/// Values are validated once, in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct NutrientProfileBuilder {
    values: BTreeMap<NutrientKey, f64>,
}

impl NutrientProfileBuilder {
    /// Sets a nutrient value, replacing any previous value for the key.
    pub fn value(mut self, key: NutrientKey, value: f64) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Validates and builds the profile.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] for a negative or
    /// non-finite value.
    pub fn build(self) -> Result<NutrientProfile, ValidationError> {
        for (key, value) in &self.values {
            check_value(key.as_str(), *value)?;
        }
        Ok(NutrientProfile {
            values: self.values,
        })
    }
}
