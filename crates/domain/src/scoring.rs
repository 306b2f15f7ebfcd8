//! Scoring models and their nested categories and options.
//!
//! Clients subscribe at model granularity, so category and option changes
//! bubble up and republish the whole owning model.

use scorecast_core::{ScoringCategoryId, ScoringModelId, ScoringOptionId};
use serde::{Deserialize, Serialize};

/// A reusable scoring model evaluations are scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringModel {
    /// Stable model identifier.
    pub id: ScoringModelId,
    /// Display name.
    pub name: String,
    /// Pre-validated scoring equation. Parsing and evaluation are owned
    /// elsewhere; this core treats the formula as opaque.
    pub equation: String,
}

impl ScoringModel {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.name != previous.name {
            changed.push("name".to_owned());
        }
        if self.equation != previous.equation {
            changed.push("equation".to_owned());
        }
        changed
    }
}

/// A category of selectable options within a scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringCategory {
    /// Stable category identifier.
    pub id: ScoringCategoryId,
    /// Owning scoring model.
    pub scoring_model_id: ScoringModelId,
    /// Display name.
    pub name: String,
    /// Relative weight of the category in the model equation.
    pub weight: f64,
}

impl ScoringCategory {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.name != previous.name {
            changed.push("name".to_owned());
        }
        if self.weight != previous.weight {
            changed.push("weight".to_owned());
        }
        changed
    }
}

/// A selectable option within a scoring category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringOption {
    /// Stable option identifier.
    pub id: ScoringOptionId,
    /// Owning category.
    pub scoring_category_id: ScoringCategoryId,
    /// Display name.
    pub name: String,
    /// Numeric value the option contributes to the score.
    pub value: f64,
}

impl ScoringOption {
    /// Returns the camel-cased names of fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        if self.name != previous.name {
            changed.push("name".to_owned());
        }
        if self.value != previous.value {
            changed.push("value".to_owned());
        }
        changed
    }
}

/// One category together with its options, as published to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringCategoryTree {
    /// The category row.
    #[serde(flatten)]
    pub category: ScoringCategory,
    /// Options belonging to the category.
    pub options: Vec<ScoringOption>,
}

/// A whole scoring model with its nested categories and options.
///
/// This is the payload shape republished whenever the model or anything
/// under it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringModelTree {
    /// The model row.
    #[serde(flatten)]
    pub model: ScoringModel,
    /// Categories belonging to the model.
    pub categories: Vec<ScoringCategoryTree>,
}
