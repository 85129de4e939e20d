//! Column Mapping
//!
//! Binds dataset column names to the roles the drift comparison needs.
//! Building a mapping never looks at the data, so unknown names surface
//! later as schema mismatches from the detector.
use crate::config::ColumnsConfig;
use crate::data::{ColumnType, Dataset};
use serde::{Deserialize, Serialize};

/// Role of a compared feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    #[serde(rename = "num")]
    Numerical,
    #[serde(rename = "cat")]
    Categorical,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// The temporal axis. Never tested for drift.
    pub datetime: Option<String>,
    pub numerical_features: Vec<String>,
    /// `None` infers every remaining text column as categorical.
    pub categorical_features: Option<Vec<String>>,
}

impl ColumnMapping {
    pub fn from_config(columns: &ColumnsConfig) -> Self {
        ColumnMapping {
            datetime: Some(columns.date.clone()),
            numerical_features: columns.numerical_features.clone(),
            categorical_features: columns.categorical_features.clone(),
        }
    }

    /// Explicitly configured feature columns with their roles: numerical
    /// first, then categorical, each in configured order.
    pub fn features(&self) -> Vec<(&str, FeatureKind)> {
        self.numerical_features
            .iter()
            .map(|c| (c.as_str(), FeatureKind::Numerical))
            .chain(
                self.categorical_features
                    .iter()
                    .flatten()
                    .map(|c| (c.as_str(), FeatureKind::Categorical)),
            )
            .collect()
    }

    /// Feature columns to compare against `reference`. Without configured
    /// categorical features, text columns other than the date and the
    /// numerical features are added as categorical, in dataset order.
    pub fn resolve_features<'a>(&'a self, reference: &'a Dataset) -> Vec<(&'a str, FeatureKind)> {
        let mut features = self.features();
        if self.categorical_features.is_none() {
            let inferred = reference
                .columns()
                .iter()
                .filter(|c| c.column_type() == ColumnType::Text)
                .map(|c| c.name.as_str())
                .filter(|&name| self.datetime.as_deref() != Some(name))
                .filter(|&name| !self.numerical_features.iter().any(|n| n == name))
                .map(|name| (name, FeatureKind::Categorical));
            features.extend(inferred);
        }
        features
    }

    /// Every column the mapping references.
    pub fn referenced_columns(&self) -> Vec<&str> {
        self.datetime
            .iter()
            .map(|d| d.as_str())
            .chain(self.features().into_iter().map(|(c, _)| c))
            .collect()
    }
}
