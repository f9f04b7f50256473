use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ArtifactError;

/// Ordered feature names the scaler and classifier were fitted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Arc<[String]>,
}

impl FeatureSchema {
    pub fn new<I, S>(columns: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ArtifactError::EmptySchema);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ArtifactError::DuplicateFeature(column.clone()));
            }
        }

        Ok(Self {
            columns: columns.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub(crate) fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = ArtifactError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(value: FeatureSchema) -> Self {
        value.columns.to_vec()
    }
}
