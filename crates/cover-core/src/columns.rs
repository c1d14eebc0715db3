/// Ordered column contract between the assembled row and the classifier.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Exact column order the classifier was trained on. Non-empty, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SelectedColumns(Vec<String>);

impl SelectedColumns {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::EmptyColumns);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(Error::DuplicateColumn(dup.clone()));
        }
        Ok(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }
}

impl TryFrom<Vec<String>> for SelectedColumns {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<SelectedColumns> for Vec<String> {
    fn from(cols: SelectedColumns) -> Self {
        cols.0
    }
}

/// Selected columns split by whether the scaler handles them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Selected columns the scaler knows, in selected order.
    pub numeric: Vec<String>,
    /// The remaining selected columns, passed through unscaled.
    pub categorical: Vec<String>,
}

pub fn partition(selected: &SelectedColumns, scaler_names: &[String]) -> Partition {
    let (numeric, categorical) = selected
        .names()
        .iter()
        .cloned()
        .partition(|n| scaler_names.contains(n));
    Partition { numeric, categorical }
}
