//! Metadata filters restricting which nodes retrieval may draw from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::document::DOC_ID_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Metadata value must be one of the listed values.
    In,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub key: String,
    pub operator: FilterOperator,
    pub value: Vec<String>,
}

/// Conjunction of metadata filters. `None` at the call site means "search all documents".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilters {
    pub filters: Vec<MetadataFilter>,
}

impl MetadataFilters {
    /// Restricts retrieval to the given document ids.
    ///
    /// An empty list yields `None`: an empty membership set would match nothing.
    pub fn doc_ids(ids: &[String]) -> Option<Self> {
        if ids.is_empty() {
            return None;
        }
        Some(Self {
            filters: vec![MetadataFilter {
                key: DOC_ID_KEY.to_string(),
                operator: FilterOperator::In,
                value: ids.to_vec(),
            }],
        })
    }

    /// The allow-listed document ids, if this filter set constrains `doc_id`.
    pub fn doc_id_values(&self) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|f| f.key == DOC_ID_KEY && f.operator == FilterOperator::In)
            .map(|f| f.value.as_slice())
    }

    /// True when every filter accepts the node metadata.
    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        self.filters.iter().all(|filter| {
            let Some(actual) = metadata.get(&filter.key) else {
                return false;
            };
            match filter.operator {
                FilterOperator::In => match actual {
                    Value::String(s) => filter.value.iter().any(|v| v == s),
                    other => filter.value.iter().any(|v| *v == other.to_string()),
                },
            }
        })
    }
}
