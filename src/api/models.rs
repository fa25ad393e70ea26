use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Custom deserializer: the server signals the final page either by omitting
/// the continuation token or by sending an empty string. Both become `None`.
fn deserialize_continuation<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|token| !token.is_empty()))
}

/// Logical name of a table within the storage account. Stateless and cheap
/// to construct repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    name: String,
}

impl TableReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Query options sent with every segment request. Opaque to the executor,
/// which only cares about segment/token mechanics.
#[derive(Debug, Clone, Default)]
pub struct QueryPredicate {
    /// Server-side filter expression
    pub filter: Option<String>,
    /// Per-segment row cap requested from the server
    pub top: Option<u32>,
}

impl QueryPredicate {
    /// The default "select all" query, no filter and server-chosen page size.
    pub fn select_all() -> Self {
        Self::default()
    }
}

/// One page of a segmented query response.
#[derive(Debug, Deserialize)]
pub struct QuerySegment<T> {
    #[serde(rename = "value")]
    pub rows: Vec<T>,
    #[serde(
        rename = "continuationToken",
        default,
        deserialize_with = "deserialize_continuation"
    )]
    pub continuation: Option<String>,
}

/// Capability required of a record type: deserializable from a row and
/// carrying a unique identity within its table.
pub trait TableEntity: DeserializeOwned + Send {
    fn partition_key(&self) -> &str;
    fn row_key(&self) -> &str;
}

/// Schema-less row: a property bag of column name to JSON value. Lets the
/// CLI list any table without a compiled record type.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DynamicRow {
    properties: Map<String, Value>,
}

impl DynamicRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.properties.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    fn str_property(&self, column: &str) -> &str {
        self.properties
            .get(column)
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

impl TableEntity for DynamicRow {
    fn partition_key(&self) -> &str {
        self.str_property("PartitionKey")
    }

    fn row_key(&self) -> &str {
        self.str_property("RowKey")
    }
}
