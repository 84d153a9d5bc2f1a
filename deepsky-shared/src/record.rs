//! The record stream consumed by [`DsoDatabaseBuilder::load`](crate::database::DsoDatabaseBuilder::load).

use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A record that could not be read from its source.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RecordError(#[from] serde_json::Error);

/// A single catalog entry as produced by a catalog parser.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogRecord {
    /// The type tag, e.g. `Galaxy`.
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
    /// An explicit catalog number; one is assigned automatically if missing.
    #[serde(rename = "number", default)]
    pub catalog_number: Option<u32>,
    /// Names separated by `:`.
    #[serde(default)]
    pub names: String,
    /// A key-value block with the properties of the object.
    #[serde(default)]
    pub fields: Value,
}

impl CatalogRecord {
    /// Splits [`Self::names`] into its individual names.
    pub fn name_list(&self) -> impl Iterator<Item = &str> {
        self.names.split(':').filter(|name| !name.is_empty())
    }
}

/// Reads a sequence of JSON objects, one [`CatalogRecord`] each.
///
/// Objects may be separated by any whitespace, which covers JSON lines. Iteration stops after the
/// first error.
pub fn read_json_records<R: Read>(
    reader: R,
) -> impl Iterator<Item = Result<CatalogRecord, RecordError>> {
    let mut failed = false;
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<CatalogRecord>()
        .map_while(move |record| {
            if failed {
                return None;
            }
            failed = record.is_err();
            Some(record.map_err(RecordError::from))
        })
}
