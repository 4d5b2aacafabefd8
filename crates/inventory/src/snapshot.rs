//! JSON snapshot of an inventory, as kept by key-value storage.

use serde_json::Value;

use crate::inventory::InventoryEntry;
use crate::store::StoreError;

pub fn encode(entries: &[InventoryEntry]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(entries)?)
}

/// Decode a stored snapshot.
///
/// Anything that parses but is not a JSON array (e.g. `{}` or `null` left by an
/// older client) counts as an empty inventory. Unparsable text or malformed
/// entries are errors.
pub fn decode(raw: &str) -> Result<Vec<InventoryEntry>, StoreError> {
    match serde_json::from_str::<Value>(raw)? {
        value @ Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(Vec::new()),
    }
}
