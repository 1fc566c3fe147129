//! Hash helpers (blake3, salida hex).

use blake3::Hasher;
use serde::Serialize;

use super::to_canonical_json;
use crate::errors::StoreError;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Huella estable de una definición: hash del JSON canónico.
pub fn fingerprint<T: Serialize>(definition: &T) -> Result<String, StoreError> {
    let value = serde_json::to_value(definition).map_err(|e| StoreError::InvalidDefinition(format!("serialización: {e}")))?;
    Ok(hash_str(&to_canonical_json(&value)))
}
