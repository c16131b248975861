//! Optional `serde` + `bincode` convenience layer on top of the raw
//! byte-oriented [`Store`](crate::store::Store) API.
//!
//! The store itself only ever moves `&[u8]` / `Vec<u8>` — it has no opinion
//! on what's inside a payload. These helpers are a thin, deliberately
//! separate layer for callers who want to cache `serde`-serializable values
//! directly; nothing in `store.rs` depends on this module.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::pointer::Handle;
use crate::store::Store;

/// Serialize `value` with `bincode` and `put` the result.
pub fn put_value<T: Serialize>(store: &Store, value: &T) -> Result<Handle> {
    let bytes = bincode::serialize(value).map_err(|e| Error::Serialization(e.to_string()))?;
    store.put(&bytes)
}

/// `get` the bytes at `id` and deserialize them as `T` with `bincode`.
pub fn get_value<T: DeserializeOwned>(store: &Store, id: Handle) -> Result<Option<T>> {
    match store.get(id) {
        Some(bytes) => {
            let value = bincode::deserialize(&bytes).map_err(|e| Error::Serialization(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[test]
    fn round_trips_a_serde_value() {
        let store = Store::new(StoreConfig::default()).unwrap();
        let widget = Widget {
            name: "bolt".to_string(),
            count: 12,
        };
        let id = put_value(&store, &widget).unwrap();
        let back: Widget = get_value(&store, id).unwrap().unwrap();
        assert_eq!(widget, back);
    }

    #[test]
    fn missing_handle_yields_none() {
        let store = Store::new(StoreConfig::default()).unwrap();
        let ghost = Handle::new(12345).unwrap();
        let back: Option<Widget> = get_value(&store, ghost).unwrap();
        assert!(back.is_none());
    }
}
