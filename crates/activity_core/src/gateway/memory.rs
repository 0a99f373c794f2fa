//! In-process gateway backend.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Key-value map living for the lifetime of the process.
///
/// Used for ephemeral sessions and as the reference backend in tests.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    opened: AtomicBool,
    writes: AtomicU64,
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway already holding `value` under `key`.
    pub fn with_entry(key: &str, value: Value) -> Self {
        let gateway = Self::default();
        if let Ok(mut entries) = gateway.entries.lock() {
            entries.insert(key.to_string(), value);
        }
        gateway
    }

    /// Reads a stored value without requiring `open`.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Number of completed `set` calls.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> GatewayResult<()> {
        if self.opened.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::NotOpen)
        }
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn open(&self) -> GatewayResult<()> {
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> GatewayResult<Option<Value>> {
        self.ensure_open()?;
        let entries = self
            .entries
            .lock()
            .map_err(|_| GatewayError::Backend("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> GatewayResult<()> {
        self.ensure_open()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| GatewayError::Backend("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryGateway;
    use crate::gateway::{GatewayError, PersistenceGateway};
    use serde_json::json;

    #[tokio::test]
    async fn rejects_access_before_open() {
        let gateway = MemoryGateway::new();
        let err = gateway.get("k").await.expect_err("get before open must fail");
        assert!(matches!(err, GatewayError::NotOpen));
        assert!(gateway.set("k", json!(1)).await.is_err());
    }

    #[tokio::test]
    async fn set_overwrites_and_get_returns_latest() {
        let gateway = MemoryGateway::new();
        gateway.open().await.unwrap();
        gateway.open().await.unwrap();

        assert_eq!(gateway.get("k").await.unwrap(), None);
        gateway.set("k", json!([1])).await.unwrap();
        gateway.set("k", json!([1, 2])).await.unwrap();
        assert_eq!(gateway.get("k").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(gateway.write_count(), 2);
    }
}
