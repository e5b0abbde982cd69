//! KV namespaces and queues, the platform's two coordination primitives.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::lenient_enum;

lenient_enum! {
    pub enum CoordinationState {
        Ready => "ready",
        NotReady => "not-ready",
        Deleting => "deleting",
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvNamespace {
    pub name: String,
    pub status: Option<CoordinationState>,
    pub created_at: Option<i64>,
}

impl KvNamespace {
    pub fn is_ready(&self) -> bool {
        self.status == Some(CoordinationState::Ready)
    }
}

/// One page of keys. `cursor` is absent on the last page.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialKeyList {
    #[serde(default)]
    pub keys: Vec<String>,
    pub cursor: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    pub status: Option<CoordinationState>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLength {
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_key_list_last_page() {
        let page: PartialKeyList = serde_json::from_value(json!({"keys": ["a", "b"]})).unwrap();
        assert_eq!(page.keys, vec!["a", "b"]);
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn test_namespace_readiness() {
        let ns: KvNamespace =
            serde_json::from_value(json!({"name": "cache", "status": "ready"})).unwrap();
        assert!(ns.is_ready());
        let ns: KvNamespace = serde_json::from_value(json!({"name": "cache"})).unwrap();
        assert!(!ns.is_ready());
    }
}
