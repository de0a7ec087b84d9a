//! In-memory queue and sink used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use veil::adapters::{MessageQueue, RecordSink};
use veil::config::secret_string;
use veil::core::transform::RecordTransformer;
use veil::domain::{OutputRecord, QueueError, QueueMessage, SinkError};
use veil::pseudonymization::{Pseudonymizer, ReverseLookup, StoreSet};

pub const SALT: &str = "integration-salt";

/// Queue holding a fixed list of messages
pub struct MemoryQueue {
    messages: Mutex<Vec<QueueMessage>>,
    pub deleted: Mutex<Vec<String>>,
}

impl MemoryQueue {
    pub fn new(bodies: Vec<String>) -> Self {
        let messages = bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                QueueMessage::new(body)
                    .with_message_id(format!("msg-{i}"))
                    .with_receipt_handle(format!("receipt-{i}"))
            })
            .collect();
        Self {
            messages: Mutex::new(messages),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn fetch_batch(
        &self,
        max_messages: u32,
        _wait_time_seconds: u32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let mut messages = self.messages.lock().unwrap();
        let take = messages.len().min(max_messages as usize);
        Ok(messages.drain(..take).collect())
    }

    async fn acknowledge(&self, messages: &[QueueMessage]) -> Result<usize, QueueError> {
        let mut deleted = self.deleted.lock().unwrap();
        let handles = messages
            .iter()
            .filter_map(|m| m.receipt_handle.clone())
            .collect::<Vec<_>>();
        let count = handles.len();
        deleted.extend(handles);
        Ok(count)
    }
}

/// Sink that keeps every inserted record
#[derive(Default)]
pub struct MemorySink {
    pub records: Mutex<Vec<OutputRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<OutputRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn test_connection(&self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn insert(&self, record: &OutputRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Transformer over the mapping files in `dir`
pub fn transformer(dir: &Path, mode: ReverseLookup) -> RecordTransformer {
    let stores = StoreSet::load(dir, mode).expect("mapping files load");
    RecordTransformer::new(Pseudonymizer::new(secret_string(SALT.to_string()), stores))
}

/// A complete login event
pub fn login_event(ip: &str, device_id: &str, version: &str) -> String {
    serde_json::json!({
        "user_id": "424cdd21-063a-43a7-b91b-7ca1a833afae",
        "app_version": version,
        "device_type": "android",
        "ip": ip,
        "locale": "RU",
        "device_id": device_id,
    })
    .to_string()
}
