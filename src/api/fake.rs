//! In-memory transport for unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

use crate::api::ApiTransport;
use crate::{DubdeskError, Result};

/// A request seen by [`FakeTransport`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Holds requests in flight until the test releases them
pub(crate) struct Gate {
    pub started: Notify,
    pub release: Semaphore,
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<HashMap<String, std::result::Result<Value, u16>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body));
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(status));
    }

    /// Park every following request until `gate.release` gets a permit.
    pub fn hold_requests(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate {
            started: Notify::new(),
            release: Semaphore::new(0),
        });
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }

    async fn handle(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release
                .acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }

        let response = self.responses.lock().unwrap().get(path).cloned();
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(DubdeskError::Status {
                status,
                path: path.to_string(),
                body: String::new(),
            }),
            None => Err(DubdeskError::Status {
                status: 404,
                path: path.to_string(),
                body: "no canned response".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ApiTransport for FakeTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        self.handle("GET", path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.handle("POST", path, Some(body)).await
    }
}
