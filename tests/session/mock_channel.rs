use async_trait::async_trait;
use dephy_interact::rings::{ControlChannel, Method};
use dephy_interact::{Error, Result};
use serde_json::{json, Value};
use std::sync::Mutex;

/// In-memory control channel that records every request.
#[derive(Default)]
pub struct MockControlChannel {
    calls: Mutex<Vec<(Method, Value)>>,
    fail_on: Option<Method>,
}

impl MockControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(method: Method) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(method),
        }
    }

    pub fn calls(&self) -> Vec<(Method, Value)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }
}

#[async_trait]
impl ControlChannel for MockControlChannel {
    async fn request(&self, method: Method, params: Value) -> Result<Value> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((method, params));
        if self.fail_on == Some(method) {
            return Err(Error::Connection(format!("{} rejected", method.as_str())));
        }
        Ok(json!({}))
    }
}
