//! Scripted completion client for tests.

use crate::error::TaskResult;
use crate::llm::{CompletionClient, CompletionRequest};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};

type Responder = dyn Fn(&CompletionRequest) -> BoxFuture<'static, TaskResult<Value>> + Send + Sync;

/// Answers each request with a caller-supplied closure and records every
/// request at the moment it is issued.
#[derive(Clone)]
pub struct ScriptedClient {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedClient {
    /// Respond immediately.
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&CompletionRequest) -> TaskResult<Value> + Send + Sync + 'static,
    {
        Self::with_async(move |request| {
            let reply = respond(request);
            async move { reply }.boxed()
        })
    }

    /// Respond with a future, e.g. to delay or never complete.
    pub fn with_async<F>(respond: F) -> Self
    where
        F: Fn(&CompletionRequest) -> BoxFuture<'static, TaskResult<Value>> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(respond),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of all requests issued so far, in issue order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests issued for the given output type.
    pub fn count(&self, schema_name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.schema_name == schema_name)
            .count()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> TaskResult<Value> {
        let reply = (self.responder)(&request);
        self.calls.lock().unwrap().push(request);
        reply.await
    }
}
