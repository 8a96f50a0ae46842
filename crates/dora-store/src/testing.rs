//! Scripted in-memory transport for store tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use dora_client::{ApiRequest, Method, Transport};
use dora_core::ApiError;
use serde_json::{Value, json};
use tokio::sync::oneshot;

type ReplyResult = Result<Value, ApiError>;

enum Reply {
    Ready(ReplyResult),
    Gated(oneshot::Receiver<ReplyResult>),
}

/// Replies are queued per `(method, path)` and consumed in order. Unscripted
/// calls fail with a 404 so a test never hangs on a missing reply.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful reply carrying `data` in the envelope.
    pub(crate) fn ok(&self, method: Method, path: &str, data: Value) {
        self.push(method, path, Reply::Ready(Ok(envelope(data))));
    }

    /// Queue a failure.
    pub(crate) fn fail(&self, method: Method, path: &str, err: ApiError) {
        self.push(method, path, Reply::Ready(Err(err)));
    }

    /// Queue a reply that is held until the returned sender fires.
    pub(crate) fn gate(&self, method: Method, path: &str) -> oneshot::Sender<ReplyResult> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Reply::Gated(rx));
        tx
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Yield until at least `n` calls have been issued.
    pub(crate) async fn wait_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let key = (request.method, request.path.clone());
        self.calls.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|q| q.pop_front());

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Transport("gate dropped".into()))),
            None => Err(ApiError::Backend {
                status: 404,
                message: format!("no scripted reply for {} {}", key.0, key.1),
            }),
        }
    }

    async fn send_text(&self, request: ApiRequest) -> Result<String, ApiError> {
        self.send(request).await.map(|v| v.to_string())
    }
}

pub(crate) fn envelope(data: Value) -> Value {
    json!({ "message": "success", "data": data })
}

pub(crate) fn job(id: i64, status: &str) -> Value {
    json!({ "id": id, "type": "backtest", "status": status, "params": {} })
}

pub(crate) fn backend_error(message: &str) -> ApiError {
    ApiError::Backend {
        status: 500,
        message: message.into(),
    }
}
