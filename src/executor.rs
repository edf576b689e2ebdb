use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{ApiRequest, Endpoint, Transport};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Pending,
    Settled,
}

/// The last successful payload survives later Pending and failed states.
#[derive(Debug)]
pub struct RequestLifecycle<R> {
    status: Status,
    data: Option<R>,
    error: Option<String>,
}

impl<R> RequestLifecycle<R> {
    fn new() -> Self {
        Self {
            status: Status::Idle,
            data: None,
            error: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    pub fn data(&self) -> Option<&R> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_failed(&self) -> bool {
        self.status == Status::Settled && self.error.is_some()
    }
}

pub struct Settlement<R> {
    pub ticket: Ticket,
    pub result: Result<R, AppError>,
}

pub struct Dispatch<R> {
    ticket: Ticket,
    future: BoxFuture<'static, Result<R, AppError>>,
}

impl<R> Dispatch<R> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub async fn finish(self) -> Settlement<R> {
        let result = self.future.await;
        Settlement {
            ticket: self.ticket,
            result,
        }
    }
}

/// Binds one endpoint to a lifecycle. Only the latest dispatched ticket may settle it.
pub struct RequestExecutor<R> {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    lifecycle: RequestLifecycle<R>,
    issued: u64,
}

impl<R> RequestExecutor<R>
where
    R: DeserializeOwned + Send + 'static,
{
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
            lifecycle: RequestLifecycle::new(),
            issued: 0,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn lifecycle(&self) -> &RequestLifecycle<R> {
        &self.lifecycle
    }

    pub fn is_pending(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn latest_ticket(&self) -> Option<Ticket> {
        (self.issued > 0).then_some(Ticket(self.issued))
    }

    pub fn dispatch_query<Q>(&mut self, query: Q) -> Dispatch<R>
    where
        Q: Serialize + Send + 'static,
    {
        self.dispatch(Some(query), None::<()>)
    }

    pub fn dispatch_body<B>(&mut self, body: B) -> Dispatch<R>
    where
        B: Serialize + Send + 'static,
    {
        self.dispatch(None::<()>, Some(body))
    }

    /// Issues exactly one call. No retries, no caching.
    pub fn dispatch<Q, B>(&mut self, query: Option<Q>, body: Option<B>) -> Dispatch<R>
    where
        Q: Serialize + Send + 'static,
        B: Serialize + Send + 'static,
    {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.lifecycle.status = Status::Pending;
        self.lifecycle.error = None;

        let endpoint = self.endpoint;
        let transport = Arc::clone(&self.transport);
        let request_id = Uuid::new_v4();
        debug!(%request_id, %ticket, "dispatching {}", endpoint);

        let future = async move {
            let query = query.map(serde_json::to_value).transpose()?;
            let body = body.map(serde_json::to_value).transpose()?;
            let value = transport
                .send(ApiRequest {
                    endpoint,
                    query,
                    body,
                    request_id,
                })
                .await?;
            let payload = serde_json::from_value::<R>(value)?;
            Ok::<R, AppError>(payload)
        }
        .boxed();

        Dispatch { ticket, future }
    }

    /// Returns false when the outcome was discarded as stale.
    pub fn settle(&mut self, settlement: Settlement<R>) -> bool {
        let outcome = settlement.result.map_err(|e| e.to_string());
        self.apply(settlement.ticket, outcome)
    }

    /// Awaits without settling. Dropping the future abandons the call.
    pub async fn wait(&mut self, dispatch: Dispatch<R>) -> Settlement<R> {
        let mut guard = InFlight {
            executor: self,
            ticket: dispatch.ticket(),
            armed: true,
        };
        let settlement = dispatch.finish().await;
        guard.armed = false;
        settlement
    }

    pub async fn invoke<Q, B>(&mut self, query: Option<Q>, body: Option<B>) -> Result<R, AppError>
    where
        Q: Serialize + Send + 'static,
        B: Serialize + Send + 'static,
        R: Clone,
    {
        let dispatch = self.dispatch(query, body);
        let Settlement { ticket, result } = self.wait(dispatch).await;
        match result {
            Ok(payload) => {
                self.apply(ticket, Ok(payload.clone()));
                Ok(payload)
            }
            Err(e) => {
                self.apply(ticket, Err(e.to_string()));
                Err(e)
            }
        }
    }

    fn apply(&mut self, ticket: Ticket, outcome: Result<R, String>) -> bool {
        if Some(ticket) != self.latest_ticket() || !self.lifecycle.is_pending() {
            debug!(
                %ticket,
                latest = ?self.latest_ticket(),
                "discarding stale response from {}",
                self.endpoint
            );
            return false;
        }

        match outcome {
            Ok(payload) => {
                self.lifecycle.data = Some(payload);
                self.lifecycle.error = None;
            }
            Err(detail) => {
                warn!(%ticket, "{} failed: {}", self.endpoint, detail);
                self.lifecycle.error = Some(detail);
            }
        }
        self.lifecycle.status = Status::Settled;
        true
    }
}

impl<R> RequestExecutor<R> {
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lifecycle.is_pending() && self.issued == ticket.0
    }

    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        debug!(%ticket, "abandoning call to {}", self.endpoint);
        self.lifecycle.status = if self.lifecycle.data.is_some() {
            Status::Settled
        } else {
            Status::Idle
        };
        true
    }
}

struct InFlight<'a, R> {
    executor: &'a mut RequestExecutor<R>,
    ticket: Ticket,
    armed: bool,
}

impl<R> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.executor.abandon(self.ticket);
        }
    }
}
