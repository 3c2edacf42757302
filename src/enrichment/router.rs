//! Output routing
//!
//! Every processed event leaves through exactly one `send()`, addressed to
//! either the success or the failure destination.

use crate::event::Event;
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;
use thiserror::Error;

/// Which logical destination an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Success,
    Failure,
}

/// A logical route bound to its configured destination name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub route: Route,
    pub name: String,
}

impl Destination {
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            route: Route::Success,
            name: name.into(),
        }
    }

    pub fn failure(name: impl Into<String>) -> Self {
        Self {
            route: Route::Failure,
            name: name.into(),
        }
    }
}

/// Errors from delivering an event to its destination.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Router lock poisoned")]
    LockPoisoned,
}

/// The outbound side of the stage.
pub trait OutputRouter: Send + Sync {
    fn send(&self, destination: &Destination, event: &Event) -> Result<(), RouteError>;
}

/// Router that keeps every sent event in memory, in send order.
#[derive(Debug, Default)]
pub struct MemoryRouter {
    sent: Mutex<Vec<(Destination, Event)>>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All sends so far.
    pub fn sent(&self) -> Vec<(Destination, Event)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Events sent to the given route.
    pub fn sent_to(&self, route: Route) -> Vec<Event> {
        self.sent()
            .into_iter()
            .filter(|(d, _)| d.route == route)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputRouter for MemoryRouter {
    fn send(&self, destination: &Destination, event: &Event) -> Result<(), RouteError> {
        self.sent
            .lock()
            .map_err(|_| RouteError::LockPoisoned)?
            .push((destination.clone(), event.clone()));
        Ok(())
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    destination: &'a str,
    event: &'a Event,
}

/// Router writing one `{"destination": ..., "event": ...}` line per send.
pub struct JsonLinesRouter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesRouter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, RouteError> {
        self.writer.into_inner().map_err(|_| RouteError::LockPoisoned)
    }
}

impl<W: Write + Send> OutputRouter for JsonLinesRouter<W> {
    fn send(&self, destination: &Destination, event: &Event) -> Result<(), RouteError> {
        let line = serde_json::to_string(&Envelope {
            destination: &destination.name,
            event,
        })?;
        let mut writer = self.writer.lock().map_err(|_| RouteError::LockPoisoned)?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}
