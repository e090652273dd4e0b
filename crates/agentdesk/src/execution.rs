//! Live execution of an agent against a query.
//!
//! The server pushes one JSON payload per event over a server-sent event
//! stream. [`ExecutionController`] owns at most one such stream at a time,
//! folds its events into [`ExecutionSnapshot`] state, and closes the stream on
//! terminal events, on [`ExecutionController::stop_execution`], and on drop.
pub mod controller;
pub mod event;
pub mod transport;

#[cfg(test)]
pub mod mock;

pub use controller::{ExecutionController, ExecutionSnapshot, ExecutionStep, ExecutionUpdate};
pub use event::StreamEvent;
pub use transport::{EventStream, HttpStreamTransport, StreamError, StreamTransport};
