//! These models represent the objects exchanged with the agent server
//!
//! The server is not entirely consistent about its payloads: the agent list may
//! come back bare or wrapped in an envelope, timestamps may or may not carry an
//! offset, and tool metadata may omit fields. We decode leniently into these
//! internal structs and never hand raw JSON to callers.
pub mod agent;
pub mod timestamp;
pub mod tool;
