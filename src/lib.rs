//! verimail library entrypoint.
//!
//! Modules:
//! - `app`: startup, configuration, shared state
//! - `ingest`: raw message, body reassembly and the processing pipeline
//! - `mime`: boundary splitting and transfer decoding
//! - `extract`: verification code and link heuristics
//! - `store`: expiring key-value store and verification records
//! - `notify`: push notifications
//! - `http`: Axum router for the query API
//! - `smtp`: SMTP listener feeding the pipeline
//! - `db`: migrations and SQLite helpers
//! - `models`: typed records used across layers
//! - `error`: error taxonomy
//! - `util`: tracing, header collection, time formatting

pub mod app;
pub mod db;
pub mod error;
pub mod extract;
pub mod http;
pub mod ingest;
pub mod mime;
pub mod models;
pub mod notify;
pub mod smtp;
pub mod store;
pub mod util;
