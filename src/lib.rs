//! Purpose: Typed client library for a remote ordered hierarchical key-value store.
//! Exports: `core` (errors, keys, paths, query model) and `api` (`StoreClient`).
//! Role: Read/write contract consumed by reporting and automation glue.
//! Invariants: One HTTP round trip per operation; no process-global state.
//! Invariants: Prefix matching is emulated via closed key-range scans.
pub mod api;
pub mod core;
