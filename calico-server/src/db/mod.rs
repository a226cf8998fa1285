//! Database access for calico-server
//!
//! The songs table is the only shared mutable resource; every counter
//! mutation is a single statement so concurrent requests cannot lose updates.

pub mod songs;
