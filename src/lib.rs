//! Guest Session - anonymous participant identity and verification
//!
//! This crate keeps one guest session per project scope, registers guests
//! (optionally claiming a roster identity), restores sessions across
//! devices, and watches liveness and verification status in the background
//! until the server ends the session.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
