//! Remote-store binding for the putsweep janitor.
//!
//! Defines the [`store::RemoteStore`] capability trait the eviction engine
//! consumes, a [`reqwest`]-based client for the put.io v2 file API that
//! implements it, wire-type normalization, and bounded retry for
//! transient failures.

pub mod api;
pub mod retry;
pub mod store;
pub mod wire;
