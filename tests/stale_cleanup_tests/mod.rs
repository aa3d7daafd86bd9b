//! Stale cleanup stories
//!
//! # Test Organization
//!
//! - `scenarios`: one story per kind of stale object, each starting from a
//!   member that drifted away from its leader
//!
//! - `properties`: guarantees that hold for every cleanup regardless of
//!   what drifted (idempotence, user objects untouched, partial failure)

mod fixtures;
mod properties;
mod scenarios;
