//! Core library for the album-centred social backend.
//!
//! The crate is organised hexagonally, following ports-and-adapters:
//!
//! - [`domain`] holds entities, value types, domain services, and the port
//!   traits those services drive.
//! - [`outbound`] holds the adapters: Diesel/PostgreSQL persistence and the
//!   Redis-or-memory session store.
//! - [`config`] reads process configuration from the environment.
//!
//! HTTP routing, credential verification, and catalog metadata lookup are
//! external collaborators; they hand the domain services validated arguments
//! and consume plain records or typed [`domain::Error`] failures.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
