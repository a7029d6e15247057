//! Test utilities and fixtures for esr
//!
//! This crate provides shared test helpers for the integration tests of
//! `esr-core` and `esr-cli`.

pub mod fixtures;
pub mod mocks;

pub use fixtures::ProjectFixture;
pub use mocks::RecordingEngine;
