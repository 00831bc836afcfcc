//! Test infrastructure for tagbind
//!
//! Provides fixture loading, stochastic test generation, a reference
//! serializer and assertion helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;
mod serialize;

pub use generators::Gen;
pub use harness::{collect_events, error_kind, format_event, run_test, run_with_variations};
pub use loader::{load_fixtures_by_name, ExpectedEvent, TestCase};
pub use serialize::to_markup;
