//! Testing utilities for the gigpulse workspace
//!
//! Shared fakes for the network seams and fixtures for pages, snapshots and
//! the tracking document.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

mod fakes;
mod fixtures;

pub use fakes::{FakeChannel, FakeGenerator, FakePageSource, FakeResponse, SentMessage};
pub use fixtures::*;
