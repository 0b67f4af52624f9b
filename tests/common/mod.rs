//! Common test utilities and fixtures for lemmaforge integration tests
//!
//! This module provides:
//! - `TestCorpus` builder for creating token-store databases in a temp dir
//! - Helpers for running the CLI binary and inspecting the lemma layer

#![allow(dead_code)]

pub mod test_corpus;

pub use test_corpus::{stderr, stdout, TestCorpus};
