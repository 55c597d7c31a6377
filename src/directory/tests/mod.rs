//! Unit tests for the directory module.
//!
//! Tests are organised by domain concept, covering happy paths, error
//! cases, and edge cases for all public APIs.
