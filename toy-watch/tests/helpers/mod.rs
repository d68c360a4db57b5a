//! Test helper modules for toy-watch integration tests
//!
//! - TestServer: router over an in-memory catalog
//! - clip/catalog builders

#![allow(dead_code)]

pub mod test_server;

pub use test_server::{clips, TestServer, TEST_CATALOG};
