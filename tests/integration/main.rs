//! Integration tests for the snapshot engine
//!
//! These tests use wiremock to stand up mock storefronts and drive full
//! runs end-to-end, from category discovery to the snapshot file on disk.

mod markup_tests;
mod records_tests;
mod retry_tests;
