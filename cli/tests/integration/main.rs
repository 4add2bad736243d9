//! Integration tests for birthday-provision
//!
//! These tests spawn the actual binary and check argument handling and
//! settings validation end to end.

mod cli_tests;
