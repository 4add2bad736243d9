//! Unit tests for birthday-provision
//!
//! These tests use in-memory hosts and run fast without touching the machine.

mod helpers;
mod property_tests;
