//! Integration tests for the dashboard
//!
//! These tests use wiremock to stand in for the procurement search API and
//! exercise the fetch loop and the full fetch → clean → report pipeline.

mod common;
mod fetch_tests;
mod pipeline_tests;
