//! Integration tests for rtop core

mod collector_tests;
mod fake_host;
mod harvest_tests;
