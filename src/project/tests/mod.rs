//! Unit tests for project domain rules and service orchestration.

mod service_failure_tests;
