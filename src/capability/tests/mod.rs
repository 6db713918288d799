//! Unit tests for the capability services.

mod repository_handler_tests;
