//! Test modules for the queue system
//!
//! This module organizes all the test suites for the shared queue.
//! Tests are organized by functional area for better maintainability.

mod consumer;
mod edge_cases;
mod lifecycle;
