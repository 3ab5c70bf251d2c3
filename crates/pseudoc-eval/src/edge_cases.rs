//! Edge case and scenario tests for pseudoc-eval
//!
//! These drive complete programs through the full pipeline with in-memory
//! I/O and assert on the produced output lines.
