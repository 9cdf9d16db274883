//! Property-based tests for merge and resolution guarantees

mod determinism;
mod ordering;
