//! End-to-end tests for the transpilation pipeline live in `tests/`;
//! this crate intentionally exports nothing.
