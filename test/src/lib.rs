//! Test helpers and end-to-end suites for the groupcast crates.

pub mod helpers;
