//! Input report loading.
//!
//! Reads the four report formats from disk into typed entries.

pub mod loader;

pub use loader::{
    load_policy_violations, load_relocations, load_renovate, load_vulnerabilities,
};
