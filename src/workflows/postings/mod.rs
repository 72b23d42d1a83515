//! Normalized posting model shared by every site adapter.

pub mod domain;

pub use domain::{JobKey, JobRecord};
