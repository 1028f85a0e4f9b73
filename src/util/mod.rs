//! Utility modules: timeout.

pub mod timeout;
