//! Shared utilities used across the relay, currently logging setup.

pub mod logging;
