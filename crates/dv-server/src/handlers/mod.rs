//! HTTP request handlers.

pub(crate) mod browse;
pub(crate) mod stylesheet;
