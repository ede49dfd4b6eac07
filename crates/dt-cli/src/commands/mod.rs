//! CLI command implementations

pub(crate) mod common;
pub(crate) mod convert;
pub(crate) mod review;
pub(crate) mod validate;
