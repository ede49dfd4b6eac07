//! dt-review: schema review engine
//!
//! Six independent checks over a built schema model and its relationship
//! graph. Structural checks need nothing else; data checks ask a
//! [`DataSampler`] for row counts, distinct key counts and key histograms.

pub mod check;
pub mod context;
pub mod error;
pub mod finding;
pub mod sampler;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use check::{CheckManager, DataCheck, StructuralCheck};
pub use context::ReviewContext;
pub use error::{ReviewError, ReviewResult, SamplerError, SamplerResult};
pub use finding::{Finding, FindingCategory, ReviewReport};
pub use sampler::{DataSampler, KeyHistogram, TimedSampler};
