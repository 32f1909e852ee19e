//! Testing utilities for the village complaint service
//!
//! - Fixtures built from `fake` data for admins, citizens and submissions
//! - Fluent builders for inputs and stored complaints
//! - Port doubles that fail, race or script their answers
//! - [`TestWorld`], the full service graph over in-memory stores and a fixed clock
//!
//! # Examples
//!
//! ```
//! use vcm_testing::SubmissionBuilder;
//! use vcm_domain::Urgency;
//!
//! let input = SubmissionBuilder::new()
//!     .with_title("Broken hand pump")
//!     .with_urgency(Urgency::High)
//!     .build();
//! assert_eq!(input.category, "Water Supply Issues");
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;
pub mod world;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;
pub use world::{TestWorld, TestWorldBuilder};

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;
