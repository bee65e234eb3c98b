//! Nullforge — offline Terraform JSON generation.
//!
//! Builds `null_resource` documents from a factory, clones them through
//! prototypes, aggregates them in a composite module, and writes one
//! `.tf.json` file. No providers, credentials, or network access required.

pub mod cli;
pub mod core;
