#![deny(missing_docs)]
//! Approximate token counting that does not need a tokenizer.
//!
//! Exact tokenization is provider-specific and usually unavailable before
//! a request is sent. [`TokenEstimator`] classifies characters by script
//! and divides each class by its own characters-per-token ratio, rounding
//! up so budget decisions stay conservative across mixed-language text.

pub mod counter;
pub mod script;

pub use counter::{MESSAGE_OVERHEAD_TOKENS, TokenCounter, TokenEstimator};
pub use script::{Script, ScriptRatios};
