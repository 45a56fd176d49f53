#![deny(missing_docs)]
//! Structural repair for truncated model output.
//!
//! A response cut off by a token limit usually stops inside something: a
//! JSON object, a string, a fenced code block. [`ContentRepairer`] appends
//! the minimal closing sequence so the fragment can be merged or shown.
//! It guarantees structural closure only, never semantic correctness.
//!
//! The [`scan`] module exposes the underlying delimiter analysis so other
//! crates can detect truncation without repairing anything.

mod json;
pub mod repairer;
pub mod scan;

pub use repairer::{ContentRepairer, Repair};
pub use scan::{Fence, open_fence, unclosed_brackets};
