#![deny(missing_docs)]
//! Truncation classification for reprise.
//!
//! [`TruncationClassifier`] looks at one physical response and decides
//! whether it stopped early, and why. Explicit vendor signals win; the
//! structural heuristics only run when the response carries no recognised
//! stop signal.
//!
//! ```
//! use reprise_classify::TruncationClassifier;
//! use reprise_types::{ProviderResponse, TruncationReason};
//!
//! let classifier = TruncationClassifier::new();
//! let info = classifier.classify(&ProviderResponse::new("length", "The first step is"));
//! assert_eq!(info.reason, TruncationReason::TokenLimit);
//!
//! let info = classifier.classify(&ProviderResponse::new("stop", "Done."));
//! assert!(!info.is_truncated);
//! ```

mod classifier;
pub mod signal;

pub use classifier::TruncationClassifier;
pub use signal::{Signal, finish_signal};
