#![deny(missing_docs)]
//! Reasoning extraction for reprise.
//!
//! Providers return their reasoning in incompatible shapes. Each shape gets
//! one [`ReasoningFormat`] implementation:
//!
//! | Module | Format | Opaque state |
//! |--------|--------|--------------|
//! | [`signed_block`] | Typed content blocks with signed `thinking` and `redacted_thinking` | Well-formed blocks, serialized |
//! | [`field`] | A reasoning text field, or Responses-style `reasoning` output items | `encrypted_content` items or detail arrays |
//! | [`signature`] | Parts flagged `thought: true`, plus `thoughtSignature` parts | Signature-carrying parts |
//! | [`tagged`] | Inline `<think>...</think>` spans in the answer | None |
//!
//! [`ReasoningExtractor`] selects one by [`ProviderFamily`]. Malformed
//! payloads never fail extraction: a bad block is logged and skipped, and a
//! response with no reasoning yields `None`.
//!
//! [`ProviderFamily`]: reprise_types::ProviderFamily

mod extractor;
pub mod field;
pub mod signature;
pub mod signed_block;
pub mod tagged;

pub use extractor::{Extraction, ExtractorConfig, ReasoningExtractor, ReasoningFormat};
pub use field::{FieldFormat, FieldPointers};
pub use signature::SignatureFormat;
pub use signed_block::{BLOCK_DELIMITER, SignedBlockFormat};
pub use tagged::{TagDelimiters, TaggedFormat};

use serde_json::Value;

/// Reasoning tokens from the normalized usage, else from the first raw
/// pointer that holds an integer.
pub(crate) fn reasoning_tokens(
    response: &reprise_types::ProviderResponse,
    raw_pointers: &[&str],
) -> u64 {
    if let Some(tokens) = response.usage.as_ref().and_then(|u| u.reasoning_tokens) {
        return tokens;
    }
    response
        .raw
        .as_ref()
        .and_then(|raw| {
            raw_pointers
                .iter()
                .find_map(|p| raw.pointer(p).and_then(Value::as_u64))
        })
        .unwrap_or(0)
}

/// Serialize retained payload items as opaque state bytes.
///
/// Object keys keep the order the provider sent them in (`preserve_order`),
/// so a block re-serializes to its original compact text.
pub(crate) fn encode_items(items: Vec<Value>) -> Option<Vec<u8>> {
    if items.is_empty() {
        return None;
    }
    match serde_json::to_vec(&Value::Array(items)) {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            tracing::warn!(%error, "reprise.reasoning.encode_failed");
            None
        }
    }
}
