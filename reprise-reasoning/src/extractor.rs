use crate::field::{FieldFormat, FieldPointers};
use crate::signature::SignatureFormat;
use crate::signed_block::SignedBlockFormat;
use crate::tagged::{TagDelimiters, TaggedFormat};
use reprise_types::{ConfigError, ProviderFamily, ProviderResponse, ReasoningState, ThinkingContent};
use serde::{Deserialize, Serialize};

/// One provider reasoning format.
///
/// Both extraction operations return `None` when the response carries no
/// reasoning in this format. They never fail.
pub trait ReasoningFormat: Send + Sync {
    /// The family this format belongs to.
    fn family(&self) -> ProviderFamily;

    /// Reasoning text and token count for one response.
    fn try_parse(&self, response: &ProviderResponse) -> Option<ThinkingContent>;

    /// Opaque continuation state to echo back on the next request.
    fn extract_state(&self, response: &ProviderResponse) -> Option<ReasoningState>;

    /// The answer text with any reasoning removed.
    fn answer_text(&self, response: &ProviderResponse) -> String {
        response.text()
    }
}

/// Everything one response yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Reasoning trace, if present.
    pub thinking: Option<ThinkingContent>,
    /// Continuation state, if present.
    pub state: Option<ReasoningState>,
    /// Answer text.
    pub answer: String,
}

/// Per-format settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Delimiters for the tag-delimited format.
    pub tags: TagDelimiters,
    /// Field locations for the field format.
    pub fields: FieldPointers,
}

/// The reasoning format for a provider family.
///
/// ```
/// use reprise_reasoning::{ReasoningExtractor, ReasoningFormat};
/// use reprise_types::{ProviderFamily, ProviderResponse};
///
/// let extractor = ReasoningExtractor::for_family(ProviderFamily::Tagged);
/// let response = ProviderResponse::new("stop", "<think>2+2=4</think>\nFour.");
/// let out = extractor.extract(&response);
/// assert_eq!(out.thinking.unwrap().text, "2+2=4");
/// assert_eq!(out.answer, "Four.");
/// assert!(out.state.is_none());
/// ```
#[derive(Debug, Clone)]
pub enum ReasoningExtractor {
    /// Signed thinking blocks.
    SignedBlock(SignedBlockFormat),
    /// Reasoning fields.
    Field(FieldFormat),
    /// Thought parts and signatures.
    Signature(SignatureFormat),
    /// Inline delimited spans.
    Tagged(TaggedFormat),
}

impl ReasoningExtractor {
    /// The default extractor for `family`.
    pub fn for_family(family: ProviderFamily) -> Self {
        match family {
            ProviderFamily::Anthropic => Self::SignedBlock(SignedBlockFormat::new()),
            ProviderFamily::OpenAi => Self::Field(FieldFormat::default()),
            ProviderFamily::Gemini => Self::Signature(SignatureFormat::new()),
            ProviderFamily::Tagged => Self::Tagged(TaggedFormat::default()),
        }
    }

    /// The extractor for `family`, configured by `config`.
    pub fn from_config(family: ProviderFamily, config: &ExtractorConfig) -> Result<Self, ConfigError> {
        Ok(match family {
            ProviderFamily::OpenAi => Self::Field(FieldFormat::new(config.fields.clone())),
            ProviderFamily::Tagged => Self::Tagged(TaggedFormat::new(config.tags.clone())?),
            other => Self::for_family(other),
        })
    }

    /// Run both extraction operations and strip the answer.
    pub fn extract(&self, response: &ProviderResponse) -> Extraction {
        Extraction {
            thinking: self.try_parse(response),
            state: self.extract_state(response),
            answer: self.answer_text(response),
        }
    }

    fn format(&self) -> &dyn ReasoningFormat {
        match self {
            Self::SignedBlock(f) => f,
            Self::Field(f) => f,
            Self::Signature(f) => f,
            Self::Tagged(f) => f,
        }
    }
}

impl ReasoningFormat for ReasoningExtractor {
    fn family(&self) -> ProviderFamily {
        self.format().family()
    }

    fn try_parse(&self, response: &ProviderResponse) -> Option<ThinkingContent> {
        self.format().try_parse(response)
    }

    fn extract_state(&self, response: &ProviderResponse) -> Option<ReasoningState> {
        self.format().extract_state(response)
    }

    fn answer_text(&self, response: &ProviderResponse) -> String {
        self.format().answer_text(response)
    }
}
