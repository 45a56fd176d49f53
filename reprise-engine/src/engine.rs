//! The turn completion loop.

use crate::config::{ConflictPolicy, EngineConfig};
use crate::merge::append_continuation;
use crate::sink::{TracingMetricsSink, report_turn};
use reprise_classify::TruncationClassifier;
use reprise_reasoning::{Extraction, ReasoningExtractor};
use reprise_repair::ContentRepairer;
use reprise_tokens::{TokenCounter, TokenEstimator};
use reprise_types::{
    BudgetConfig, Complexity, DurationMs, ExhaustionCause, FailureCause, Message, MetricsSink,
    ProviderRequest, ProviderResponse, ReasoningState, RoundThinking, SessionError, SessionGuard,
    SessionStore, ThinkingState, Transport, TransportError, TruncationInfo, TruncationReason,
    TurnError, TurnMetrics, TurnOutcome, TurnOutput, TurnPhase, TurnRequest, TurnResult,
};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Drives one turn through as many physical requests as it takes.
///
/// Generic over `T: Transport` (not object-safe). Session tracking and
/// metrics are optional collaborators set through [`TurnEngine::builder`].
///
/// Each call to [`run`](Self::run) is independent: the engine holds no
/// per-turn state, so one engine can serve many turns concurrently. Turns
/// naming the same session are serialized (or rejected) by the session store.
pub struct TurnEngine<T: Transport> {
    transport: T,
    store: Option<Arc<dyn SessionStore>>,
    sink: Arc<dyn MetricsSink>,
    estimator: TokenEstimator,
    classifier: TruncationClassifier,
    repairer: ContentRepairer,
    config: EngineConfig,
}

/// Why the loop stopped.
enum Stop {
    Completed,
    Exhausted(ExhaustionCause),
    Failed(FailureCause),
}

/// What one await on the transport produced.
enum Sent {
    Response(Result<ProviderResponse, TransportError>),
    Deadline,
    Cancelled,
}

/// Everything accumulated over the rounds of one turn.
struct Ledger {
    phase: TurnPhase,
    answer: String,
    thinking: Vec<RoundThinking>,
    reasoning_state: Option<ReasoningState>,
    last_truncation: Option<TruncationInfo>,
    metrics: TurnMetrics,
}

impl Ledger {
    fn new(seed: Option<ReasoningState>) -> Self {
        Self {
            phase: TurnPhase::Pending,
            answer: String::new(),
            thinking: Vec::new(),
            reasoning_state: seed,
            last_truncation: None,
            metrics: TurnMetrics::default(),
        }
    }

    fn advance(&mut self, next: TurnPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }
}

/// A locked session and its working state.
struct Session {
    store: Arc<dyn SessionStore>,
    state: ThinkingState,
    _guard: SessionGuard,
}

impl Session {
    async fn save(&self) {
        if let Err(error) = self.store.save(&self.state).await {
            tracing::warn!(
                session = %self.state.session_id,
                %error,
                "reprise.session.save_failed"
            );
        }
    }
}

/// Token counts attributed to one round.
struct RoundTokens {
    thinking: u64,
    answer: u64,
}

impl<T: Transport> TurnEngine<T> {
    /// Engine with default settings, no session store and tracing metrics.
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    /// Create a builder. Only the transport is required.
    #[must_use]
    pub fn builder(transport: T) -> TurnEngineBuilder<T> {
        TurnEngineBuilder {
            transport,
            store: None,
            sink: Arc::new(TracingMetricsSink::new()),
            config: EngineConfig::default(),
        }
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a turn to completion.
    pub async fn run(&self, request: TurnRequest) -> Result<TurnResult, TurnError> {
        self.run_with_cancel(request, &CancellationToken::new()).await
    }

    /// Run a turn, stopping early if `cancel` fires.
    ///
    /// Cancellation yields an exhausted result carrying whatever was merged
    /// so far, repaired. Errors are limited to invalid configuration and
    /// session store failures at turn start; everything that happens after
    /// the first request is sent comes back as a [`TurnResult`].
    pub async fn run_with_cancel(
        &self,
        request: TurnRequest,
        cancel: &CancellationToken,
    ) -> Result<TurnResult, TurnError> {
        request.validate()?;
        let family = request.family();
        let extractor = ReasoningExtractor::from_config(family, &self.config.extractor)?;
        let start = Instant::now();

        tracing::info!(
            provider = %request.provider,
            family = ?family,
            messages = request.messages.len(),
            max_continuations = request.budget.max_continuations,
            "reprise.turn.start"
        );

        let mut session = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let stop = Stop::Exhausted(ExhaustionCause::Cancelled);
                return Ok(self.finish(&request, Ledger::new(None), stop, start));
            }
            session = self.open_session(&request) => session?,
        };
        let seed = session.as_ref().and_then(|s| s.state.reasoning_state.clone());
        let mut ledger = Ledger::new(seed);
        let budget = &request.budget;
        let max_duration = budget.max_duration.to_std();

        ledger.advance(TurnPhase::AwaitingResponse);
        let stop = loop {
            let continuation = ledger.metrics.continuation_count;
            let provider_request = self.build_request(&request, &ledger, continuation);
            let remaining = max_duration.saturating_sub(start.elapsed());
            ledger.metrics.physical_requests += 1;
            tracing::debug!(
                round = ledger.metrics.physical_requests,
                continuation,
                carries_state = provider_request.reasoning_state.is_some(),
                "reprise.turn.round"
            );

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => Sent::Cancelled,
                _ = tokio::time::sleep(remaining) => Sent::Deadline,
                result = self.transport.send(provider_request) => Sent::Response(result),
            };
            let response = match sent {
                Sent::Response(Ok(response)) => response,
                Sent::Response(Err(error)) => {
                    tracing::warn!(
                        %error,
                        retryable = error.is_retryable(),
                        "reprise.turn.transport_error"
                    );
                    break Stop::Failed(FailureCause::Transport(error.to_string()));
                }
                Sent::Deadline => break Stop::Exhausted(ExhaustionCause::Deadline),
                Sent::Cancelled => break Stop::Exhausted(ExhaustionCause::Cancelled),
            };

            ledger.advance(TurnPhase::Classifying);
            let extraction = extractor.extract(&response);
            let tokens = self.round_tokens(&response, &extraction);
            self.commit_round(&mut ledger, extraction, &tokens, start, budget);
            // Structural heuristics look at the merged answer: a fence opened
            // two rounds ago may close in this one.
            let info = self.classifier.classify_answer(&response, &ledger.answer);
            ledger.last_truncation = Some(info.clone());

            if let Some(session) = session.as_mut() {
                session.state.record_round(
                    ledger.reasoning_state.as_ref(),
                    tokens.thinking,
                    tokens.thinking + tokens.answer,
                    continuation > 0,
                );
                session.save().await;
            }

            tracing::debug!(
                thinking_tokens = tokens.thinking,
                answer_tokens = tokens.answer,
                truncated = info.is_truncated,
                reason = %info.reason,
                "reprise.turn.classified"
            );

            if !info.is_truncated {
                break Stop::Completed;
            }
            if info.is_terminal() {
                break Stop::Failed(FailureCause::Truncation(info.reason));
            }
            if continuation >= budget.max_continuations {
                break Stop::Exhausted(ExhaustionCause::MaxContinuations);
            }
            if start.elapsed() >= max_duration {
                break Stop::Exhausted(ExhaustionCause::Deadline);
            }
            let produced = self.config.progress.progress(tokens.thinking, tokens.answer);
            if produced < u64::from(budget.min_progress_tokens) {
                break Stop::Exhausted(ExhaustionCause::Stalled {
                    produced,
                    required: budget.min_progress_tokens,
                });
            }

            ledger.advance(TurnPhase::Continuing);
            ledger.metrics.continuation_count += 1;
            tracing::info!(
                continuation = ledger.metrics.continuation_count,
                reason = %info.reason,
                "reprise.turn.continue"
            );
            ledger.advance(TurnPhase::AwaitingResponse);
        };

        Ok(self.finish(&request, ledger, stop, start))
    }

    async fn open_session(&self, request: &TurnRequest) -> Result<Option<Session>, TurnError> {
        let (Some(store), Some(id)) = (self.store.as_ref(), request.session.as_ref()) else {
            return Ok(None);
        };
        let guard = match self.config.conflict_policy {
            ConflictPolicy::Wait => store.lock(id).await?,
            ConflictPolicy::Reject => match store.try_lock(id).await {
                Ok(guard) => guard,
                Err(error) => {
                    if matches!(error, SessionError::Busy(_)) {
                        tracing::warn!(session = %id, "reprise.session.conflict");
                    }
                    return Err(error.into());
                }
            },
        };
        let model = request.model_id();
        let state = match store.load(id).await? {
            Some(mut state) => {
                if state.model_id != model {
                    state.model_id = model.to_string();
                    state.reasoning_state = None;
                }
                state
            }
            None => ThinkingState::new(id.clone(), model),
        };
        Ok(Some(Session {
            store: Arc::clone(store),
            state,
            _guard: guard,
        }))
    }

    fn build_request(
        &self,
        request: &TurnRequest,
        ledger: &Ledger,
        continuation: u32,
    ) -> ProviderRequest {
        let mut messages = request.messages.clone();
        if continuation > 0 {
            messages.push(Message::assistant(ledger.answer.clone()));
            let reason = ledger
                .last_truncation
                .as_ref()
                .map_or(TruncationReason::TokenLimit, |info| info.reason);
            let prompt = self.config.prompts.for_reason(reason);
            messages.push(Message::user(prompt));
        }
        ProviderRequest {
            model: request.model.clone(),
            messages,
            max_output_tokens: request.budget.answer_budget,
            thinking_budget: request.budget.thinking_budget,
            reasoning_state: ledger.reasoning_state.clone(),
            continuation,
            extra: request.extra.clone(),
        }
    }

    /// Exact usage where the provider reported it, estimates otherwise.
    fn round_tokens(&self, response: &ProviderResponse, extraction: &Extraction) -> RoundTokens {
        let usage = response.usage.as_ref();
        let thinking = usage
            .and_then(|u| u.reasoning_tokens)
            .or_else(|| {
                extraction
                    .thinking
                    .as_ref()
                    .map(|t| t.token_count)
                    .filter(|&n| n > 0)
            })
            .unwrap_or_else(|| {
                extraction
                    .thinking
                    .as_ref()
                    .map_or(0, |t| self.estimator.count_text(&t.text))
            });
        let answer = match usage {
            Some(u) if u.output_tokens > 0 => u.output_tokens.saturating_sub(thinking),
            _ => self.estimator.count_text(&extraction.answer),
        };
        RoundTokens { thinking, answer }
    }

    fn commit_round(
        &self,
        ledger: &mut Ledger,
        extraction: Extraction,
        tokens: &RoundTokens,
        start: Instant,
        budget: &BudgetConfig,
    ) {
        append_continuation(&mut ledger.answer, &extraction.answer, self.config.overlap);
        if let Some(mut content) = extraction.thinking {
            content.token_count = tokens.thinking;
            ledger.thinking.push(RoundThinking {
                round: ledger.metrics.physical_requests - 1,
                content,
            });
        }
        if let Some(state) = extraction.state {
            ledger.reasoning_state = Some(state);
        }

        let metrics = &mut ledger.metrics;
        metrics.thinking_tokens = metrics.thinking_tokens.saturating_add(tokens.thinking);
        metrics.answer_tokens = metrics.answer_tokens.saturating_add(tokens.answer);
        metrics.duration = DurationMs::from(start.elapsed());
        metrics.detected_complexity = Complexity::detect(
            metrics.thinking_tokens,
            budget.thinking_budget,
            metrics.continuation_count,
        );
    }

    fn finish(
        &self,
        request: &TurnRequest,
        mut ledger: Ledger,
        stop: Stop,
        start: Instant,
    ) -> TurnResult {
        let reason = ledger.last_truncation.as_ref().map(|info| info.reason);
        let (phase, outcome) = match stop {
            Stop::Completed => (TurnPhase::Completed, TurnOutcome::Success),
            Stop::Exhausted(cause) => {
                (TurnPhase::Exhausted, TurnOutcome::Truncated { cause, reason })
            }
            Stop::Failed(cause) => (TurnPhase::Failed, TurnOutcome::Failed { cause }),
        };
        if ledger.phase != TurnPhase::Pending {
            ledger.advance(phase);
        }

        let mut repaired = false;
        if phase != TurnPhase::Completed {
            let repair = self.repairer.repair(&ledger.answer);
            repaired = repair.was_modified;
            ledger.answer = repair.repaired_text;
        }

        let metrics = &mut ledger.metrics;
        metrics.duration = DurationMs::from(start.elapsed());
        metrics.detected_complexity = Complexity::detect(
            metrics.thinking_tokens,
            request.budget.thinking_budget,
            metrics.continuation_count,
        );

        let result = TurnResult {
            outcome,
            output: TurnOutput {
                answer: ledger.answer,
                thinking: ledger.thinking,
                reasoning_state: ledger.reasoning_state,
                last_truncation: ledger.last_truncation,
                repaired,
            },
            metrics: ledger.metrics,
        };

        tracing::info!(
            outcome = ?result.outcome,
            requests = result.metrics.physical_requests,
            continuations = result.metrics.continuation_count,
            thinking_tokens = result.metrics.thinking_tokens,
            duration_ms = result.metrics.duration.as_millis(),
            repaired,
            "reprise.turn.finish"
        );
        report_turn(self.sink.as_ref(), &result.report());
        result
    }
}

/// Builder for [`TurnEngine`].
///
/// # Example
///
/// ```
/// use reprise_engine::{EngineConfig, NoopMetricsSink, TurnEngine};
/// use reprise_types::{ProviderRequest, ProviderResponse, Transport, TransportError};
/// use std::sync::Arc;
///
/// struct Echo;
///
/// impl Transport for Echo {
///     async fn send(&self, _request: ProviderRequest) -> Result<ProviderResponse, TransportError> {
///         Ok(ProviderResponse::new("stop", "Hello."))
///     }
/// }
///
/// let engine = TurnEngine::builder(Echo)
///     .metrics_sink(Arc::new(NoopMetricsSink))
///     .config(EngineConfig::default())
///     .build();
/// assert!(engine.config().prompts.token_limit.contains("Continue"));
/// ```
pub struct TurnEngineBuilder<T: Transport> {
    transport: T,
    store: Option<Arc<dyn SessionStore>>,
    sink: Arc<dyn MetricsSink>,
    config: EngineConfig,
}

impl<T: Transport> TurnEngineBuilder<T> {
    /// Track reasoning state per session in `store`.
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Send per-turn reports to `sink`.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set the full engine configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the session conflict policy (convenience for `config.conflict_policy`).
    #[must_use]
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.config.conflict_policy = policy;
        self
    }

    /// Build the [`TurnEngine`].
    #[must_use]
    pub fn build(self) -> TurnEngine<T> {
        TurnEngine {
            transport: self.transport,
            store: self.store,
            sink: self.sink,
            estimator: TokenEstimator::with_ratios(self.config.ratios),
            classifier: TruncationClassifier::new(),
            repairer: ContentRepairer::new(),
            config: self.config,
        }
    }
}
