//! Extraction Client: retry, fallback and circuit breaking across providers

use crate::breaker::{Admission, CircuitBreaker, CircuitState};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_extraction, parse_narrative};
use crate::prompt::{ExtractionPromptBuilder, NarrativePromptBuilder};
use crate::retry::BackoffPolicy;
use crate::stats::{ClientStats, ProviderStats};
use crate::types::{Narrative, NarrativeRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use worklog_domain::{Cancellation, ExtractionResult, ProcessedContent};
use worklog_llm::{LlmError, LlmProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
    Structured,
    Plain,
}

/// Everything owned per provider for the lifetime of one client
struct ProviderSlot {
    provider: Arc<dyn LlmProvider>,
    breaker: CircuitBreaker,
    permits: Semaphore,
    stats: Mutex<ProviderStats>,
}

impl ProviderSlot {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn stats(&self) -> MutexGuard<'_, ProviderStats> {
        match self.stats.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Successful call through the fallback chain
struct Success<T> {
    value: T,
    provider: String,
    raw: String,
}

/// Sends prompts through an ordered list of providers
///
/// The first provider is the primary; the rest are fallbacks in order. One
/// client holds the breaker state for one run; build a new client per run.
pub struct ExtractionClient {
    slots: Vec<ProviderSlot>,
    config: ExtractorConfig,
    backoff: BackoffPolicy,
    fallback_events: AtomicU64,
    extractions_succeeded: AtomicU64,
    extractions_failed: AtomicU64,
    narratives_succeeded: AtomicU64,
    narratives_failed: AtomicU64,
}

impl ExtractionClient {
    /// Create a client over `providers` (primary first)
    ///
    /// Fails with [`ExtractorError::NoProviders`] when the list is empty.
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        if providers.is_empty() {
            return Err(ExtractorError::NoProviders);
        }

        let slots = providers
            .into_iter()
            .map(|provider| {
                let name = provider.name().to_string();
                ProviderSlot {
                    breaker: CircuitBreaker::new(&name, config.failure_threshold, config.cooldown()),
                    permits: Semaphore::new(config.max_concurrent_per_provider),
                    stats: Mutex::new(ProviderStats::new(name)),
                    provider,
                }
            })
            .collect();

        Ok(Self {
            slots,
            backoff: config.backoff(),
            config,
            fallback_events: AtomicU64::new(0),
            extractions_succeeded: AtomicU64::new(0),
            extractions_failed: AtomicU64::new(0),
            narratives_succeeded: AtomicU64::new(0),
            narratives_failed: AtomicU64::new(0),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Provider names in fallback order
    pub fn provider_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name().to_string()).collect()
    }

    /// Breaker state of a provider
    pub fn circuit_state(&self, provider: &str) -> Option<CircuitState> {
        self.slots
            .iter()
            .find(|s| s.name() == provider)
            .map(|s| s.breaker.state())
    }

    /// Extract entities from one processed worklog
    ///
    /// Structurally invalid responses are retried like transient failures.
    /// When every provider is exhausted the error names the last provider
    /// tried.
    pub async fn extract(
        &self,
        content: &ProcessedContent,
        cancel: &Cancellation,
    ) -> Result<ExtractionResult, ExtractorError> {
        let started = Instant::now();
        let prompt = ExtractionPromptBuilder::new(content.date, &content.text).build();
        debug!(date = %content.date, prompt_len = prompt.len(), "Extracting entities");

        let label = content.date.to_string();
        let outcome = self
            .run(&label, &prompt, CallMode::Structured, cancel, |raw| {
                parse_extraction(raw).map_err(|e| LlmError::InvalidResponse(e.to_string()))
            })
            .await;

        match outcome {
            Ok(success) => {
                self.extractions_succeeded.fetch_add(1, Ordering::Relaxed);
                let parsed = success.value;
                debug!(
                    date = %content.date,
                    provider = %success.provider,
                    entities = parsed.entities.total(),
                    "Extraction succeeded"
                );
                Ok(ExtractionResult {
                    path: content.path.clone(),
                    date: content.date,
                    entities: parsed.entities,
                    latency: started.elapsed(),
                    confidence: parsed.confidence,
                    raw_response: self.config.keep_raw_response.then_some(success.raw),
                    provider: success.provider,
                })
            }
            Err(ExtractorError::Cancelled) => Err(ExtractorError::Cancelled),
            Err(e) => {
                self.extractions_failed.fetch_add(1, Ordering::Relaxed);
                warn!(date = %content.date, error = %e, "Extraction failed");
                Err(e)
            }
        }
    }

    /// Generate narrative prose for a period
    pub async fn generate_narrative(
        &self,
        request: &NarrativeRequest,
        cancel: &Cancellation,
    ) -> Result<Narrative, ExtractorError> {
        let started = Instant::now();
        let prompt = NarrativePromptBuilder::new(request).build();
        let label = request.period.key();

        let outcome = self
            .run(&label, &prompt, CallMode::Plain, cancel, |raw| {
                parse_narrative(raw).map_err(|e| LlmError::InvalidResponse(e.to_string()))
            })
            .await;

        match outcome {
            Ok(success) => {
                self.narratives_succeeded.fetch_add(1, Ordering::Relaxed);
                Ok(Narrative {
                    text: success.value,
                    provider: success.provider,
                    latency: started.elapsed(),
                })
            }
            Err(ExtractorError::Cancelled) => Err(ExtractorError::Cancelled),
            Err(e) => {
                self.narratives_failed.fetch_add(1, Ordering::Relaxed);
                warn!(period = %label, error = %e, "Narrative generation failed");
                Err(e)
            }
        }
    }

    /// Snapshot of all counters
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            providers: self
                .slots
                .iter()
                .map(|slot| {
                    let mut stats = slot.stats().clone();
                    stats.circuit = slot.breaker.state();
                    stats
                })
                .collect(),
            fallback_events: self.fallback_events.load(Ordering::Relaxed),
            extractions_succeeded: self.extractions_succeeded.load(Ordering::Relaxed),
            extractions_failed: self.extractions_failed.load(Ordering::Relaxed),
            narratives_succeeded: self.narratives_succeeded.load(Ordering::Relaxed),
            narratives_failed: self.narratives_failed.load(Ordering::Relaxed),
        }
    }

    /// Walk the providers in order until one yields a parsable response
    async fn run<T, P>(
        &self,
        label: &str,
        prompt: &str,
        mode: CallMode,
        cancel: &Cancellation,
        parse: P,
    ) -> Result<Success<T>, ExtractorError>
    where
        P: Fn(&str) -> Result<T, LlmError>,
    {
        if cancel.is_cancelled() {
            return Err(ExtractorError::Cancelled);
        }

        let mut last_failure: Option<(String, String)> = None;

        for (idx, slot) in self.slots.iter().enumerate() {
            if idx > 0 {
                self.fallback_events.fetch_add(1, Ordering::Relaxed);
                info!(request = %label, to = %slot.name(), "Falling back to next provider");
            }

            let mut attempt = 0u32;
            loop {
                attempt += 1;

                let admission = slot.breaker.admit();
                if admission == Admission::Rejected {
                    slot.stats().skipped_open += 1;
                    debug!(request = %label, provider = %slot.name(), "Circuit open, skipping provider");
                    if attempt == 1 {
                        last_failure = Some((slot.name().to_string(), "circuit open".to_string()));
                    }
                    break;
                }

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(LlmError::Cancelled),
                    result = self.call_once(slot, prompt, mode) => result,
                };
                let outcome = outcome.and_then(|raw| parse(&raw).map(|value| (value, raw)));

                match outcome {
                    Ok((value, raw)) => {
                        slot.breaker.record_success();
                        slot.stats().successes += 1;
                        return Ok(Success {
                            value,
                            provider: slot.name().to_string(),
                            raw,
                        });
                    }
                    Err(LlmError::Cancelled) => {
                        if admission == Admission::Probe {
                            slot.breaker.abandon_probe();
                        }
                        return Err(ExtractorError::Cancelled);
                    }
                    Err(error) => {
                        slot.breaker.record_failure();
                        slot.stats().failures += 1;
                        let transient = error.is_transient();
                        warn!(
                            request = %label,
                            provider = %slot.name(),
                            attempt,
                            transient,
                            error = %error,
                            "Provider call failed"
                        );
                        last_failure = Some((slot.name().to_string(), error.to_string()));

                        if !transient || !self.backoff.should_retry(attempt) {
                            break;
                        }

                        slot.stats().retries += 1;
                        let delay = self.backoff.delay_after(attempt);
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return Err(ExtractorError::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }

        let (provider, reason) = last_failure
            .unwrap_or_else(|| (String::from("none"), String::from("no provider attempted")));
        Err(ExtractorError::AllProvidersFailed { provider, reason })
    }

    /// One request to one provider under its concurrency cap and the call timeout
    async fn call_once(&self, slot: &ProviderSlot, prompt: &str, mode: CallMode) -> Result<String, LlmError> {
        let _permit = slot
            .permits
            .acquire()
            .await
            .map_err(|e| LlmError::Other(format!("concurrency limiter closed: {}", e)))?;

        slot.stats().calls += 1;
        let timeout = self.config.call_timeout();
        let started = Instant::now();

        let call = match mode {
            CallMode::Structured => slot.provider.generate_structured(prompt),
            CallMode::Plain => slot.provider.generate(prompt),
        };
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(timeout)),
        };

        slot.stats().total_latency += started.elapsed();
        result
    }
}

impl std::fmt::Debug for ExtractionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionClient")
            .field("providers", &self.provider_names())
            .field("config", &self.config)
            .finish()
    }
}
