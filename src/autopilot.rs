//! The unattended generation loop.
//!
//! Drives a [`Document`] toward a target word count by calling the
//! generation endpoint on a timer. At most one call is in flight at a
//! time: the tick that dispatches a call awaits it, and timer ticks that
//! fire meanwhile are skipped rather than queued. Network and shape
//! failures are no-op ticks; the retry cadence is simply the next
//! scheduled tick.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::{ChatRequest, Generate};
use crate::document::{count_words, strip_filler, Document};
use crate::error::DraftError;
use crate::prompt::{build_prompt, Genre, Language, PromptInput, WritingMode};

pub const MIN_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_TARGET_WORDS: usize = 2000;
/// Generated text below this word count is discarded as a rejected tick.
pub const DEFAULT_MIN_ACCEPTED_WORDS: usize = 100;
/// How many trailing characters of the document feed the prompt.
pub const DEFAULT_CONTEXT_TAIL_CHARS: usize = 1000;

/// Configuration for one auto-pilot run.
#[derive(Debug, Clone)]
pub struct AutoPilotConfig {
    pub target_words: usize,
    /// Tick interval; clamped to 5-60 s at construction.
    pub interval: Duration,
    pub min_accepted_words: usize,
    pub context_tail_chars: usize,
    pub mode: WritingMode,
    pub genre: Genre,
    pub language: Language,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for AutoPilotConfig {
    fn default() -> Self {
        AutoPilotConfig {
            target_words: DEFAULT_TARGET_WORDS,
            interval: MIN_INTERVAL,
            min_accepted_words: DEFAULT_MIN_ACCEPTED_WORDS,
            context_tail_chars: DEFAULT_CONTEXT_TAIL_CHARS,
            mode: WritingMode::Story,
            genre: Genre::Fantasy,
            language: Language::English,
            model: None,
            max_tokens: Some(1500),
            temperature: Some(0.7),
        }
    }
}

/// Clamp an interval request into the allowed 5-60 s band.
pub fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_INTERVAL, MAX_INTERVAL)
}

/// Create a linked stop handle / stop token pair.
///
/// The handle is owned by the caller; signalling it (or dropping it)
/// synchronously prevents any further ticks. An in-flight request is not
/// aborted, but its result is discarded once the token is stopped.
pub fn stop_channel() -> (StopHandle, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopToken { rx })
}

#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the handle signals stop or is dropped.
    pub async fn stopped(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Handle dropped: treat a closed channel as a stop.
                return;
            }
        }
    }
}

/// Progress notifications emitted during a run, mirroring the per-tick
/// state changes. The appended text is included so a consumer can keep a
/// persistent copy of the document in step with the loop.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Appended { text: String, words: usize, total_words: usize },
    Rejected { words: usize, min: usize },
    Failed { error: String },
    Completed { total_words: usize },
    Stopped { total_words: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Target word count reached.
    Completed,
    /// Stop command received.
    Stopped,
}

/// What happened over a whole run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub ticks: u32,
    pub appended: u32,
    pub rejected: u32,
    pub failures: u32,
    pub initial_words: usize,
    pub final_words: usize,
}

enum TickResult {
    Appended { words: usize },
    DiscardedAfterStop,
}

/// The loop runner. Generic over [`Generate`] so tests can substitute a
/// mock endpoint.
pub struct AutoPilot<G> {
    generator: G,
    config: AutoPilotConfig,
    stop: StopToken,
    /// When set, per-tick progress events are sent here.
    pub progress_tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl<G: Generate> AutoPilot<G> {
    pub fn new(generator: G, mut config: AutoPilotConfig, stop: StopToken) -> Self {
        config.interval = clamp_interval(config.interval);
        AutoPilot {
            generator,
            config,
            stop,
            progress_tx: None,
        }
    }

    pub fn config(&self) -> &AutoPilotConfig {
        &self.config
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(event);
        }
    }

    /// Run until the document reaches the target word count or the stop
    /// handle fires. The document is mutated in place; a summary of the
    /// run is returned.
    pub async fn run(&mut self, document: &mut Document) -> RunSummary {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary = RunSummary {
            outcome: RunOutcome::Stopped,
            ticks: 0,
            appended: 0,
            rejected: 0,
            failures: 0,
            initial_words: document.word_count(),
            final_words: document.word_count(),
        };

        info!(
            target_words = self.config.target_words,
            interval_secs = self.config.interval.as_secs(),
            initial_words = summary.initial_words,
            "auto-pilot started"
        );

        loop {
            let mut stop = self.stop.clone();
            tokio::select! {
                _ = stop.stopped() => {
                    summary.outcome = RunOutcome::Stopped;
                    break;
                }
                _ = ticker.tick() => {}
            }

            let total = document.word_count();
            if total >= self.config.target_words {
                summary.outcome = RunOutcome::Completed;
                self.emit(ProgressEvent::Completed { total_words: total });
                info!(total_words = total, "chapter complete, target reached");
                break;
            }

            summary.ticks += 1;
            debug!(
                tick = summary.ticks,
                current_words = total,
                target_words = self.config.target_words,
                "auto-pilot tick"
            );

            match self.tick(document).await {
                Ok(TickResult::Appended { words }) => {
                    summary.appended += 1;
                    debug!(words, total_words = document.word_count(), "content accepted");
                }
                Ok(TickResult::DiscardedAfterStop) => {
                    summary.outcome = RunOutcome::Stopped;
                    break;
                }
                Err(DraftError::RejectedContent { words, min }) => {
                    summary.rejected += 1;
                    warn!(words, min, "generated text rejected, below minimum length");
                    self.emit(ProgressEvent::Rejected { words, min });
                }
                Err(e) => {
                    summary.failures += 1;
                    warn!(error = %e, "generation failed, will retry next tick");
                    self.emit(ProgressEvent::Failed { error: e.to_string() });
                }
            }
        }

        summary.final_words = document.word_count();
        if summary.outcome == RunOutcome::Stopped {
            self.emit(ProgressEvent::Stopped {
                total_words: summary.final_words,
            });
            info!(total_words = summary.final_words, "auto-pilot stopped");
        }
        summary
    }

    /// One generation cycle: build the prompt from the document tail,
    /// call the endpoint, apply text hygiene, and append if acceptable.
    async fn tick(&self, document: &mut Document) -> Result<TickResult, DraftError> {
        let prompt = {
            let input = PromptInput {
                mode: self.config.mode,
                genre: self.config.genre,
                language: self.config.language,
                tail: document.tail(self.config.context_tail_chars),
                last_sentence: document.last_sentence(),
                current_words: document.word_count(),
                target_words: self.config.target_words,
            };
            build_prompt(&input)
        };

        let request = ChatRequest {
            message: prompt,
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            conversation_id: None,
        };

        let raw = self.generator.generate(request).await?;

        // A stop command issued while the request was in flight wins: the
        // late-arriving result must not touch the document.
        if self.stop.is_stopped() {
            debug!("discarding in-flight result received after stop");
            return Ok(TickResult::DiscardedAfterStop);
        }

        let text = strip_filler(&raw);
        let words = count_words(&text);
        if words < self.config.min_accepted_words {
            return Err(DraftError::RejectedContent {
                words,
                min: self.config.min_accepted_words,
            });
        }

        document.append_generated(&text);
        self.emit(ProgressEvent::Appended {
            text,
            words,
            total_words: document.word_count(),
        });
        Ok(TickResult::Appended { words })
    }
}
