//! Brief synthesis: generative path first, template on any failure

use crate::anomaly::{detect_anomalies, Anomaly, DEFAULT_DROP_THRESHOLD};
use crate::error::SynthError;
use crate::generator::{GenerationRequest, TextGenerator};
use crate::prompt::{system_instruction, user_prompt};
use crate::report::{missing_sections, render_fallback, trim_to_words, BriefInput};
use gigpulse_snapshot::Platform;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Synthesis tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub word_budget: usize,
    pub max_tokens: u32,
    /// Relative drop flagged as an anomaly
    pub drop_threshold: f64,
    pub top_matches: usize,
    pub timeout_secs: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            word_budget: 300,
            max_tokens: 1024,
            drop_threshold: DEFAULT_DROP_THRESHOLD,
            top_matches: 3,
            timeout_secs: 30,
        }
    }
}

impl SynthConfig {
    #[inline]
    #[must_use]
    pub fn with_word_budget(mut self, words: usize) -> Self {
        self.word_budget = words;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }
}

/// Which path produced the brief
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BriefSource {
    Generated,
    /// Template, with the primary-path error that caused it
    Fallback(SynthError),
}

/// A finished brief
#[derive(Debug, Clone, PartialEq)]
pub struct Brief {
    pub text: String,
    pub source: BriefSource,
    pub anomalies: Vec<Anomaly>,
}

impl Brief {
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, BriefSource::Fallback(_))
    }
}

/// Builds the daily brief
#[derive(Clone, Default)]
pub struct Synthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
    config: SynthConfig,
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("generator", &self.generator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Synthesizer {
    /// Template-only synthesizer
    #[must_use]
    pub fn fallback_only(config: SynthConfig) -> Self {
        Self {
            generator: None,
            config,
        }
    }

    /// Synthesizer with a generative primary path
    #[must_use]
    pub fn with_generator(generator: Arc<dyn TextGenerator>, config: SynthConfig) -> Self {
        Self {
            generator: Some(generator),
            config,
        }
    }

    /// Anomalies across both platforms
    #[must_use]
    pub fn anomalies(&self, input: &BriefInput) -> Vec<Anomaly> {
        Platform::ALL
            .into_iter()
            .filter_map(|p| Some((input.today.get(p)?, input.yesterday.get(p)?)))
            .flat_map(|(today, yesterday)| {
                detect_anomalies(today, yesterday, self.config.drop_threshold)
            })
            .collect()
    }

    /// Produce the brief; never fails
    pub async fn synthesize(&self, input: &BriefInput) -> Brief {
        let anomalies = self.anomalies(input);
        if !anomalies.is_empty() {
            tracing::info!(count = anomalies.len(), "Day-over-day drops detected");
        }

        let source = match self.generate(input, &anomalies).await {
            Ok(text) => {
                tracing::info!(words = text.split_whitespace().count(), "Brief generated");
                return Brief {
                    text,
                    source: BriefSource::Generated,
                    anomalies,
                };
            }
            Err(SynthError::NotConfigured) => {
                tracing::info!("No generative service configured, using template");
                BriefSource::Fallback(SynthError::NotConfigured)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Generation failed, using template");
                BriefSource::Fallback(err)
            }
        };

        let text = trim_to_words(
            &render_fallback(input, self.config.top_matches),
            self.config.word_budget,
        );
        Brief {
            text,
            source,
            anomalies,
        }
    }

    async fn generate(&self, input: &BriefInput, anomalies: &[Anomaly]) -> Result<String, SynthError> {
        let generator = self.generator.as_ref().ok_or(SynthError::NotConfigured)?;
        let request = GenerationRequest {
            system: system_instruction(input, self.config.word_budget, self.config.drop_threshold),
            prompt: user_prompt(input, anomalies, self.config.top_matches),
            max_tokens: self.config.max_tokens,
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let raw = tokio::time::timeout(timeout, generator.generate(&request))
            .await
            .map_err(|_| SynthError::Timeout)??;

        let text = raw.trim();
        if text.is_empty() {
            return Err(SynthError::EmptyOutput);
        }
        let missing = missing_sections(text);
        if !missing.is_empty() {
            return Err(SynthError::MissingSections(missing));
        }
        Ok(trim_to_words(text, self.config.word_budget))
    }
}
