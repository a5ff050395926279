// SPDX-License-Identifier: PMPL-1.0-or-later
//! Remediation advice from a chat-completions endpoint.
//!
//! [`AdviceClient::get_bulk_advice`] turns a whole scan's issues into at most
//! one outbound request:
//!
//! 1. The batch fingerprint is looked up in the cache; a hit returns
//!    immediately with no wait and no network call.
//! 2. Otherwise the call waits out the minimum interval since the previous
//!    outbound call, sends one prompt, and retries transient failures with
//!    exponential backoff.
//! 3. The `[ISSUE n]` blocks of the reply are parsed into one advice string
//!    per issue, padded with static fallbacks, cached and returned.
//!
//! Failures never reach the caller: every issue gets its category fallback
//! instead, and fallbacks are not cached. One call is in flight per client
//! at a time.

pub mod client;
pub mod prompt;
pub mod retry;

use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::AdvisorConfig;
use crate::error::{Error, Result};
use crate::issue::{Category, Issue};
use client::ChatClient;
use retry::{RetryConfig, RetryPolicy};

/// Design-level context included in every prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceContext {
    pub design_tool: String,
    pub audience: String,
    pub compliance_goal: String,
}

impl Default for AdviceContext {
    fn default() -> Self {
        Self {
            design_tool: "Adobe Express".to_string(),
            audience: "General public".to_string(),
            compliance_goal: "WCAG 2.1 AA minimum".to_string(),
        }
    }
}

/// Static advice used whenever the endpoint cannot supply any
pub fn fallback_advice(category: Category) -> &'static str {
    match category {
        Category::Contrast => {
            "Increase the contrast between text and background colors. Use online contrast checkers to ensure WCAG AA compliance (4.5:1 ratio)."
        }
        Category::FontSize => {
            "Increase font size to at least 12px for body text. Consider using relative units (em, rem) for better scalability."
        }
        Category::AltText => {
            "Add descriptive alternative text that conveys the meaning and context of the image. Keep it concise but informative."
        }
        Category::TextReadability => {
            "Break up long text blocks, avoid all-caps formatting, and ensure adequate line spacing for better readability."
        }
        Category::InteractiveElements => {
            "Ensure interactive elements have clear focus indicators and are large enough for touch interaction (44px minimum)."
        }
        Category::Structural | Category::Error => {
            "Review WCAG 2.1 guidelines for this accessibility issue and implement recommended best practices."
        }
    }
}

/// Fingerprint of an ordered batch
pub fn batch_fingerprint(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::fingerprint)
        .collect::<Vec<_>>()
        .join("||")
}

#[derive(Default)]
struct AdvisorState {
    batches: HashMap<String, Vec<String>>,
    single: HashMap<String, String>,
    last_call: Option<Instant>,
}

/// Cached, rate-limited advice client
pub struct AdviceClient {
    chat: ChatClient,
    retry: RetryPolicy,
    min_call_interval: std::time::Duration,
    state: Mutex<AdvisorState>,
}

impl AdviceClient {
    /// Build a client from configuration; `None` when no API key is set
    pub fn from_config(config: &AdvisorConfig) -> Result<Option<Self>> {
        let Some(chat) = ChatClient::new(config)? else {
            info!("No advice API key configured, AI advice disabled");
            return Ok(None);
        };

        info!(
            "Advice client initialized: endpoint={}, model={}",
            chat.endpoint(),
            config.model
        );

        Ok(Some(Self {
            chat,
            retry: RetryPolicy::with_config(RetryConfig::from(config)),
            min_call_interval: config.min_call_interval(),
            state: Mutex::new(AdvisorState::default()),
        }))
    }

    /// One advice string per issue, in issue order
    pub async fn get_bulk_advice(&self, issues: &[Issue], context: &AdviceContext) -> Vec<String> {
        if issues.is_empty() {
            return Vec::new();
        }

        let key = batch_fingerprint(issues);
        let mut state = self.state.lock().await;
        if let Some(cached) = state.batches.get(&key) {
            debug!("Advice cache hit for {} issues", issues.len());
            return cached.clone();
        }

        let prompt = prompt::batch_prompt(issues, context);
        let advice = self
            .call(&mut state, &prompt)
            .await
            .and_then(|response| prompt::parse_batch_response(&response, issues));

        match advice {
            Ok(advice) => {
                state.batches.insert(key, advice.clone());
                advice
            }
            Err(e) => {
                warn!("Batch advice unavailable, using fallback advice: {}", e);
                issues
                    .iter()
                    .map(|issue| fallback_advice(issue.category).to_string())
                    .collect()
            }
        }
    }

    /// Advice for a single issue
    pub async fn advise(&self, issue: &Issue, context: &AdviceContext) -> String {
        let key = issue.fingerprint();
        let mut state = self.state.lock().await;
        if let Some(cached) = state.single.get(&key) {
            return cached.clone();
        }

        let prompt = prompt::issue_prompt(issue, context);
        match self.call(&mut state, &prompt).await {
            Ok(advice) if !advice.is_empty() => {
                state.single.insert(key, advice.clone());
                advice
            }
            Ok(_) => fallback_advice(issue.category).to_string(),
            Err(e) => {
                warn!("Advice unavailable for '{}', using fallback: {}", issue.title, e);
                fallback_advice(issue.category).to_string()
            }
        }
    }

    /// Drop every cached response
    pub async fn clear_cache(&self) {
        let mut state = self.state.lock().await;
        state.batches.clear();
        state.single.clear();
    }

    /// Number of cached batch and single-issue responses
    pub async fn cached_entries(&self) -> usize {
        let state = self.state.lock().await;
        state.batches.len() + state.single.len()
    }

    /// Rate-limited, retried outbound call. The caller holds the state lock.
    async fn call(&self, state: &mut AdvisorState, prompt: &str) -> Result<String> {
        if let Some(last) = state.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_call_interval {
                let wait = self.min_call_interval - elapsed;
                info!("Rate limiting: waiting {}s before advice call", wait.as_secs_f64().ceil());
                sleep(wait).await;
            }
        }
        state.last_call = Some(Instant::now());

        self.retry
            .execute(|| self.chat.complete(prompt), Error::is_transient)
            .await
    }
}
