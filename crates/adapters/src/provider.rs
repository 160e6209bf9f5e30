// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM one-shot completion, dispatched through an external command so the
//! engine never links against a specific provider SDK. The real adapter
//! resolves, in order:
//!
//! 1. `GROVE_MOCK_LLM_RESPONSE_FILE` — read the response verbatim from a
//!    file, skipping the external command entirely. This is how CLI-level
//!    scenario tests exercise `oneshot` jobs without a live provider.
//! 2. `GROVE_PROVIDER_COMMAND` (default `llm`) — spawned with the prompt
//!    piped on stdin, its stdout trimmed and used as the response.

use async_trait::async_trait;
use grove_core::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One-shot prompt completion for `oneshot` jobs.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    async fn complete(&self, job: &str, prompt: &str) -> Result<String, Error>;
}

#[derive(Clone, Debug, Default)]
pub struct RealProviderAdapter;

impl RealProviderAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProviderAdapter for RealProviderAdapter {
    async fn complete(&self, job: &str, prompt: &str) -> Result<String, Error> {
        if let Ok(path) = std::env::var("GROVE_MOCK_LLM_RESPONSE_FILE") {
            return std::fs::read_to_string(&path)
                .map_err(|e| Error::ProviderError { job: job.to_string(), detail: e.to_string() });
        }

        let program = std::env::var("GROVE_PROVIDER_COMMAND").unwrap_or_else(|_| "llm".to_string());
        let mut child = Command::new(&program)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| Error::ProviderError { job: job.to_string(), detail: e.to_string() })?;

        #[allow(clippy::expect_used)]
        let mut stdin = child.stdin.take().expect("stdin was requested as piped above");
        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(|e| Error::ProviderError { job: job.to_string(), detail: e.to_string() })?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::ProviderError { job: job.to_string(), detail: e.to_string() })?;

        if !output.status.success() {
            return Err(Error::ProviderError {
                job: job.to_string(),
                detail: format!(
                    "{program} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{Error, ProviderAdapter};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct ProviderCall {
        pub job: String,
        pub prompt: String,
    }

    struct FakeState {
        responses: HashMap<String, String>,
        default_response: String,
        calls: Vec<ProviderCall>,
        fail_for: Option<String>,
    }

    /// Scripted by job name, falling back to a default response. Used by
    /// `grove-engine`'s executor tests so `oneshot`/plan-generation jobs
    /// don't need a live provider command.
    #[derive(Clone)]
    pub struct FakeProviderAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeProviderAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    responses: HashMap::new(),
                    default_response: "mock response".to_string(),
                    calls: Vec::new(),
                    fail_for: None,
                })),
            }
        }
    }

    impl FakeProviderAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(&self, job: impl Into<String>, response: impl Into<String>) {
            self.inner.lock().responses.insert(job.into(), response.into());
        }

        pub fn fail_for(&self, job: impl Into<String>) {
            self.inner.lock().fail_for = Some(job.into());
        }

        pub fn calls(&self) -> Vec<ProviderCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ProviderAdapter for FakeProviderAdapter {
        async fn complete(&self, job: &str, prompt: &str) -> Result<String, Error> {
            let mut state = self.inner.lock();
            state.calls.push(ProviderCall { job: job.to_string(), prompt: prompt.to_string() });
            if state.fail_for.as_deref() == Some(job) {
                return Err(Error::ProviderError { job: job.to_string(), detail: "scripted failure".to_string() });
            }
            Ok(state.responses.get(job).cloned().unwrap_or_else(|| state.default_response.clone()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProviderAdapter, ProviderCall};

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
