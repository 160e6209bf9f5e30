// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell provider: spawns a job's `prompt_body` as a command in the plan's
//! working directory, streaming stdout+stderr interleaved to whoever is
//! fanning the log out (the executor's log bus), and capturing the exit
//! code for the `shell` job type's completed/failed split.

use async_trait::async_trait;
use grove_core::Error;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

/// Result of running a shell command to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellOutput {
    pub exit_code: i32,
}

impl ShellOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Spawns `command` and streams its combined output a chunk at a time.
#[async_trait]
pub trait ShellAdapter: Send + Sync + 'static {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        output: UnboundedSender<Vec<u8>>,
    ) -> Result<ShellOutput, Error>;
}

/// Runs commands through `sh -c`, the way a job's `prompt_body` is a shell
/// script fragment rather than an argv vector.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealShellAdapter;

impl RealShellAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ShellAdapter for RealShellAdapter {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        output: UnboundedSender<Vec<u8>>,
    ) -> Result<ShellOutput, Error> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| Error::io(cwd, e))?;

        #[allow(clippy::expect_used)]
        let mut stdout = child.stdout.take().expect("stdout was requested as piped above");
        #[allow(clippy::expect_used)]
        let mut stderr = child.stderr.take().expect("stderr was requested as piped above");
        let stdout_tx = output.clone();
        let stderr_tx = output;

        let stdout_task = tokio::spawn(async move { pump(&mut stdout, stdout_tx).await });
        let stderr_task = tokio::spawn(async move { pump(&mut stderr, stderr_tx).await });
        let _ = stdout_task.await;
        let _ = stderr_task.await;

        let status = child.wait().await.map_err(|e| Error::io(cwd, e))?;
        Ok(ShellOutput { exit_code: status.code().unwrap_or(-1) })
    }
}

async fn pump(reader: &mut (impl tokio::io::AsyncRead + Unpin), tx: UnboundedSender<Vec<u8>>) {
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{Error, ShellAdapter, ShellOutput};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedSender;

    /// A scripted response for one command.
    #[derive(Debug, Clone)]
    pub struct ScriptedRun {
        pub chunks: Vec<Vec<u8>>,
        pub exit_code: i32,
    }

    #[derive(Debug, Clone)]
    pub struct ShellCall {
        pub command: String,
        pub cwd: PathBuf,
    }

    struct FakeState {
        scripts: HashMap<String, ScriptedRun>,
        default_exit_code: i32,
        calls: Vec<ShellCall>,
    }

    /// Records every command it was asked to run and replays a scripted
    /// response keyed by the exact command string, falling back to an
    /// empty-output/exit-0 run for anything unscripted.
    #[derive(Clone)]
    pub struct FakeShellAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeShellAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    scripts: HashMap::new(),
                    default_exit_code: 0,
                    calls: Vec::new(),
                })),
            }
        }
    }

    impl FakeShellAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(&self, command: impl Into<String>, run: ScriptedRun) {
            self.inner.lock().scripts.insert(command.into(), run);
        }

        pub fn set_default_exit_code(&self, code: i32) {
            self.inner.lock().default_exit_code = code;
        }

        pub fn calls(&self) -> Vec<ShellCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ShellAdapter for FakeShellAdapter {
        async fn run(
            &self,
            command: &str,
            cwd: &Path,
            output: UnboundedSender<Vec<u8>>,
        ) -> Result<ShellOutput, Error> {
            let (chunks, exit_code) = {
                let mut state = self.inner.lock();
                state.calls.push(ShellCall { command: command.to_string(), cwd: cwd.to_path_buf() });
                match state.scripts.get(command) {
                    Some(run) => (run.chunks.clone(), run.exit_code),
                    None => (Vec::new(), state.default_exit_code),
                }
            };
            for chunk in chunks {
                let _ = output.send(chunk);
            }
            Ok(ShellOutput { exit_code })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeShellAdapter, ScriptedRun, ShellCall};

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
