// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Provider seams the executor dispatches through: shell process spawning,
//! LLM one-shot completion, and the lock-file liveness protocol. Each is a
//! small async trait plus a real and a fake implementation, paired the
//! way a production adapter and its test double usually are.
//!
//! Every fallible operation here returns `grove_core::Error` directly
//! rather than a crate-local error type, so the taxonomy stays closed at
//! a fixed set of names (`JobAlreadyRunning`, `ProviderError`, `Io`, ...).

pub mod lock;
pub mod provider;
pub mod shell;

pub use lock::{is_pid_alive, LockGuard};
pub use provider::{ProviderAdapter, RealProviderAdapter};
pub use shell::{RealShellAdapter, ShellAdapter, ShellOutput};

#[cfg(any(test, feature = "test-support"))]
pub use provider::{FakeProviderAdapter, ProviderCall};
#[cfg(any(test, feature = "test-support"))]
pub use shell::{FakeShellAdapter, ScriptedRun, ShellCall};
