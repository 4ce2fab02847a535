use crate::core::{Command, CommandSink};
use crate::utils::error::{BridgeError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// 示範序列
pub const DEMO_SEQUENCE: [&str; 7] = ["HAPPY", "SURPRISED", "WINK", "ANGRY", "SLEEPY", "SAD", "HAPPY"];

/// Extra wait between the last command and the completion message.
pub const COMPLETION_GRACE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    /// Offset from the end of the warm-up.
    pub offset: Duration,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionScript {
    pub warmup: Duration,
    pub steps: Vec<ScriptStep>,
    /// Offset from the end of the warm-up at which the run is reported done.
    pub completion: Duration,
}

impl EmotionScript {
    /// 2 秒暖機後每 3 秒一個表情，最後一個之後 2 秒結束
    pub fn demo() -> Self {
        Self::evenly_spaced(
            Duration::from_millis(2000),
            Duration::from_millis(3000),
            DEMO_SEQUENCE.iter().map(Command::new),
            None,
        )
    }

    /// Places command `i` at `i * interval`. The completion offset never
    /// precedes the last command.
    pub fn evenly_spaced<I>(
        warmup: Duration,
        interval: Duration,
        commands: I,
        completion: Option<Duration>,
    ) -> Self
    where
        I: IntoIterator<Item = Command>,
    {
        let steps: Vec<ScriptStep> = commands
            .into_iter()
            .enumerate()
            .map(|(i, command)| ScriptStep {
                offset: interval * i as u32,
                command,
            })
            .collect();

        let last = steps.last().map(|s| s.offset).unwrap_or_default();
        let completion = completion
            .unwrap_or(last + COMPLETION_GRACE)
            .max(last);

        Self {
            warmup,
            steps,
            completion,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.warmup + self.completion
    }
}

impl Default for EmotionScript {
    fn default() -> Self {
        Self::demo()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub sent: usize,
    pub failed: usize,
    pub outcome: ScriptOutcome,
}

/// Plays an [`EmotionScript`] against a sink on wall-clock offsets.
///
/// A step fires at its offset whether or not the previous send succeeded.
pub struct ScriptRunner {
    sink: Arc<dyn CommandSink>,
    script: EmotionScript,
}

impl ScriptRunner {
    pub fn new(sink: Arc<dyn CommandSink>, script: EmotionScript) -> Self {
        Self { sink, script }
    }

    pub fn spawn(self) -> ScriptHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.run(token).await });
        ScriptHandle { cancel, task }
    }

    pub async fn run(&self, cancel: CancellationToken) -> ScriptReport {
        let mut report = ScriptReport {
            sent: 0,
            failed: 0,
            outcome: ScriptOutcome::Cancelled,
        };

        tracing::info!(
            "⏳ Waiting {}ms for {} to initialize...",
            self.script.warmup.as_millis(),
            self.sink.device()
        );
        // 所有時間點都以同一個起點計算，避免逐步累積誤差
        let begin = Instant::now() + self.script.warmup;
        if !wait_until(begin, &cancel).await {
            return report;
        }

        tracing::info!("Starting emotion demo...");
        for step in &self.script.steps {
            if !wait_until(begin + step.offset, &cancel).await {
                tracing::info!("🛑 Demo cancelled after {} commands", report.sent + report.failed);
                return report;
            }

            match self.sink.send(&step.command).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    tracing::debug!("Step {} failed, continuing: {}", step.command, e);
                    report.failed += 1;
                }
            }
        }

        if !wait_until(begin + self.script.completion, &cancel).await {
            return report;
        }

        tracing::info!("✨ Demo complete! Press Ctrl+C to exit.");
        report.outcome = ScriptOutcome::Completed;
        report
    }
}

async fn wait_until(deadline: Instant, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = sleep_until(deadline) => true,
    }
}

pub struct ScriptHandle {
    cancel: CancellationToken,
    task: JoinHandle<ScriptReport>,
}

impl ScriptHandle {
    /// Stops the run before its next step. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn join(self) -> Result<ScriptReport> {
        self.task.await.map_err(|e| BridgeError::TaskError {
            message: e.to_string(),
        })
    }
}
