use crate::domain::model::{Command, SendReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Anything a dispatch entry point can hand a command to.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Writes one frame. Failures come back as `Err`, never as a panic.
    async fn send(&self, command: &Command) -> Result<SendReceipt>;

    fn device(&self) -> &str;

    fn is_connected(&self) -> bool;
}

pub trait ConfigProvider: Send + Sync {
    fn device_path(&self) -> &str;
    fn baud_rate(&self) -> u32;
    fn max_line_length(&self) -> usize;
}
