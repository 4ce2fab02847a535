use crate::adapters::serial;
use crate::core::line_reader::LineReader;
use crate::domain::model::{Command, SendReceipt};
use crate::domain::ports::{CommandSink, ConfigProvider};
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, ReadHalf};
use tokio::sync::Mutex;
use tokio_serial::SerialStream;

/// Error text reported for every send on a channel that never opened.
pub const PORT_NOT_OPEN: &str = "Port is not open";

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub type SerialLineReader = LineReader<ReadHalf<SerialStream>>;

/// The one serial connection of the process.
///
/// The writer is locked only for a single `write_all` + `flush`, which keeps
/// every frame contiguous on the wire. There is no queue behind it: callers
/// that race each other are written in the order they take the lock.
pub struct CommandChannel {
    device: String,
    writer: Option<Mutex<BoxedWriter>>,
}

impl CommandChannel {
    pub fn from_writer<W>(device: impl Into<String>, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            device: device.into(),
            writer: Some(Mutex::new(Box::new(writer))),
        }
    }

    /// 連線失敗後使用：每次送出都回報 `PORT_NOT_OPEN`
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            writer: None,
        }
    }

    /// Opens the device and splits it into a write channel and a line reader.
    pub fn open(path: &str, baud_rate: u32, max_line_length: usize) -> Result<(Self, SerialLineReader)> {
        let stream = serial::open_serial(path, baud_rate)?;
        let (read_half, write_half) = tokio::io::split(stream);

        Ok((
            Self::from_writer(path, write_half),
            LineReader::with_max_length(read_half, max_line_length),
        ))
    }

    /// Opens the configured device once. A failure is logged and leaves the
    /// process with a disconnected channel; nothing is retried.
    pub fn connect(config: &dyn ConfigProvider) -> (Self, Option<SerialLineReader>) {
        let path = config.device_path();

        match Self::open(path, config.baud_rate(), config.max_line_length()) {
            Ok((channel, reader)) => {
                tracing::info!("✅ Connected to robot on {} ({} baud)", path, config.baud_rate());
                (channel, Some(reader))
            }
            Err(e) => {
                tracing::error!("❌ {}", e);
                tracing::error!("💡 {}", e.recovery_suggestion());
                (Self::disconnected(path), None)
            }
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Writes `<COMMAND>\n` and waits for the local transport to accept it.
    pub async fn send(&self, command: &Command) -> Result<SendReceipt> {
        let outcome = match &self.writer {
            Some(writer) => {
                let frame = command.wire_bytes();
                let mut writer = writer.lock().await;
                let accepted = writer.write_all(&frame).await;
                let written = match accepted {
                    Ok(()) => writer.flush().await.map(|_| frame.len()),
                    Err(e) => Err(e),
                };
                written.map_err(|e| e.to_string())
            }
            None => Err(PORT_NOT_OPEN.to_string()),
        };

        match outcome {
            Ok(bytes_written) => {
                tracing::info!("📤 Sent: {}", command);
                Ok(SendReceipt {
                    command: command.clone(),
                    bytes_written,
                })
            }
            Err(message) => {
                tracing::error!("❌ Error: {}", message);
                Err(BridgeError::WriteError { message })
            }
        }
    }
}

#[async_trait]
impl CommandSink for CommandChannel {
    async fn send(&self, command: &Command) -> Result<SendReceipt> {
        CommandChannel::send(self, command).await
    }

    fn device(&self) -> &str {
        CommandChannel::device(self)
    }

    fn is_connected(&self) -> bool {
        CommandChannel::is_connected(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio::io::AsyncReadExt;
    use tracing_test::traced_test;

    struct TestConfig {
        device_path: String,
    }

    impl ConfigProvider for TestConfig {
        fn device_path(&self) -> &str {
            &self.device_path
        }

        fn baud_rate(&self) -> u32 {
            115_200
        }

        fn max_line_length(&self) -> usize {
            1024
        }
    }

    #[tokio::test]
    async fn test_send_writes_uppercased_frame() {
        let mock = tokio_test::io::Builder::new().write(b"HAPPY\n").build();
        let channel = CommandChannel::from_writer("COM8", mock);

        let receipt = channel.send(&Command::new("happy")).await.unwrap();
        assert_eq!(receipt.command.as_str(), "HAPPY");
        assert_eq!(receipt.bytes_written, 6);
    }

    #[tokio::test]
    async fn test_same_command_twice_writes_twice() {
        let mock = tokio_test::io::Builder::new()
            .write(b"SAD\n")
            .write(b"SAD\n")
            .build();
        let channel = CommandChannel::from_writer("COM8", mock);

        channel.send(&Command::new("SAD")).await.unwrap();
        channel.send(&Command::new("SAD")).await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_write_error() {
        let mock = tokio_test::io::Builder::new()
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
            .build();
        let channel = CommandChannel::from_writer("COM8", mock);

        match channel.send(&Command::new("wink")).await {
            Err(BridgeError::WriteError { message }) => assert_eq!(message, "device unplugged"),
            other => panic!("expected WriteError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disconnected_channel_rejects_sends() {
        let channel = CommandChannel::disconnected("COM8");
        assert!(!channel.is_connected());
        assert_eq!(channel.device(), "COM8");

        let err = channel.send(&Command::new("happy")).await.unwrap_err();
        assert_eq!(err.to_string(), PORT_NOT_OPEN);
    }

    #[tokio::test]
    async fn test_frames_arrive_whole_and_in_order() {
        let (host, mut device) = tokio::io::duplex(256);
        let channel = CommandChannel::from_writer("COM8", host);

        for name in ["happy", "surprised", "wink"] {
            channel.send(&Command::new(name)).await.unwrap();
        }
        drop(channel);

        let mut received = String::new();
        device.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HAPPY\nSURPRISED\nWINK\n");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_send_logs_outcome() {
        let mock = tokio_test::io::Builder::new().write(b"ANGRY\n").build();
        let channel = CommandChannel::from_writer("COM8", mock);
        channel.send(&Command::new("angry")).await.unwrap();
        assert!(logs_contain("Sent: ANGRY"));

        let offline = CommandChannel::disconnected("COM8");
        let _ = offline.send(&Command::new("angry")).await;
        assert!(logs_contain("Error: Port is not open"));
    }

    #[tokio::test]
    async fn test_connect_falls_back_to_disconnected() {
        let config = TestConfig {
            device_path: "/dev/emotion-bridge-missing".to_string(),
        };
        let (channel, reader) = CommandChannel::connect(&config);

        assert!(reader.is_none());
        assert!(!channel.is_connected());
        assert_eq!(channel.device(), "/dev/emotion-bridge-missing");
    }
}
