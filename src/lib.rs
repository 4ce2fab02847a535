pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::app::script::{EmotionScript, ScriptRunner};
pub use crate::config::{BridgeConfig, CliArgs};
pub use crate::core::{channel::CommandChannel, line_reader::LineReader};
pub use crate::domain::model::{Command, InboundLine, SendReceipt};
pub use crate::domain::ports::{CommandSink, ConfigProvider};
pub use crate::utils::error::{BridgeError, Result};
