pub mod channel;
pub mod line_reader;

pub use crate::domain::model::{Command, InboundLine, SendReceipt};
pub use crate::domain::ports::{CommandSink, ConfigProvider};
pub use crate::utils::error::Result;
