use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame terminator for both directions of the serial link.
pub const LINE_TERMINATOR: u8 = b'\n';

/// A device command such as `HAPPY` or `SAD`.
///
/// Construction always normalizes: line breaks are removed and the text is
/// uppercased, so a command maps to exactly one newline-terminated frame on
/// the wire. No allow-list is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Command(String);

impl Command {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let text: String = raw
            .as_ref()
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect();
        Self(text.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 實際寫入序列埠的位元組：`<COMMAND>\n`
    pub fn wire_bytes(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.0.len() + 1);
        frame.extend_from_slice(self.0.as_bytes());
        frame.push(LINE_TERMINATOR);
        frame
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Command {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.0
    }
}

/// Local acknowledgment that the transport accepted a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub command: Command,
    pub bytes_written: usize,
}

/// A line of text reported by the device, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundLine(String);

impl InboundLine {
    /// 非 UTF-8 位元組以替代字元保留，行尾的 `\r` 會被移除
    pub fn from_bytes(raw: &[u8]) -> Self {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        Self(String::from_utf8_lossy(raw).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for InboundLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
