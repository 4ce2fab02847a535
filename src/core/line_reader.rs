use crate::domain::model::{InboundLine, LINE_TERMINATOR};
use bytes::{Buf, BytesMut};
use futures::{Stream, StreamExt};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_util::codec::{Decoder, FramedRead};

pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Splits a byte stream on `\n`.
///
/// Partial lines stay buffered until their terminator arrives. A line longer
/// than `max_length` is dropped up to its next terminator and decoding carries
/// on after it.
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    next_index: usize,
    discarding: bool,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
            next_index: 0,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl Decoder for LineCodec {
    type Item = InboundLine;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<InboundLine>> {
        loop {
            // 多看兩個位元組：剛好等於上限的行後面還可能有 `\r\n`
            let read_to = buf.len().min(self.max_length.saturating_add(2));
            let newline = buf[self.next_index..read_to]
                .iter()
                .position(|b| *b == LINE_TERMINATOR);

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    buf.advance(self.next_index + offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    buf.advance(read_to);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let line = buf.split_to(end + 1);
                    let content = &line[..end];
                    let visible = content.strip_suffix(b"\r").unwrap_or(content);
                    if visible.len() > self.max_length {
                        tracing::warn!(
                            "⚠️ Device line exceeded {} bytes, discarding it",
                            self.max_length
                        );
                        continue;
                    }
                    return Ok(Some(InboundLine::from_bytes(content)));
                }
                (false, None) if buf.len() > self.max_length.saturating_add(1) => {
                    tracing::warn!(
                        "⚠️ Device line exceeded {} bytes, discarding it",
                        self.max_length
                    );
                    self.discarding = true;
                    self.next_index = 0;
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<InboundLine>> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        if buf.is_empty() || self.discarding {
            buf.clear();
            self.discarding = false;
            self.next_index = 0;
            return Ok(None);
        }

        // 連線結束時把尚未遇到換行的殘餘資料當作最後一行送出
        let rest = buf.split_to(buf.len());
        self.next_index = 0;
        Ok(Some(InboundLine::from_bytes(&rest)))
    }
}

/// Lazy, non-restartable stream of lines read from the device.
pub struct LineReader<R> {
    lines: FramedRead<R, LineCodec>,
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_max_length(reader, DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(reader: R, max_length: usize) -> Self {
        Self {
            lines: FramedRead::new(reader, LineCodec::new(max_length)),
        }
    }
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Logs every device line on a background task until the port closes.
    pub fn spawn_logger(self) -> JoinHandle<usize> {
        tokio::spawn(async move {
            let mut lines = self;
            let mut count = 0;

            while let Some(item) = lines.next().await {
                match item {
                    Ok(line) => {
                        count += 1;
                        tracing::info!("🤖 Robot says: {}", line);
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Serial read failed: {}", e);
                        break;
                    }
                }
            }

            tracing::debug!("Line reader stopped after {} lines", count);
            count
        })
    }
}

impl<R> Stream for LineReader<R>
where
    R: AsyncRead + Unpin,
{
    type Item = io::Result<InboundLine>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.lines).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn decode_all(codec: &mut LineCodec, input: &[u8]) -> Vec<String> {
        let mut buf = BytesMut::from(input);
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(&mut buf).unwrap() {
            lines.push(line.into_string());
        }
        lines
    }

    #[test]
    fn test_codec_buffers_partial_lines() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from(&b"HEL"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"LO\nWOR");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().as_str(), "HELLO");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"LD\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().as_str(), "WORLD");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_keeps_empty_lines() {
        let mut codec = LineCodec::default();
        assert_eq!(decode_all(&mut codec, b"A\n\nB\n"), vec!["A", "", "B"]);
    }

    #[test]
    fn test_codec_discards_overlong_line() {
        let mut codec = LineCodec::new(4);
        assert_eq!(
            decode_all(&mut codec, b"OK\nTOOLONGLINE\nSAD\n"),
            vec!["OK", "SAD"]
        );
    }

    #[test]
    fn test_codec_line_at_limit_is_kept() {
        let mut codec = LineCodec::new(4);
        assert_eq!(decode_all(&mut codec, b"WINK\n"), vec!["WINK"]);
    }

    #[test]
    fn test_codec_crlf_line_at_limit_is_kept() {
        let mut codec = LineCodec::new(4);
        assert_eq!(decode_all(&mut codec, b"WINK\r\nOK\n"), vec!["WINK", "OK"]);
    }

    #[test]
    fn test_codec_discards_line_just_over_limit() {
        let mut codec = LineCodec::new(4);
        assert_eq!(decode_all(&mut codec, b"HAPPY\nSAD\r\n"), vec!["SAD"]);
    }

    #[test]
    fn test_codec_flushes_remainder_at_eof() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from(&b"DONE\nPARTIAL"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap().unwrap().as_str(), "DONE");
        assert_eq!(codec.decode_eof(&mut buf).unwrap().unwrap().as_str(), "PARTIAL");
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reader_yields_lines_across_chunks() {
        let (mut device, host) = tokio::io::duplex(64);
        let mut reader = LineReader::new(host);

        device.write_all(b"Emotion set: HA").await.unwrap();
        device.write_all(b"PPY\r\nEmotion set: SAD\n").await.unwrap();
        drop(device);

        let lines: Vec<String> = reader
            .by_ref()
            .map(|line| line.unwrap().into_string())
            .collect()
            .await;
        assert_eq!(lines, vec!["Emotion set: HAPPY", "Emotion set: SAD"]);
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_reader_from_mock_serial() {
        let mock = tokio_test::io::Builder::new()
            .read(b"READY\n")
            .read(b"OK")
            .read(b"\n")
            .build();
        let reader = LineReader::new(mock);

        let lines: Vec<String> = reader.map(|line| line.unwrap().into_string()).collect().await;
        assert_eq!(lines, vec!["READY", "OK"]);
    }

    #[tokio::test]
    async fn test_spawn_logger_counts_lines() {
        let (mut device, host) = tokio::io::duplex(64);
        let handle = LineReader::new(host).spawn_logger();

        device.write_all(b"one\ntwo\nthree\n").await.unwrap();
        drop(device);

        assert_eq!(handle.await.unwrap(), 3);
    }
}
