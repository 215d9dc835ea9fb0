//! Alert output

use crate::error::Result;
use std::future::Future;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const BELL: &[u8] = b"\x07";

/// Destination for alert lines
pub trait AlertSink {
    fn write_line(&mut self, line: &str) -> impl Future<Output = Result<()>>;

    fn ring_bell(&mut self) -> impl Future<Output = Result<()>>;
}

/// Writes alerts to a terminal-like stream, bell included
pub struct ConsoleSink<W> {
    out: W,
}

impl ConsoleSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: AsyncWrite + Unpin> AlertSink for ConsoleSink<W> {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.out.write_all(format!("{}\n", line).as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn ring_bell(&mut self) -> Result<()> {
        self.out.write_all(BELL).await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// Keeps alerts in memory
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) lines: Vec<String>,
        pub(crate) bells: usize,
    }

    impl AlertSink for RecordingSink {
        async fn write_line(&mut self, line: &str) -> Result<()> {
            self.lines.push(line.to_string());
            Ok(())
        }

        async fn ring_bell(&mut self) -> Result<()> {
            self.bells += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_console_sink_writes_line_then_bell() {
        let mock = Builder::new()
            .write("🚨 bob @ DM: hi\n".as_bytes())
            .write(b"\x07")
            .build();
        let mut sink = ConsoleSink::new(mock);

        sink.write_line("🚨 bob @ DM: hi").await.unwrap();
        sink.ring_bell().await.unwrap();
    }
}
