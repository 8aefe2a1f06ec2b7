//! Test helpers for capturing log output.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::Subscriber;

/// In-memory log sink shared between a subscriber and the test.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Number of lines logged at INFO level.
    pub fn info_lines(&self) -> usize {
        self.contents()
            .lines()
            .filter(|line| line.contains(" INFO "))
            .count()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Plain-text INFO subscriber writing into a fresh buffer.
pub fn capture_logs() -> (impl Subscriber + Send + Sync, SharedBuf) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::INFO)
        .finish();
    (subscriber, buf)
}
