//! Routes `tracing` events from the core crate to the browser console.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;
use web_sys::console;

/// Install the console subscriber. Later calls are no-ops.
pub fn install() {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(Level::DEBUG)
        .without_time()
        .try_init();
    if installed.is_err() {
        console::debug_1(&JsValue::from_str("tracing subscriber already installed"));
    }
}

/// Hands out one [`ConsoleWriter`] per formatted event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one event and emits it on drop with the console method
/// matching its level.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = take_line(&mut self.buf) {
            emit(self.level, &line);
        }
    }
}

/// The buffered text without its trailing newline, or `None` if blank.
fn take_line(buf: &mut Vec<u8>) -> Option<String> {
    let text = String::from_utf8_lossy(buf).trim_end().to_string();
    buf.clear();
    (!text.is_empty()).then_some(text)
}

fn emit(level: Level, line: &str) {
    let value = JsValue::from_str(line);
    match level {
        Level::ERROR => console::error_1(&value),
        Level::WARN => console::warn_1(&value),
        Level::INFO => console::info_1(&value),
        _ => console::debug_1(&value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_line_strips_newline() {
        let mut buf = b" INFO photodesk_core::editor: image saved version=2\n".to_vec();
        assert_eq!(
            take_line(&mut buf).as_deref(),
            Some(" INFO photodesk_core::editor: image saved version=2")
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_take_line_blank() {
        let mut buf = b"\n".to_vec();
        assert_eq!(take_line(&mut buf), None);
        assert_eq!(take_line(&mut Vec::new()), None);
    }

    #[test]
    fn test_writer_buffers_until_drop() {
        use std::io::Write;

        let mut writer = ConsoleWriter::new(Level::WARN);
        write!(writer, "save failed: ").unwrap();
        writer.write_all(b"HTTP 500\n").unwrap();
        assert_eq!(take_line(&mut writer.buf).as_deref(), Some("save failed: HTTP 500"));
        // Nothing left, so dropping off-target does not reach the console.
        drop(writer);
    }
}
