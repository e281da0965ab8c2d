use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and hands it to the matching `console` method on drop.
pub(crate) struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        let msg = wasm_bindgen::JsValue::from_str(line);
        match console_method(self.level) {
            ConsoleMethod::Error => web_sys::console::error_1(&msg),
            ConsoleMethod::Warn => web_sys::console::warn_1(&msg),
            ConsoleMethod::Log => web_sys::console::log_1(&msg),
            ConsoleMethod::Debug => web_sys::console::debug_1(&msg),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConsoleMethod {
    Error,
    Warn,
    Log,
    Debug,
}

fn console_method(level: Level) -> ConsoleMethod {
    match level {
        Level::ERROR => ConsoleMethod::Error,
        Level::WARN => ConsoleMethod::Warn,
        Level::INFO => ConsoleMethod::Log,
        _ => ConsoleMethod::Debug,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Installs the global subscriber. Safe to call more than once.
pub(crate) fn init(max_level: Level) {
    // No clock on wasm32-unknown-unknown; the console timestamps lines anyway.
    let result = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(max_level)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .try_init();

    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}
