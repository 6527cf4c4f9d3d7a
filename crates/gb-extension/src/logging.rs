//! `tracing` output to the browser console
//!
//! The filter sits behind a reload layer so the page agent can switch
//! between verbose and quiet logging on every install.

use std::cell::RefCell;
use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

thread_local! {
    static FILTER: RefCell<Option<FilterHandle>> = const { RefCell::new(None) };
}

/// Buffers one formatted event and forwards it to `console` on drop
struct ConsoleWriter {
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
        let line = wasm_bindgen::JsValue::from_str(line);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

struct Console;

impl<'a> MakeWriter<'a> for Console {
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

/// Install the console subscriber, or swap its filter if already installed
pub fn init(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    FILTER.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(handle) = slot.as_ref() {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!("Failed to change log filter: {}", e);
            }
            return;
        }

        let (filter_layer, handle) = reload::Layer::new(filter);
        let installed = tracing_subscriber::registry()
            .with(filter_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_target(true)
                    .with_writer(Console),
            )
            .try_init()
            .is_ok();
        if installed {
            *slot = Some(handle);
        }
    });
}
