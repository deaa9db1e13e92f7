//! Where the `print` builtin writes.
//!
//! Macro code runs while a file is being expanded, and the expanded text
//! itself usually goes to stdout. Macro output therefore defaults to stderr
//! in the CLI, can be captured in a buffer by tests, or dropped entirely.
//!
//! Enum dispatch instead of trait objects keeps the call static.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;

/// Print handler that captures output in memory.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        BufferPrintHandler::default()
    }

    pub fn write(&self, text: &str) {
        self.buffer.lock().push_str(text);
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

pub enum PrintHandlerImpl {
    Stdout,
    Stderr,
    Buffer(BufferPrintHandler),
    /// Discards everything.
    Silent,
}

impl PrintHandlerImpl {
    /// Write `text` as is. Write failures on the standard streams are
    /// ignored, like a closed pipe under `print`.
    pub fn write(&self, text: &str) {
        match self {
            Self::Stdout => {
                let _ = std::io::stdout().lock().write_all(text.as_bytes());
            }
            Self::Stderr => {
                let _ = std::io::stderr().lock().write_all(text.as_bytes());
            }
            Self::Buffer(h) => h.write(text),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout | Self::Stderr | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

pub fn stderr_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stderr)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

/// A print destination chosen by name, as on the command line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PrintTarget {
    Stdout,
    #[default]
    Stderr,
    Silent,
}

impl PrintTarget {
    pub fn handler(self) -> SharedPrintHandler {
        match self {
            PrintTarget::Stdout => stdout_handler(),
            PrintTarget::Stderr => stderr_handler(),
            PrintTarget::Silent => silent_handler(),
        }
    }
}

impl FromStr for PrintTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(PrintTarget::Stdout),
            "stderr" => Ok(PrintTarget::Stderr),
            "silent" => Ok(PrintTarget::Silent),
            other => Err(format!(
                "unknown print target '{other}' (expected stdout, stderr or silent)"
            )),
        }
    }
}

impl fmt::Display for PrintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrintTarget::Stdout => "stdout",
            PrintTarget::Stderr => "stderr",
            PrintTarget::Silent => "silent",
        })
    }
}
