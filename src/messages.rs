//! Leveled diagnostics, bridging the engine's own terminology
//! (`DebugLevel`) onto the `log` crate so a host can configure output
//! with the usual `RUST_LOG` machinery via `env_logger`.

use log::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Error,
    Warning,
    Info,
    Debug,
}

#[derive(Default)]
pub struct Msg {
    level: Option<DebugLevel>,
}

impl Msg {
    pub fn new() -> Msg {
        Msg { level: Some(DebugLevel::Error) }
    }

    pub fn set_level(&mut self, level: DebugLevel) {
        self.level = Some(level);
    }

    pub fn get_level(&self) -> DebugLevel {
        self.level.unwrap_or(DebugLevel::Error)
    }

    pub fn error(&self, context: &str, text: &str) {
        error!(target: "zf", "{context}: {text}");
    }

    pub fn warning(&self, context: &str, text: &str) {
        if self.get_level() >= DebugLevel::Warning {
            warn!(target: "zf", "{context}: {text}");
        }
    }

    pub fn info(&self, context: &str, text: &str) {
        if self.get_level() >= DebugLevel::Info {
            info!(target: "zf", "{context}: {text}");
        }
    }

    pub fn debug(&self, context: &str, text: &str) {
        if self.get_level() >= DebugLevel::Debug {
            debug!(target: "zf", "{context}: {text}");
        }
    }
}
