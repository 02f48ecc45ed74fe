//! Command line configuration for the `zf` binary.

use crate::messages::DebugLevel;
use argh::FromArgs;

pub const VERSION: &str = "0.1.0";

/// A small Forth-family interpreter.
#[derive(FromArgs)]
pub struct Config {
    /// log level: error, warning, info, or debug
    #[argh(option, default = "\"error\".to_string()")]
    pub debug_level: String,

    /// load a dictionary image saved by a previous session
    #[argh(option)]
    pub load: Option<String>,

    /// save the dictionary image to this path on exit
    #[argh(option)]
    pub save: Option<String>,

    /// evaluate a `.zf` source file and exit instead of starting the REPL
    #[argh(option, short = 'f')]
    pub file: Option<String>,

    /// enable primitive-level tracing from startup
    #[argh(switch, short = 't')]
    pub trace: bool,
}

impl Config {
    pub fn parse() -> Config {
        argh::from_env()
    }

    pub fn debug_level(&self) -> DebugLevel {
        match self.debug_level.as_str() {
            "debug" => DebugLevel::Debug,
            "info" => DebugLevel::Info,
            "warning" => DebugLevel::Warning,
            _ => DebugLevel::Error,
        }
    }
}
