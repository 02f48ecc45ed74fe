//! Reference `Host` implementations: a `NullHost` for tests that never
//! drives I/O, and a `ConsoleHost` that wires `EMIT`/`PRINT`/`TELL` to
//! stdout and adds an `include-file` syscall for loading `.zf` sources.

use crate::cell::Cell;
use crate::engine::{AbortCode, Engine, EngineResult, InputState};
use crate::internals::host::{Host, SYSCALL_EMIT, SYSCALL_PRINT, SYSCALL_TELL, SYSCALL_USER};
use crate::messages::Msg;
use log::trace;
use std::fs;
use std::io::Write;

/// A host with no I/O, useful for unit tests that only care about stack
/// and dictionary effects.
pub struct NullHost;

impl Host for NullHost {
    fn sys(&mut self, engine: &mut Engine, _id: i32, _word: Option<&str>) -> EngineResult<InputState> {
        engine.abort(AbortCode::NotAWord)
    }

    fn parse_num(&mut self, _engine: &mut Engine, text: &str) -> EngineResult<Cell> {
        parse_cell(text).ok_or(AbortCode::NotAWord)
    }

    fn trace(&mut self, _engine: &Engine, _text: &str) {}
}

/// Syscall id for exiting the REPL cleanly (`bye`), mirroring
/// `ZF_SYSCALL_USER + 0` in the original Linux host.
pub const SYSCALL_BYE: i32 = SYSCALL_USER;

/// Syscall id for loading a file by name (the traditional zForth
/// `include-file` word), mirroring `ZF_SYSCALL_USER + 2` in the original
/// Linux host. Reads the file's words one at a time, so the suspension
/// protocol for `TICK`/`COL` still works across file boundaries the way
/// it would over stdin.
pub const SYSCALL_INCLUDE: i32 = SYSCALL_USER + 1;

/// The REPL-facing host: prints to stdout, logs trace output through
/// `log`, and supports `bye` and `include-file`.
pub struct ConsoleHost {
    msg: Msg,
    bye: bool,
}

impl ConsoleHost {
    pub fn new(msg: Msg) -> ConsoleHost {
        ConsoleHost { msg, bye: false }
    }

    /// Set by the `bye` syscall; the REPL loop checks this after every
    /// `eval` call and stops reading further input once it's true.
    pub fn bye_requested(&self) -> bool {
        self.bye
    }

    /// Loads `path` and evaluates it one line at a time, stopping (and
    /// reporting) at the first line that aborts.
    pub fn include_file(&mut self, engine: &mut Engine, path: &str) -> EngineResult<()> {
        let contents = fs::read_to_string(path).map_err(|_| AbortCode::External)?;
        for (lineno, line) in contents.lines().enumerate() {
            let result = engine.eval(self, line);
            if result != AbortCode::Ok {
                self.msg.error("include-file", &format!("{path}:{}: {result}", lineno + 1));
                return Err(result);
            }
        }
        Ok(())
    }
}

impl Host for ConsoleHost {
    fn sys(&mut self, engine: &mut Engine, id: i32, word: Option<&str>) -> EngineResult<InputState> {
        match id {
            SYSCALL_EMIT => {
                let c = engine.pop(self)?;
                let byte = (c as i64 as u8) as char;
                print!("{byte}");
                let _ = std::io::stdout().flush();
                Ok(InputState::Interpret)
            }
            SYSCALL_PRINT => {
                let v = engine.pop(self)?;
                print!("{} ", v);
                let _ = std::io::stdout().flush();
                Ok(InputState::Interpret)
            }
            SYSCALL_TELL => {
                let len = engine.pop(self)?;
                let addr = engine.pop(self)?;
                let len = len as i64 as usize;
                let addr = addr as i64 as u16;
                let mut buf = vec![0u8; len];
                engine.dict_get_bytes(addr, &mut buf)?;
                let text = String::from_utf8_lossy(&buf);
                print!("{text}");
                let _ = std::io::stdout().flush();
                Ok(InputState::Interpret)
            }
            SYSCALL_BYE => {
                self.bye = true;
                Ok(InputState::Interpret)
            }
            SYSCALL_INCLUDE => match word {
                None => Ok(InputState::PassWord),
                Some(name) => {
                    self.include_file(engine, name)?;
                    Ok(InputState::Interpret)
                }
            },
            _ => engine.abort(AbortCode::NotAWord),
        }
    }

    fn parse_num(&mut self, _engine: &mut Engine, text: &str) -> EngineResult<Cell> {
        parse_cell(text).ok_or(AbortCode::NotAWord)
    }

    fn trace(&mut self, _engine: &Engine, text: &str) {
        trace!("{text}");
    }
}

fn parse_cell(text: &str) -> Option<Cell> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok().map(|v| v as Cell);
    }
    text.parse::<Cell>().ok()
}
