//! A small, embeddable Forth-family dictionary engine: a threaded-code
//! inner interpreter, a text outer interpreter, and a host-callback
//! boundary for I/O, number parsing, and tracing.

pub mod cell;
pub mod config;
pub mod engine;
pub mod internals;
pub mod messages;

pub use cell::{Cell, Int};
pub use engine::{AbortCode, Addr, Engine, EngineResult, InputState};
pub use internals::builtin::Prim;
pub use internals::host::{Host, SYSCALL_EMIT, SYSCALL_PRINT, SYSCALL_TELL, SYSCALL_USER};
