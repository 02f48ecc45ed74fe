//! The boundary between the engine and its embedder. `Host` is passed
//! explicitly to every entry point that might need it rather than stored
//! on `Engine`, so a primitive's callback can freely borrow the engine
//! mutably at the same time.

use crate::cell::Cell;
use crate::engine::{Engine, EngineResult, InputState};

pub const SYSCALL_EMIT: i32 = 0;
pub const SYSCALL_PRINT: i32 = 1;
pub const SYSCALL_TELL: i32 = 2;
pub const SYSCALL_USER: i32 = 128;

pub trait Host {
    /// Dispatches a host syscall. `word` carries whatever the `SYS`
    /// primitive had available as its suspension input: `None` on first
    /// call, `Some` text on a resumed call once the host supplied more.
    /// Returning anything other than `InputState::Interpret` suspends the
    /// primitive and re-pushes `id` for the next resumption.
    fn sys(&mut self, engine: &mut Engine, id: i32, word: Option<&str>) -> EngineResult<InputState>;

    /// Parses `text` as a number in whatever base/format the host
    /// supports. Returning `Err` aborts with that reason (`NotAWord` is
    /// the conventional choice for a plain parse failure).
    fn parse_num(&mut self, engine: &mut Engine, text: &str) -> EngineResult<Cell>;

    /// Receives trace output emitted while `TRACE` is non-zero. Never
    /// fails; a host uninterested in tracing can make this a no-op.
    fn trace(&mut self, engine: &Engine, text: &str);
}
