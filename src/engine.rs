//! The dictionary engine: memory layout, stacks, the abort-code error type,
//! and the low-level byte/cell accessors the rest of the crate builds on.
//!
//! A single contiguous `dict` byte array holds both the user variable
//! overlay and every word header and compiled body created afterwards.
//! Nothing here knows about Forth syntax; that lives in
//! `internals::compiler` and `internals::inner`.

use crate::cell::{self, Cell, MemSize};
use crate::internals::host::Host;
use std::fmt;

/// Address into the dictionary. 64K words is ample for the tiny programs
/// this engine runs, and keeps persisted images portable across hosts.
pub type Addr = u16;

pub const DICT_SIZE: usize = 16 * 1024;
pub const DSTACK_SIZE: usize = 256;
pub const RSTACK_SIZE: usize = 256;
pub const READ_BUF_SIZE: usize = 32;

pub type UservarId = u8;

pub const UV_HERE: UservarId = 0;
pub const UV_LATEST: UservarId = 1;
pub const UV_TRACE: UservarId = 2;
pub const UV_COMPILING: UservarId = 3;
pub const UV_POSTPONE: UservarId = 4;
pub const UV_DSP: UservarId = 5;
pub const UV_RSP: UservarId = 6;
pub const USERVAR_COUNT: usize = 7;

pub const FLAG_LEN_MASK: u8 = 0x1f;
pub const FLAG_PRIM: u8 = 0x20;
pub const FLAG_IMMEDIATE: u8 = 0x40;

/// `zf_result` in the original engine folded `ZF_OK` into the same enum as
/// the abort reasons; we keep that shape so `eval` can return a single
/// value instead of an `Option`/`Result` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCode {
    Ok,
    InternalError,
    OutsideMem,
    DStackUnderrun,
    DStackOverrun,
    RStackUnderrun,
    RStackOverrun,
    NotAWord,
    CompileOnlyWord,
    InvalidSize,
    DivisionByZero,
    InvalidUservar,
    External,
}

impl fmt::Display for AbortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbortCode::Ok => "ok",
            AbortCode::InternalError => "internal error",
            AbortCode::OutsideMem => "outside memory",
            AbortCode::DStackUnderrun => "data stack underrun",
            AbortCode::DStackOverrun => "data stack overrun",
            AbortCode::RStackUnderrun => "return stack underrun",
            AbortCode::RStackOverrun => "return stack overrun",
            AbortCode::NotAWord => "not a word",
            AbortCode::CompileOnlyWord => "compile-only word",
            AbortCode::InvalidSize => "invalid size",
            AbortCode::DivisionByZero => "division by zero",
            AbortCode::InvalidUservar => "invalid uservar",
            AbortCode::External => "external abort",
        };
        f.write_str(s)
    }
}

impl std::error::Error for AbortCode {}

/// `Err` variants here are always one of the non-`Ok` `AbortCode`s; `Ok`
/// is reserved for `Engine::eval`'s success return.
pub type EngineResult<T> = Result<T, AbortCode>;

/// Which kind of input a suspended primitive is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Interpret,
    PassChar,
    PassWord,
}

pub struct Engine {
    pub(crate) dict: [u8; DICT_SIZE],
    pub(crate) dstack: [Cell; DSTACK_SIZE],
    pub(crate) rstack: [Cell; RSTACK_SIZE],
    pub(crate) ip: Addr,
    pub input_state: InputState,
    pub(crate) read_buf: [u8; READ_BUF_SIZE],
    pub(crate) read_len: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Engine {
        let mut e = Engine {
            dict: [0u8; DICT_SIZE],
            dstack: [0 as Cell; DSTACK_SIZE],
            rstack: [0 as Cell; RSTACK_SIZE],
            ip: 0,
            input_state: InputState::Interpret,
            read_buf: [0u8; READ_BUF_SIZE],
            read_len: 0,
        };
        e.init(false);
        e
    }

    /// Resets all memory and re-installs the user variable overlay. Does
    /// not repopulate the dictionary; call `bootstrap` afterwards for a
    /// usable interpreter.
    pub fn init(&mut self, trace: bool) {
        self.dict = [0u8; DICT_SIZE];
        self.dstack = [0 as Cell; DSTACK_SIZE];
        self.rstack = [0 as Cell; RSTACK_SIZE];
        self.ip = 0;
        self.input_state = InputState::Interpret;
        self.read_buf = [0u8; READ_BUF_SIZE];
        self.read_len = 0;
        self.uservar_raw_set(UV_HERE, (USERVAR_COUNT * 2) as Addr);
        self.uservar_raw_set(UV_LATEST, 0);
        self.uservar_raw_set(UV_TRACE, if trace { 1 } else { 0 });
        self.uservar_raw_set(UV_COMPILING, 0);
        self.uservar_raw_set(UV_POSTPONE, 0);
        self.uservar_raw_set(UV_DSP, 0);
        self.uservar_raw_set(UV_RSP, 0);
    }

    pub fn tracing(&self) -> bool {
        self.uservar_raw_get(UV_TRACE) != 0
    }

    /// Forwards `text` to `host.trace` when `TRACE` is non-zero; a no-op
    /// otherwise so callers don't need to guard every call site.
    pub(crate) fn trace(&self, host: &mut dyn Host, text: &str) {
        if self.tracing() {
            host.trace(self, text);
        }
    }

    // --- user variables -------------------------------------------------

    pub(crate) fn uservar_raw_get(&self, id: UservarId) -> Addr {
        let off = id as usize * 2;
        Addr::from_ne_bytes([self.dict[off], self.dict[off + 1]])
    }

    pub(crate) fn uservar_raw_set(&mut self, id: UservarId, v: Addr) {
        let off = id as usize * 2;
        let b = v.to_ne_bytes();
        self.dict[off] = b[0];
        self.dict[off + 1] = b[1];
    }

    pub fn uservar_get(&self, id: UservarId) -> EngineResult<Cell> {
        if (id as usize) >= USERVAR_COUNT {
            return Err(AbortCode::InvalidUservar);
        }
        Ok(addr_to_cell(self.uservar_raw_get(id)))
    }

    pub fn uservar_set(&mut self, id: UservarId, v: Cell) -> EngineResult<()> {
        if (id as usize) >= USERVAR_COUNT {
            return Err(AbortCode::InvalidUservar);
        }
        self.uservar_raw_set(id, cell_to_addr(v));
        Ok(())
    }

    // --- dictionary byte/cell access ------------------------------------

    pub(crate) fn dict_get_bytes(&self, addr: Addr, out: &mut [u8]) -> EngineResult<()> {
        let addr = addr as usize;
        let len = out.len();
        if addr + len > DICT_SIZE {
            return Err(AbortCode::OutsideMem);
        }
        out.copy_from_slice(&self.dict[addr..addr + len]);
        Ok(())
    }

    pub(crate) fn dict_put_bytes(&mut self, addr: Addr, bytes: &[u8]) -> EngineResult<()> {
        let addr = addr as usize;
        let len = bytes.len();
        if addr + len > DICT_SIZE {
            return Err(AbortCode::OutsideMem);
        }
        self.dict[addr..addr + len].copy_from_slice(bytes);
        Ok(())
    }

    /// Reads a variable-length cell at `addr`. Returns the value and the
    /// number of bytes it occupied.
    pub(crate) fn dict_get_cell(&self, addr: Addr) -> EngineResult<(Cell, usize)> {
        self.dict_get_cell_typed(addr, MemSize::Var)
    }

    pub(crate) fn dict_put_cell(&mut self, addr: Addr, v: Cell) -> EngineResult<usize> {
        self.dict_put_cell_typed(addr, v, MemSize::Var)
    }

    pub(crate) fn dict_get_cell_typed(&self, addr: Addr, size: MemSize) -> EngineResult<(Cell, usize)> {
        match size {
            MemSize::Var => {
                let mut hdr = [0u8; 2];
                self.dict_get_bytes(addr, &mut hdr)?;
                if hdr[0] == 0xff {
                    let mut raw = [0u8; cell::MAX_CELL_BYTES];
                    let n = 1 + std::mem::size_of::<Cell>();
                    self.dict_get_bytes(addr, &mut raw[..n])?;
                    Ok(cell::var_decode(&raw[..n]))
                } else {
                    Ok(cell::var_decode(&hdr))
                }
            }
            other => {
                let len = other.fixed_len().ok_or(AbortCode::InvalidSize)?;
                let mut buf = [0u8; cell::MAX_CELL_BYTES];
                self.dict_get_bytes(addr, &mut buf[..len])?;
                Ok((cell::typed_decode(&buf[..len], other), len))
            }
        }
    }

    pub(crate) fn dict_put_cell_typed(
        &mut self,
        addr: Addr,
        v: Cell,
        size: MemSize,
    ) -> EngineResult<usize> {
        match size {
            MemSize::Var => {
                let mut buf = [0u8; cell::MAX_CELL_BYTES];
                let n = cell::var_encode(v, &mut buf);
                self.dict_put_bytes(addr, &buf[..n])?;
                Ok(n)
            }
            other => {
                let len = other.fixed_len().ok_or(AbortCode::InvalidSize)?;
                let mut buf = [0u8; cell::MAX_CELL_BYTES];
                cell::typed_encode(v, other, &mut buf[..len]);
                self.dict_put_bytes(addr, &buf[..len])?;
                Ok(len)
            }
        }
    }

    /// Length in bytes that a cell at `addr` occupies under `size`, without
    /// otherwise using the value. Used by the `LEN` primitive.
    pub(crate) fn dict_cell_len(&self, addr: Addr, size: MemSize) -> EngineResult<usize> {
        self.dict_get_cell_typed(addr, size).map(|(_, n)| n)
    }

    // --- compile-time dictionary growth ---------------------------------

    pub(crate) fn dict_add_cell_typed(&mut self, v: Cell, size: MemSize) -> EngineResult<()> {
        let here = self.uservar_raw_get(UV_HERE);
        let n = self.dict_put_cell_typed(here, v, size)?;
        self.uservar_raw_set(UV_HERE, here + n as Addr);
        Ok(())
    }

    pub(crate) fn dict_add_cell(&mut self, v: Cell) -> EngineResult<()> {
        self.dict_add_cell_typed(v, MemSize::Var)
    }

    pub(crate) fn dict_add_bytes(&mut self, bytes: &[u8]) -> EngineResult<()> {
        let here = self.uservar_raw_get(UV_HERE);
        self.dict_put_bytes(here, bytes)?;
        self.uservar_raw_set(UV_HERE, here + bytes.len() as Addr);
        Ok(())
    }

    // --- data stack -------------------------------------------------------

    pub fn push(&mut self, host: &mut dyn Host, v: Cell) -> EngineResult<()> {
        let dsp = self.uservar_raw_get(UV_DSP) as usize;
        if dsp >= DSTACK_SIZE {
            return Err(AbortCode::DStackOverrun);
        }
        self.dstack[dsp] = v;
        self.uservar_raw_set(UV_DSP, (dsp + 1) as Addr);
        self.trace(host, &format!("»{} ", cell_to_i64(v)));
        Ok(())
    }

    pub fn pop(&mut self, host: &mut dyn Host) -> EngineResult<Cell> {
        let dsp = self.uservar_raw_get(UV_DSP) as usize;
        if dsp == 0 {
            return Err(AbortCode::DStackUnderrun);
        }
        let v = self.dstack[dsp - 1];
        self.uservar_raw_set(UV_DSP, (dsp - 1) as Addr);
        self.trace(host, &format!("«{} ", cell_to_i64(v)));
        Ok(v)
    }

    pub fn pick(&self, n: usize) -> EngineResult<Cell> {
        let dsp = self.uservar_raw_get(UV_DSP) as usize;
        if n >= dsp {
            return Err(AbortCode::DStackUnderrun);
        }
        Ok(self.dstack[dsp - 1 - n])
    }

    pub fn dstack_len(&self) -> usize {
        self.uservar_raw_get(UV_DSP) as usize
    }

    // --- return stack -------------------------------------------------

    pub(crate) fn pushr(&mut self, host: &mut dyn Host, v: Cell) -> EngineResult<()> {
        let rsp = self.uservar_raw_get(UV_RSP) as usize;
        if rsp >= RSTACK_SIZE {
            return Err(AbortCode::RStackOverrun);
        }
        self.rstack[rsp] = v;
        self.uservar_raw_set(UV_RSP, (rsp + 1) as Addr);
        self.trace(host, &format!("r»{} ", cell_to_i64(v)));
        Ok(())
    }

    pub(crate) fn popr(&mut self, host: &mut dyn Host) -> EngineResult<Cell> {
        let rsp = self.uservar_raw_get(UV_RSP) as usize;
        if rsp == 0 {
            return Err(AbortCode::RStackUnderrun);
        }
        let v = self.rstack[rsp - 1];
        self.uservar_raw_set(UV_RSP, (rsp - 1) as Addr);
        self.trace(host, &format!("r«{} ", cell_to_i64(v)));
        Ok(v)
    }

    pub(crate) fn pickr(&self, n: usize) -> EngineResult<Cell> {
        let rsp = self.uservar_raw_get(UV_RSP) as usize;
        if n >= rsp {
            return Err(AbortCode::RStackUnderrun);
        }
        Ok(self.rstack[rsp - 1 - n])
    }

    /// Convenience for host callbacks that want to raise an abort from
    /// inside `Host::sys`/`Host::parse_num` without constructing a `Result`
    /// by hand.
    pub fn abort<T>(&mut self, reason: AbortCode) -> EngineResult<T> {
        Err(reason)
    }
}

pub(crate) fn addr_to_cell(a: Addr) -> Cell {
    a as Cell
}

pub(crate) fn cell_to_addr(v: Cell) -> Addr {
    v as i64 as Addr
}

pub(crate) fn cell_to_i64(v: Cell) -> i64 {
    v as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internals::console::NullHost;

    #[test]
    fn fresh_engine_has_expected_here() {
        let e = Engine::new();
        assert_eq!(e.uservar_get(UV_HERE).unwrap(), (USERVAR_COUNT * 2) as Cell);
        assert_eq!(e.uservar_get(UV_LATEST).unwrap(), 0 as Cell);
    }

    #[test]
    fn push_pop_roundtrip() {
        let mut e = Engine::new();
        let mut host = NullHost;
        e.push(&mut host, 42 as Cell).unwrap();
        e.push(&mut host, 7 as Cell).unwrap();
        assert_eq!(e.pop(&mut host).unwrap(), 7 as Cell);
        assert_eq!(e.pop(&mut host).unwrap(), 42 as Cell);
    }

    #[test]
    fn pop_on_empty_stack_underruns() {
        let mut e = Engine::new();
        let mut host = NullHost;
        assert_eq!(e.pop(&mut host), Err(AbortCode::DStackUnderrun));
    }

    #[test]
    fn push_past_capacity_overruns() {
        let mut e = Engine::new();
        let mut host = NullHost;
        for _ in 0..DSTACK_SIZE {
            e.push(&mut host, 1 as Cell).unwrap();
        }
        assert_eq!(e.push(&mut host, 1 as Cell), Err(AbortCode::DStackOverrun));
    }

    #[test]
    fn invalid_uservar_id_is_rejected() {
        let e = Engine::new();
        assert_eq!(e.uservar_get(USERVAR_COUNT as UservarId), Err(AbortCode::InvalidUservar));
    }

    #[test]
    fn dict_cell_roundtrip_across_boundary() {
        let mut e = Engine::new();
        let addr = (DICT_SIZE - 1) as Addr;
        e.dict_put_bytes(addr, &[5]).unwrap();
        assert_eq!(e.dict_get_bytes(addr, &mut [0u8; 1]).map(|_| ()), Ok(()));
        assert_eq!(
            e.dict_put_bytes(addr, &[5, 6]),
            Err(AbortCode::OutsideMem)
        );
    }
}
