//! The threaded-code inner interpreter: decodes opcodes at `ip` and either
//! dispatches a primitive or calls into a colon definition.

use crate::cell::{self, Cell, MemSize};
use crate::engine::{
    addr_to_cell, cell_to_addr, cell_to_i64, Addr, AbortCode, Engine, EngineResult, InputState,
    UV_COMPILING, UV_RSP,
};
use crate::internals::builtin::Prim;
use crate::internals::host::Host;

impl Engine {
    /// Runs compiled code starting at the current `ip` until the return
    /// stack unwinds to the top-level sentinel (`ip == 0`) or a primitive
    /// suspends. `input` is handed to the very first primitive dispatched
    /// this call (a suspended `KEY`/`TICK`/etc. resuming with new input);
    /// every later primitive in the same call sees `None`.
    pub(crate) fn run(&mut self, host: &mut dyn Host, mut input: Option<&str>) -> EngineResult<()> {
        while self.ip != 0 {
            let ip_org = self.ip;
            let (code, len) = self.dict_get_cell(self.ip)?;
            self.ip = self.ip.wrapping_add(len as Addr);
            let idx = cell_to_i64(code);
            let rsp = self.uservar_raw_get(UV_RSP) as usize;
            self.trace(host, &format!("\n {ip_org} {code} {}", "\u{250a}  ".repeat(rsp)));
            if idx >= 0 && (idx as usize) < Prim::COUNT {
                let prim = Prim::from_index(idx as usize).ok_or(AbortCode::InternalError)?;
                self.do_prim(host, prim, input)?;
                if self.input_state != InputState::Interpret {
                    self.ip = ip_org;
                    return Ok(());
                }
            } else {
                self.trace(host, &format!("{}/{code} ", code));
                self.pushr(host, addr_to_cell(self.ip))?;
                self.ip = cell_to_addr(code);
            }
            input = None;
        }
        Ok(())
    }

    /// Calls the word whose body starts at `addr`, running it to
    /// completion (or suspension). Pushes the top-level return sentinel
    /// first, so `EXIT` unwinds back to `ip == 0`.
    pub(crate) fn execute(&mut self, host: &mut dyn Host, addr: Addr) -> EngineResult<()> {
        self.ip = addr;
        self.uservar_raw_set(UV_RSP, 0);
        self.pushr(host, 0 as Cell)?;
        self.trace(host, &format!("\n[{addr}] "));
        self.run(host, None)
    }

    fn is_compiling(&self) -> EngineResult<bool> {
        Ok(self.uservar_get(UV_COMPILING)? != (0 as Cell))
    }

    fn advance_ip_cell(&mut self) -> EngineResult<Cell> {
        let (v, len) = self.dict_get_cell(self.ip)?;
        self.ip = self.ip.wrapping_add(len as Addr);
        Ok(v)
    }

    fn do_prim(&mut self, host: &mut dyn Host, prim: Prim, input: Option<&str>) -> EngineResult<()> {
        use Prim::*;
        match prim {
            Exit => {
                let ret = self.popr(host)?;
                self.ip = cell_to_addr(ret);
            }
            Lit => {
                let v = self.advance_ip_cell()?;
                self.push(host, v)?;
            }
            Col => match input {
                None => self.input_state = InputState::PassWord,
                Some(word) => {
                    self.create(host, word, 0)?;
                    self.uservar_set(UV_COMPILING, 1 as Cell)?;
                }
            },
            Semicol => {
                self.dict_add_cell(Exit.index() as i64 as Cell)?;
                self.uservar_set(UV_COMPILING, 0 as Cell)?;
            }
            Immediate => self.make_immediate()?,
            Literal => {
                if self.is_compiling()? {
                    let v = self.pop(host)?;
                    self.dict_add_lit(v)?;
                }
            }
            Jmp => {
                let target = self.advance_ip_cell()?;
                self.ip = cell_to_addr(target);
            }
            Jmp0 => {
                let target = self.advance_ip_cell()?;
                if self.pop(host)? == (0 as Cell) {
                    self.ip = cell_to_addr(target);
                }
            }
            Tick => {
                if self.is_compiling()? {
                    let v = self.advance_ip_cell()?;
                    self.push(host, v)?;
                } else {
                    match input {
                        None => self.input_state = InputState::PassWord,
                        Some(word) => match self.find(word)? {
                            Some((_, code)) => self.push(host, addr_to_cell(code))?,
                            None => return Err(AbortCode::NotAWord),
                        },
                    }
                }
            }
            Comment => match input {
                Some(s) if s.as_bytes().first() == Some(&b')') => {}
                _ => self.input_state = InputState::PassChar,
            },
            Comma => {
                let size_tag = self.pop(host)?;
                let v = self.pop(host)?;
                let size = MemSize::from_tag(cell_to_i64(size_tag)).ok_or(AbortCode::InvalidSize)?;
                self.dict_add_cell_typed(v, size)?;
            }
            Lits => {
                let len_cell = self.advance_ip_cell()?;
                self.push(host, addr_to_cell(self.ip))?;
                self.push(host, len_cell)?;
                self.ip = self.ip.wrapping_add(cell_to_addr(len_cell));
            }
            Dup => {
                let v = self.pick(0)?;
                self.push(host, v)?;
            }
            Drop => {
                self.pop(host)?;
            }
            Swap => {
                let a = self.pop(host)?;
                let b = self.pop(host)?;
                self.push(host, a)?;
                self.push(host, b)?;
            }
            Rot => {
                let c = self.pop(host)?;
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, b)?;
                self.push(host, c)?;
                self.push(host, a)?;
            }
            Pick => {
                let n = self.pop(host)?;
                let v = self.pick(cell_to_i64(n) as usize)?;
                self.push(host, v)?;
            }
            Pushr => {
                let v = self.pop(host)?;
                self.pushr(host, v)?;
            }
            Popr => {
                let v = self.popr(host)?;
                self.push(host, v)?;
            }
            Pickr => {
                let n = self.pop(host)?;
                let v = self.pickr(cell_to_i64(n) as usize)?;
                self.push(host, v)?;
            }
            Peek => {
                let size_tag = self.pop(host)?;
                let addr = cell_to_addr(self.pop(host)?);
                let size = MemSize::from_tag(cell_to_i64(size_tag)).ok_or(AbortCode::InvalidSize)?;
                let v = if (addr as usize) < crate::engine::USERVAR_COUNT {
                    addr_to_cell(self.uservar_raw_get(addr as crate::engine::UservarId))
                } else {
                    self.dict_get_cell_typed(addr, size)?.0
                };
                self.push(host, v)?;
            }
            Poke => {
                let size_tag = self.pop(host)?;
                let addr = cell_to_addr(self.pop(host)?);
                let v = self.pop(host)?;
                let size = MemSize::from_tag(cell_to_i64(size_tag)).ok_or(AbortCode::InvalidSize)?;
                if (addr as usize) < crate::engine::USERVAR_COUNT {
                    self.uservar_raw_set(addr, cell_to_addr(v));
                } else {
                    self.dict_put_cell_typed(addr, v, size)?;
                }
            }
            Len => {
                let size_tag = self.pop(host)?;
                let addr = cell_to_addr(self.pop(host)?);
                let size = MemSize::from_tag(cell_to_i64(size_tag)).ok_or(AbortCode::InvalidSize)?;
                let n = if (addr as usize) < crate::engine::USERVAR_COUNT {
                    1
                } else {
                    self.dict_cell_len(addr, size)?
                };
                self.push(host, n as i64 as Cell)?;
            }
            Add => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, a + b)?;
            }
            Sub => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, a - b)?;
            }
            Mul => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, a * b)?;
            }
            Div => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                if cell_to_i64(b) == 0 {
                    return Err(AbortCode::DivisionByZero);
                }
                self.push(host, a / b)?;
            }
            Mod => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                if cell_to_i64(b) == 0 {
                    return Err(AbortCode::DivisionByZero);
                }
                let ai = cell_to_i64(a);
                let bi = cell_to_i64(b);
                self.push(host, (ai % bi) as Cell)?;
            }
            Ltz => {
                let a = self.pop(host)?;
                self.push(host, if a < (0 as Cell) { cell::TRUE } else { cell::FALSE })?;
            }
            Equal => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, if a == b { cell::TRUE } else { cell::FALSE })?;
            }
            And => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, (cell_to_i64(a) & cell_to_i64(b)) as Cell)?;
            }
            Or => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, (cell_to_i64(a) | cell_to_i64(b)) as Cell)?;
            }
            Xor => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, (cell_to_i64(a) ^ cell_to_i64(b)) as Cell)?;
            }
            Shl => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, (cell_to_i64(a) << cell_to_i64(b)) as Cell)?;
            }
            Shr => {
                let b = self.pop(host)?;
                let a = self.pop(host)?;
                self.push(host, (cell_to_i64(a) >> cell_to_i64(b)) as Cell)?;
            }
            Sys => {
                let id = self.pop(host)?;
                let state = host.sys(self, cell_to_i64(id) as i32, input)?;
                self.input_state = state;
                if state != InputState::Interpret {
                    self.push(host, id)?;
                }
            }
            Key => match input {
                None => self.input_state = InputState::PassChar,
                Some(s) => {
                    let byte = s.as_bytes().first().copied().unwrap_or(0);
                    self.push(host, byte as i64 as Cell)?;
                }
            },
        }
        Ok(())
    }

    fn dict_add_lit(&mut self, v: Cell) -> EngineResult<()> {
        self.dict_add_cell(Prim::Lit.index() as i64 as Cell)?;
        self.dict_add_cell(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internals::console::NullHost;

    fn bootstrapped() -> Engine {
        let mut e = Engine::new();
        let mut host = NullHost;
        e.bootstrap(&mut host).unwrap();
        e
    }

    #[test]
    fn compiles_and_runs_simple_definition() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        assert_eq!(e.eval(&mut host, ": square dup * ;"), AbortCode::Ok);
        assert_eq!(e.eval(&mut host, "5 square"), AbortCode::Ok);
        assert_eq!(e.pop(&mut host).unwrap(), 25 as Cell);
    }

    #[test]
    fn arithmetic_primitives() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        assert_eq!(e.eval(&mut host, "7 3 - 2 *"), AbortCode::Ok);
        assert_eq!(e.pop(&mut host).unwrap(), 8 as Cell);
    }

    #[test]
    fn division_by_zero_aborts() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        assert_eq!(e.eval(&mut host, "1 0 /"), AbortCode::DivisionByZero);
    }

    #[test]
    fn dstack_underflow_resets_on_abort() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        assert_eq!(e.eval(&mut host, "dup"), AbortCode::DStackUnderrun);
        assert_eq!(e.dstack_len(), 0);
    }
}
