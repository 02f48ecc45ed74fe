//! The primitive opcode set and the bootstrap that wires primitive names
//! and user variables into a fresh dictionary.

use crate::cell::Cell;
use crate::engine::{Addr, Engine, EngineResult, FLAG_PRIM};
use crate::internals::host::Host;

/// One entry per primitive opcode. Order only matters insofar as it must
/// stay in lock-step with `PRIM_NAMES`; it is not part of any persisted
/// format (compiled threaded code stores the index, which is only ever
/// re-read by the same build).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Prim {
    Exit,
    Lit,
    Col,
    Semicol,
    Immediate,
    Literal,
    Jmp,
    Jmp0,
    Tick,
    Comment,
    Comma,
    Lits,
    Dup,
    Drop,
    Swap,
    Rot,
    Pick,
    Pushr,
    Popr,
    Pickr,
    Peek,
    Poke,
    Len,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Ltz,
    Equal,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Sys,
    Key,
}

impl Prim {
    pub const COUNT: usize = 37;

    pub fn from_index(i: usize) -> Option<Prim> {
        use Prim::*;
        const TABLE: [Prim; Prim::COUNT] = [
            Exit, Lit, Col, Semicol, Immediate, Literal, Jmp, Jmp0, Tick, Comment, Comma, Lits, Dup,
            Drop, Swap, Rot, Pick, Pushr, Popr, Pickr, Peek, Poke, Len, Add, Sub, Mul, Div, Mod, Ltz,
            Equal, And, Or, Xor, Shl, Shr, Sys, Key,
        ];
        TABLE.get(i).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Names the outer interpreter compiles/executes against. A leading `_`
/// marks the primitive `IMMEDIATE`, stripped before the word is created;
/// this mirrors the naming convention in the original zForth word table.
pub const PRIM_NAMES: [&str; Prim::COUNT] = [
    "exit", "lit", ":", "_;", "_immediate", "_literal", "jmp", "jmp0", "'", "_(", ",,", "lits", "dup",
    "drop", "swap", "rot", "pick", ">r", "r>", "pickr", "@@", "!!", "##", "+", "-", "*", "/", "mod",
    "<0", "=", "&", "|", "^", "<<", ">>", "sys", "key",
];

pub const USERVAR_COUNT: usize = 7;
pub const USERVAR_NAMES: [&str; USERVAR_COUNT] =
    ["h", "latest", "trace", "compiling", "_postpone", "dsp", "rsp"];

impl Engine {
    /// Populates a freshly `init`ed engine with the primitive words and
    /// user variable words. Must be called before `eval` is used for
    /// anything beyond pushing literals.
    pub fn bootstrap(&mut self, host: &mut dyn Host) -> EngineResult<()> {
        for (i, name) in PRIM_NAMES.iter().enumerate() {
            self.add_prim(host, name, i)?;
        }
        for (i, name) in USERVAR_NAMES.iter().enumerate() {
            self.add_uservar(host, name, i as Addr)?;
        }
        Ok(())
    }

    fn add_prim(&mut self, host: &mut dyn Host, name: &str, op: usize) -> EngineResult<()> {
        let (name, immediate) = match name.strip_prefix('_') {
            Some(rest) => (rest, true),
            None => (name, false),
        };
        self.create(host, name, FLAG_PRIM)?;
        self.dict_add_cell(op as i64 as Cell)?;
        self.dict_add_cell(Prim::Exit.index() as i64 as Cell)?;
        if immediate {
            self.make_immediate()?;
        }
        Ok(())
    }

    fn add_uservar(&mut self, host: &mut dyn Host, name: &str, id: Addr) -> EngineResult<()> {
        self.create(host, name, 0)?;
        self.dict_add_cell(Prim::Lit.index() as i64 as Cell)?;
        self.dict_add_cell(id as i64 as Cell)?;
        self.dict_add_cell(Prim::Exit.index() as i64 as Cell)?;
        Ok(())
    }
}
