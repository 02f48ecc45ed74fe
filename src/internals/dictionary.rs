//! Word creation and lookup: the dictionary linked list threaded through
//! `Engine::dict` via the `LATEST` user variable.

use crate::cell::Cell;
use crate::engine::{
    addr_to_cell, cell_to_addr, Addr, AbortCode, Engine, EngineResult, FLAG_IMMEDIATE, FLAG_LEN_MASK,
    FLAG_PRIM, UV_LATEST,
};
use crate::internals::host::Host;

fn lenflags_byte(v: Cell) -> u8 {
    (v as i64) as u8
}

impl Engine {
    /// Appends a new word header at `HERE`: a length+flags cell, a link
    /// cell pointing at the previous `LATEST`, and the name bytes. Does
    /// not append a body; callers add that afterwards. Names longer than
    /// 31 bytes are truncated, matching the 5-bit length field.
    pub(crate) fn create(&mut self, host: &mut dyn Host, name: &str, flags: u8) -> EngineResult<()> {
        self.trace(host, &format!("\n=== create '{name}'"));
        let bytes = name.as_bytes();
        let bytes = if bytes.len() > FLAG_LEN_MASK as usize {
            &bytes[..FLAG_LEN_MASK as usize]
        } else {
            bytes
        };
        let word_addr = self.uservar_raw_get(crate::engine::UV_HERE);
        let old_latest = self.uservar_raw_get(UV_LATEST);
        let lenflags = (bytes.len() as u8) | flags;
        self.dict_add_cell(lenflags as i64 as Cell)?;
        self.dict_add_cell(addr_to_cell(old_latest))?;
        self.dict_add_bytes(bytes)?;
        self.uservar_raw_set(UV_LATEST, word_addr);
        self.trace(host, "\n===");
        Ok(())
    }

    /// Searches the dictionary for `name`, returning the word's header
    /// address and the address of its first body cell (immediately after
    /// the name bytes), or `None` if not found.
    pub(crate) fn find(&self, name: &str) -> EngineResult<Option<(Addr, Addr)>> {
        let needle = name.as_bytes();
        let mut w = self.uservar_raw_get(UV_LATEST);
        while w != 0 {
            let (lenflags, l1) = self.dict_get_cell(w)?;
            let mut p = w + l1 as Addr;
            let (link, l2) = self.dict_get_cell(p)?;
            p += l2 as Addr;
            let len = (lenflags_byte(lenflags) & FLAG_LEN_MASK) as usize;
            if len == needle.len() {
                let mut buf = [0u8; FLAG_LEN_MASK as usize];
                self.dict_get_bytes(p, &mut buf[..len])?;
                if &buf[..len] == needle {
                    return Ok(Some((w, p + len as Addr)));
                }
            }
            w = cell_to_addr(link);
        }
        Ok(None)
    }

    /// The length+flags byte of the word header at `addr`.
    pub(crate) fn word_flags(&self, addr: Addr) -> EngineResult<u8> {
        let (lf, _) = self.dict_get_cell(addr)?;
        Ok(lenflags_byte(lf))
    }

    pub(crate) fn is_prim(&self, addr: Addr) -> EngineResult<bool> {
        Ok(self.word_flags(addr)? & FLAG_PRIM != 0)
    }

    pub(crate) fn is_immediate(&self, addr: Addr) -> EngineResult<bool> {
        Ok(self.word_flags(addr)? & FLAG_IMMEDIATE != 0)
    }

    /// Sets the `IMMEDIATE` flag on the most recently created word.
    pub(crate) fn make_immediate(&mut self) -> EngineResult<()> {
        let w = self.uservar_raw_get(UV_LATEST);
        let (lf, _) = self.dict_get_cell(w)?;
        let byte = lenflags_byte(lf) | FLAG_IMMEDIATE;
        self.dict_put_cell(w, byte as i64 as Cell)
            .map(|_| ())
            .map_err(|_| AbortCode::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internals::console::NullHost;

    #[test]
    fn create_then_find_roundtrips() {
        let mut e = Engine::new();
        let mut host = NullHost;
        e.create(&mut host, "dup", FLAG_PRIM).unwrap();
        let (w, body) = e.find("dup").unwrap().expect("word should be found");
        assert!(body > w);
        assert!(e.is_prim(w).unwrap());
        assert!(!e.is_immediate(w).unwrap());
    }

    #[test]
    fn find_missing_word_returns_none() {
        let e = Engine::new();
        assert_eq!(e.find("nonexistent").unwrap(), None);
    }

    #[test]
    fn newer_definition_shadows_older() {
        let mut e = Engine::new();
        let mut host = NullHost;
        e.create(&mut host, "x", 0).unwrap();
        let (first, _) = e.find("x").unwrap().unwrap();
        e.create(&mut host, "x", 0).unwrap();
        let (second, _) = e.find("x").unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(e.uservar_raw_get(crate::engine::UV_LATEST), second);
    }

    #[test]
    fn make_immediate_flags_latest_word() {
        let mut e = Engine::new();
        let mut host = NullHost;
        e.create(&mut host, "postpone-me", 0).unwrap();
        e.make_immediate().unwrap();
        let (w, _) = e.find("postpone-me").unwrap().unwrap();
        assert!(e.is_immediate(w).unwrap());
    }
}
