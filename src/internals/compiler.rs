//! The outer (text) interpreter: tokenizes an input line character by
//! character and decides, per word, whether to compile, execute, or fall
//! back to number parsing.

use crate::cell::Cell;
use crate::engine::{
    addr_to_cell, AbortCode, Engine, EngineResult, InputState, FLAG_IMMEDIATE, FLAG_PRIM,
    UV_COMPILING, UV_DSP, UV_POSTPONE, UV_RSP,
};
use crate::internals::host::Host;

impl Engine {
    /// Feeds `buf` to the interpreter followed by a terminating NUL, the
    /// same way a line read from a terminal or file would be. Returns
    /// `AbortCode::Ok` on success; on failure, the data stack, return
    /// stack, and `COMPILING` flag are reset before returning the reason.
    pub fn eval(&mut self, host: &mut dyn Host, buf: &str) -> AbortCode {
        for &b in buf.as_bytes() {
            if let Err(code) = self.handle_char(host, b) {
                self.recover();
                return code;
            }
        }
        if let Err(code) = self.handle_char(host, 0) {
            self.recover();
            return code;
        }
        AbortCode::Ok
    }

    fn recover(&mut self) {
        self.uservar_raw_set(UV_COMPILING, 0);
        self.uservar_raw_set(UV_DSP, 0);
        self.uservar_raw_set(UV_RSP, 0);
    }

    fn handle_char(&mut self, host: &mut dyn Host, c: u8) -> EngineResult<()> {
        if self.input_state == InputState::PassChar {
            self.input_state = InputState::Interpret;
            let s = (c as char).to_string();
            return self.run(host, Some(&s));
        }
        if c == 0 || (c as char).is_ascii_whitespace() {
            if self.read_len > 0 {
                let word =
                    std::str::from_utf8(&self.read_buf[..self.read_len]).unwrap_or("").to_string();
                self.read_len = 0;
                self.handle_word(host, &word)?;
            }
        } else if self.read_len < self.read_buf.len() {
            self.read_buf[self.read_len] = c;
            self.read_len += 1;
        }
        Ok(())
    }

    fn handle_word(&mut self, host: &mut dyn Host, word: &str) -> EngineResult<()> {
        if self.input_state == InputState::PassWord {
            self.input_state = InputState::Interpret;
            return self.run(host, Some(word));
        }

        if let Some((w, code)) = self.find(word)? {
            let flags = self.word_flags(w)?;
            let compiling = self.uservar_get(UV_COMPILING)? != (0 as Cell);
            let postpone = self.uservar_get(UV_POSTPONE)? != (0 as Cell);
            let immediate = flags & FLAG_IMMEDIATE != 0;

            if compiling && (postpone || !immediate) {
                if flags & FLAG_PRIM != 0 {
                    let (op, _) = self.dict_get_cell(code)?;
                    self.dict_add_cell(op)?;
                } else {
                    self.dict_add_cell(addr_to_cell(code))?;
                }
            } else {
                self.execute(host, code)?;
            }
            self.uservar_set(UV_POSTPONE, 0 as Cell)?;
        } else {
            let v = host.parse_num(self, word)?;
            if self.uservar_get(UV_COMPILING)? != (0 as Cell) {
                self.dict_add_cell(crate::internals::builtin::Prim::Lit.index() as i64 as Cell)?;
                self.dict_add_cell(v)?;
            } else {
                self.push(host, v)?;
            }
        }
        Ok(())
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
    fn interprets_bare_numbers() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        assert_eq!(e.eval(&mut host, "1 2 3"), AbortCode::Ok);
        assert_eq!(e.dstack_len(), 3);
    }

    #[test]
    fn unknown_word_and_bad_number_aborts() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        assert_eq!(e.eval(&mut host, "not-a-word-or-number"), AbortCode::NotAWord);
    }

    #[test]
    fn immediate_word_runs_even_while_compiling() {
        let mut e = bootstrapped();
        let mut host = NullHost;
        // `;` is immediate: defining an empty word must not get stuck in
        // compile mode.
        assert_eq!(e.eval(&mut host, ": noop ;"), AbortCode::Ok);
        assert_eq!(e.uservar_get(UV_COMPILING).unwrap(), 0 as Cell);
    }
}
