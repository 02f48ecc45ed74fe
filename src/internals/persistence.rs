//! Byte-for-byte dictionary snapshots. A saved image is only portable
//! across engines built with the same `Cell` feature and the same
//! `DICT_SIZE`/`Addr` width; none of that is recorded in the image itself.

use crate::engine::{Engine, DICT_SIZE};
use std::io::{self, Read, Write};

impl Engine {
    /// The live dictionary bytes, from offset 0 through `HERE`. Everything
    /// past `HERE` is unused and not worth persisting.
    pub fn dump(&self) -> &[u8] {
        let here = self.uservar_raw_get(crate::engine::UV_HERE) as usize;
        &self.dict[..here]
    }

    /// Writes `dump()` to `w`.
    pub fn save_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        w.write_all(self.dump())
    }

    /// Replaces the dictionary contents with bytes read from `r`. The
    /// engine must already be `init`ed; `HERE`/`LATEST`/etc. come back as
    /// part of the restored bytes, since the user variable overlay lives
    /// at the front of the dictionary.
    pub fn load_from<R: Read>(&mut self, mut r: R) -> io::Result<()> {
        let mut buf = Vec::new();
        r.read_to_end(&mut buf)?;
        if buf.len() > DICT_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "saved image larger than the dictionary",
            ));
        }
        self.dict = [0u8; DICT_SIZE];
        self.dict[..buf.len()].copy_from_slice(&buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_and_restore_preserves_here_and_words() {
        let mut e = Engine::new();
        let mut host = crate::internals::console::NullHost;
        e.bootstrap(&mut host).unwrap();
        e.eval(&mut host, ": square dup * ;");
        let here_before = e.uservar_get(crate::engine::UV_HERE).unwrap();

        let mut saved = Vec::new();
        e.save_to(&mut saved).unwrap();

        let mut restored = Engine::new();
        restored.load_from(&saved[..]).unwrap();

        assert_eq!(restored.uservar_get(crate::engine::UV_HERE).unwrap(), here_before);
        assert!(restored.find("square").unwrap().is_some());
    }
}
