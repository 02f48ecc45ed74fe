//! End-to-end scenarios and boundary behaviors from the engine's testable
//! properties: a fresh `Engine`, `bootstrap`ed and loaded with the shipped
//! `prelude/core.zf`, driven through `eval` the way a real host would.

use zf::engine::{DICT_SIZE, UV_RSP};
use zf::{AbortCode, Cell, Engine, EngineResult, Host, InputState, SYSCALL_EMIT, SYSCALL_PRINT, SYSCALL_TELL};

const PRELUDE: &str = include_str!("../prelude/core.zf");

/// Records `PRINT`/`EMIT`/`TELL` output instead of touching stdout, so
/// assertions can inspect exactly what the engine handed to the host.
#[derive(Default)]
struct TestHost {
    printed: Vec<Cell>,
    emitted: Vec<u8>,
    told: Vec<u8>,
}

impl Host for TestHost {
    fn sys(&mut self, engine: &mut Engine, id: i32, _word: Option<&str>) -> EngineResult<InputState> {
        match id {
            SYSCALL_EMIT => {
                let c = engine.pop(self)?;
                self.emitted.push(c as i64 as u8);
                Ok(InputState::Interpret)
            }
            SYSCALL_PRINT => {
                let v = engine.pop(self)?;
                self.printed.push(v);
                Ok(InputState::Interpret)
            }
            SYSCALL_TELL => {
                let len = engine.pop(self)?;
                let addr = engine.pop(self)?;
                let len = len as i64 as usize;
                let addr = addr as i64 as usize;
                if addr + len > DICT_SIZE {
                    return engine.abort(AbortCode::OutsideMem);
                }
                let bytes = engine.dump();
                self.told.extend_from_slice(&bytes[addr..addr + len]);
                Ok(InputState::Interpret)
            }
            _ => engine.abort(AbortCode::NotAWord),
        }
    }

    fn parse_num(&mut self, _engine: &mut Engine, text: &str) -> EngineResult<Cell> {
        text.parse::<Cell>().map_err(|_| AbortCode::NotAWord)
    }

    fn trace(&mut self, _engine: &Engine, _text: &str) {}
}

fn setup() -> (Engine, TestHost) {
    let mut e = Engine::new();
    let mut h = TestHost::default();
    e.bootstrap(&mut h).unwrap();
    assert_eq!(e.eval(&mut h, PRELUDE), AbortCode::Ok);
    (e, h)
}

#[test]
fn scenario_addition_prints_and_empties_stack() {
    let (mut e, mut h) = setup();
    assert_eq!(e.eval(&mut h, "1 2 + ."), AbortCode::Ok);
    assert_eq!(h.printed, vec![3 as Cell]);
    assert_eq!(e.dstack_len(), 0);
}

#[test]
fn scenario_square_definition() {
    let (mut e, mut h) = setup();
    assert_eq!(e.eval(&mut h, ": sq dup * ; 5 sq ."), AbortCode::Ok);
    assert_eq!(h.printed, vec![25 as Cell]);
}

#[test]
fn scenario_factorial_with_if_else_then() {
    let (mut e, mut h) = setup();
    let src = ": fact dup 1 = if drop 1 else dup 1 - fact * then ; 5 fact .";
    assert_eq!(e.eval(&mut h, src), AbortCode::Ok);
    assert_eq!(h.printed, vec![120 as Cell]);
}

#[test]
fn scenario_division_by_zero_then_recovers() {
    let (mut e, mut h) = setup();
    assert_eq!(e.eval(&mut h, "1 0 /"), AbortCode::DivisionByZero);
    assert_eq!(e.eval(&mut h, "7 ."), AbortCode::Ok);
    assert_eq!(h.printed, vec![7 as Cell]);
}

#[test]
fn scenario_colon_definition_leaves_stack_bottom_to_top() {
    let (mut e, mut h) = setup();
    assert_eq!(e.eval(&mut h, ": x 1 2 3 ; x"), AbortCode::Ok);
    assert_eq!(e.dstack_len(), 3);
    assert_eq!(e.pick(2).unwrap(), 1 as Cell);
    assert_eq!(e.pick(1).unwrap(), 2 as Cell);
    assert_eq!(e.pick(0).unwrap(), 3 as Cell);
}

#[test]
fn scenario_return_stack_roundtrip() {
    let (mut e, mut h) = setup();
    assert_eq!(e.eval(&mut h, "10 >r 20 r>"), AbortCode::Ok);
    assert_eq!(e.dstack_len(), 2);
    assert_eq!(e.pick(1).unwrap(), 10 as Cell);
    assert_eq!(e.pick(0).unwrap(), 20 as Cell);
    assert_eq!(e.uservar_get(UV_RSP).unwrap(), 0 as Cell);
}

#[test]
fn invariants_hold_after_every_eval() {
    let (mut e, mut h) = setup();
    for src in [": sq dup * ; 5 sq .", "1 0 /", "7 ."] {
        e.eval(&mut h, src);
        assert!(e.dstack_len() <= zf::engine::DSTACK_SIZE);
        assert_eq!(e.uservar_get(zf::engine::UV_COMPILING).unwrap(), 0 as Cell);
    }
}

#[test]
fn dstack_overrun_recovers_after_fresh_eval() {
    let (mut e, mut h) = setup();
    let mut src = String::new();
    for _ in 0..(zf::engine::DSTACK_SIZE + 1) {
        src.push_str("1 ");
    }
    assert_eq!(e.eval(&mut h, &src), AbortCode::DStackOverrun);
    assert_eq!(e.dstack_len(), 0);
    assert_eq!(e.eval(&mut h, "42"), AbortCode::Ok);
    assert_eq!(e.dstack_len(), 1);
}

#[test]
fn poke_past_dict_end_with_multibyte_size_is_outside_mem() {
    let (mut e, mut h) = setup();
    // size tag 4 = U32, four bytes starting at DICT_SIZE - 1 overruns by 3.
    let src = format!("0 {} 4 !!", DICT_SIZE - 1);
    assert_eq!(e.eval(&mut h, &src), AbortCode::OutsideMem);
}

#[test]
fn tell_bounds_checks_addr_plus_len() {
    let (mut e, mut h) = setup();
    let src = format!("{} 1 tell", DICT_SIZE);
    assert_eq!(e.eval(&mut h, &src), AbortCode::OutsideMem);
}
