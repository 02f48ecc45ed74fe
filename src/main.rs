//! The `zf` binary: a REPL front-end over the `zf` library, reading lines
//! from stdin (or a `-f` script), evaluating them against an `Engine`, and
//! reporting abort codes in the original C host's `src:line: mnemonic`
//! style.

use std::fs::File;
use std::io::{self, BufRead, Write};

use zf::config::Config;
use zf::internals::console::ConsoleHost;
use zf::messages::Msg;
use zf::{AbortCode, Engine};

fn level_filter(level: zf::messages::DebugLevel) -> log::LevelFilter {
    use zf::messages::DebugLevel::*;
    match level {
        Error => log::LevelFilter::Error,
        Warning => log::LevelFilter::Warn,
        Info => log::LevelFilter::Info,
        Debug => log::LevelFilter::Debug,
    }
}

/// Evaluates `buf` and reports an abort, mirroring the original Linux
/// host's `do_eval`: a red `src:line: mnemonic` line on stderr, nothing on
/// success.
fn do_eval(engine: &mut Engine, host: &mut ConsoleHost, src: &str, line: usize, buf: &str) -> AbortCode {
    let rv = engine.eval(host, buf);
    if rv != AbortCode::Ok {
        eprintln!("\x1b[31m{src}:{line}: {rv}\x1b[0m");
    }
    rv
}

fn save_dict(engine: &Engine, path: &str) {
    match File::create(path).and_then(|f| engine.save_to(f)) {
        Ok(()) => {}
        Err(e) => eprintln!("error saving '{path}': {e}"),
    }
}

fn main() {
    let config = Config::parse();

    env_logger::Builder::new().filter_level(level_filter(config.debug_level())).init();

    let mut msg = Msg::new();
    msg.set_level(config.debug_level());

    let mut engine = Engine::new();
    if config.trace {
        engine.init(true);
    }

    let mut host = ConsoleHost::new(msg);

    match &config.load {
        Some(path) => match File::open(path) {
            Ok(f) => {
                if let Err(e) = engine.load_from(f) {
                    eprintln!("error loading '{path}': {e}");
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("error opening '{path}': {e}");
                std::process::exit(1);
            }
        },
        None => {
            if let Err(code) = engine.bootstrap(&mut host) {
                eprintln!("bootstrap failed: {code}");
                std::process::exit(1);
            }
        }
    }

    // `bye` and `include-file` are host-level words: the engine only knows
    // about the `sys` primitive, so the REPL wires the names up once at
    // startup, the same way the original C host's word table did it
    // outside the core zforth.c file.
    engine.eval(&mut host, &format!(": bye {} sys ;", zf::internals::console::SYSCALL_BYE));
    engine.eval(&mut host, &format!(": include-file {} sys ;", zf::internals::console::SYSCALL_INCLUDE));

    if let Some(path) = &config.file {
        let code = host.include_file(&mut engine, path);
        if let Some(save) = &config.save {
            save_dict(&engine, save);
        }
        std::process::exit(if code.is_ok() { 0 } else { 1 });
    }

    let here = engine.uservar_get(zf::engine::UV_HERE).unwrap_or(0 as zf::Cell);
    println!("Welcome to zf, {here} bytes used");

    let stdin = io::stdin();
    let mut line_no = 0usize;
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        line_no += 1;
        do_eval(&mut engine, &mut host, "stdin", line_no, &line);
        println!();
        let _ = io::stdout().flush();
        if host.bye_requested() {
            break;
        }
    }

    if let Some(path) = &config.save {
        save_dict(&engine, path);
    }
}
