mod args;
mod bytecode;

use args::Mode;
use compiler::chunk::FuncProto;
use compiler::Compiler;
use lexer::Lexer;
use parser::Parser;
use path_absolutize::Absolutize;
use rustyline::Editor;
use std::{fs, path::Path, path::PathBuf, process::exit};
use vm::Vm;

fn main() {
    use Mode::*;

    let mode = Mode::try_from(std::env::args()).unwrap_or_else(|err| {
        eprintln!("{err}");
        exit(exitcode::USAGE);
    });

    match mode {
        Version => println!("سيكب {}", env!("CARGO_PKG_VERSION")),
        Help => print!("{}", include_str!("../help.md")),
        Repl => run_repl(),
        File { path, disassemble } => {
            let source = read_source(&path);
            let proto = compile_source(&source).unwrap_or_else(|_| exit(exitcode::DATAERR));
            if disassemble {
                print!("{}", proto.chunk.disassemble(&path.display().to_string()));
            } else {
                run_proto(proto);
            }
        }
        Compile { path, output } => {
            let source = read_source(&path);
            let proto = compile_source(&source).unwrap_or_else(|_| exit(exitcode::DATAERR));
            if let Err(err) = bytecode::save(&proto.chunk, &output) {
                eprintln!("{err}");
                exit(exitcode::CANTCREAT);
            }
        }
        RunBytecode { path } => {
            let proto = bytecode::load(Path::new(&path)).unwrap_or_else(|err| {
                eprintln!("{err}");
                exit(exitcode::DATAERR);
            });
            run_proto(proto);
        }
    }
}

fn read_source(path: &PathBuf) -> String {
    let path = path
        .absolutize()
        .map(|absolute| absolute.to_path_buf())
        .unwrap_or_else(|_| path.clone());
    fs::read_to_string(&path).unwrap_or_else(|err| {
        eprintln!("خطأ في قراءة الملف {}: {err}", path.display());
        exit(exitcode::IOERR);
    })
}

fn compile_source(source: &str) -> Result<FuncProto, ()> {
    let tokens = Lexer::new(source).tokenize().map_err(|errors| {
        for error in errors {
            eprintln!("{error}");
        }
    })?;
    let ast = Parser::new(tokens).parse().map_err(|errors| {
        for error in errors {
            eprintln!("{error}");
        }
    })?;
    Compiler::new(&ast).compile().map_err(|errors| {
        for error in errors {
            eprintln!("{error}");
        }
    })
}

fn run_proto(proto: FuncProto) {
    let mut vm = Vm::new();
    if let Err(err) = vm.run(proto) {
        eprint!("{err}");
        exit(exitcode::DATAERR);
    }
}

fn run_repl() {
    let mut vm = Vm::new();
    let mut rl = Editor::<()>::new();
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                rl.add_history_entry(&line);
                if let Ok(proto) = compile_source(&line) {
                    if let Err(err) = vm.run(proto) {
                        eprint!("{err}");
                    }
                }
            }
            Err(_) => break,
        }
    }
}
