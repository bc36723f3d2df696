use clap::Parser as ClapParser;
use std::{fs, process};

use vm::interpreter::DEFAULT_MAX_CALL_DEPTH;
use vm::{Interpreter, InterpreterSettings, Runtime, RuntimeCreateInfo};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source files, each compiled and run on its own
    #[arg(required = true, help = "The source files to run")]
    files: Vec<String>,

    /// Print the generated module before running it
    #[arg(long, help = "Print the generated IR")]
    emit_ir: bool,

    /// Stop after code generation
    #[arg(long, help = "Compile only, do not run")]
    no_run: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH, help = "Maximum call depth")]
    max_call_depth: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    for filename in &cli.files {
        let source_code = match fs::read_to_string(filename) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Error reading file '{}': {}", filename, err);
                process::exit(1);
            }
        };

        let compiled = match vm::compile_source(filename, &source_code) {
            Ok(compiled) => compiled,
            Err(err) => {
                eprintln!("Error compiling {}: {}", filename, err);
                process::exit(1);
            }
        };
        for diagnostic in &compiled.diagnostics {
            eprintln!("warning: {}: {}", filename, diagnostic);
        }

        if cli.emit_ir {
            println!("== {} ==", filename);
            print!("{}", compiled.module);
        }
        if cli.no_run {
            continue;
        }

        let runtime = Runtime::new(RuntimeCreateInfo::default());
        let settings = InterpreterSettings {
            max_call_depth: cli.max_call_depth,
        };
        let mut interpreter = Interpreter::new(runtime, settings);
        if let Err(err) = interpreter.run(&compiled.module) {
            eprintln!("Error executing {}: {}", filename, err);
            process::exit(1);
        }
    }
}
