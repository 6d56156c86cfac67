mod cli;
mod codegen;
mod driver;
mod error;
mod syntax;

use std::{
    fs,
    path::{Path, PathBuf},
    process,
    time::Instant,
};

use clap::Parser as _;
use cli::{Cli, Command, OutputFormat};
use codegen::Compiler;
use driver::{Driver, TopLevel};
use syntax::FunctionDef;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let ok = match cli.command {
        Command::Parse { file } => parse(&file),
        Command::Compile {
            file,
            output,
            format,
        } => compile(&file, output, format),
    };

    if !ok {
        process::exit(1);
    }
}

fn read_src(file_path: &Path) -> String {
    if !file_path.exists() {
        eprintln!("File {file_path:?} does not exist");
        process::exit(1);
    }

    match fs::read_to_string(file_path) {
        Ok(src) => src,
        Err(why) => {
            eprintln!("Failed to read {file_path:?}: {why}");
            process::exit(1);
        }
    }
}

/// Collects the parsed units. Errors have already been logged by the driver.
fn parse_units<'src>(src: &'src str) -> (Vec<FunctionDef<'src>>, usize) {
    let mut defs = vec![];
    let mut errors = 0;

    let mut driver = Driver::new(src);
    for item in driver.by_ref() {
        match item {
            TopLevel::Definition(def) | TopLevel::Expression(def) => defs.push(def),
            TopLevel::Error(_) => errors += 1,
        }
    }
    log::debug!("Operator precedences: {:?}", driver.precedence_table());

    (defs, errors)
}

fn parse(file_path: &Path) -> bool {
    let src = read_src(file_path);
    let (defs, errors) = parse_units(&src);

    for def in &defs {
        println!("{def:#?}");
    }

    log::info!("Parsed {} unit(s), {errors} error(s)", defs.len());
    errors == 0
}

fn compile(file_path: &Path, output: Option<PathBuf>, format: OutputFormat) -> bool {
    let src = read_src(file_path);
    let now = Instant::now();

    let (defs, errors) = parse_units(&src);
    if errors != 0 {
        log::error!("Aborting compilation due to {errors} previous error(s)");
        return false;
    }

    let bytes = match Compiler::new().compile(&defs) {
        Ok(bytes) => bytes,
        Err(why) => {
            log::error!("{why}");
            return false;
        }
    };

    let output = output.unwrap_or_else(|| file_path.with_extension(format.extension()));
    let written = match format {
        OutputFormat::Wasm => fs::write(&output, bytes),
        OutputFormat::Wat => match wasmprinter::print_bytes(&bytes) {
            Ok(wat) => fs::write(&output, wat),
            Err(why) => {
                log::error!("Failed to print module: {why}");
                return false;
            }
        },
    };

    if let Err(why) = written {
        log::error!("Failed to write {output:?}: {why}");
        return false;
    }

    let duration = now.elapsed();
    log::info!("Compiled {file_path:?} to {output:?} in {duration:.2?}");
    true
}
