#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tpc::{dump, CompileError};

#[derive(Debug)]
enum CliError {
    Compile(CompileError),
    Io(std::io::Error, &'static str, PathBuf),
    FunctionNotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Compile(err) => write!(f, "{}", err),
            CliError::Io(err, action, path) => write!(f, "{} \"{}\" failed: {}", action, path.display(), err),
            CliError::FunctionNotFound(name) => write!(f, "function {} not found", name),
        }
    }
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Compile(err) => err.exit_code(),
            CliError::Io(..) => 3,
            CliError::FunctionNotFound(_) => 3,
        }
    }
}

fn main() -> ExitCode {
    let matches = app_from_crate!()
        .about("Single-pass compiler from TPC source to x86-64 NASM assembly.")
        .arg(Arg::with_name("INPUT").help("Source file to read; standard input if omitted").index(1))
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("PATH")
                .default_value("_anonymous.asm")
                .help("Sets the NASM output file to write to"),
        )
        .arg(Arg::with_name("symtabs").short("s").long("symtabs").help("Print all table of symbol of the program"))
        .arg(Arg::with_name("all-functions").short("F").long("all-functions").help("Print the table of function of the program"))
        .arg(
            Arg::with_name("function-table")
                .short("f")
                .long("function-table")
                .takes_value(true)
                .value_name("NAME")
                .help("Print the table of symbol of a specific function"),
        )
        .arg(Arg::with_name("global-table").short("g").long("global-table").help("Print the table of symbol of the global variables"))
        .arg(Arg::with_name("tree").short("t").long("tree").help("Print the abstract tree created after the analysis of the program"))
        .get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(matches: &clap::ArgMatches<'_>) -> Result<(), CliError> {
    let source = read_source(matches.value_of("INPUT"))?;

    let show_all_tables = matches.is_present("symtabs");
    let show_all_functions = matches.is_present("all-functions");
    let show_globals = matches.is_present("global-table");
    let show_tree = matches.is_present("tree");
    let function_to_show = matches.value_of("function-table");

    let any_dump_requested = show_all_tables || show_all_functions || show_globals || show_tree || function_to_show.is_some();

    if any_dump_requested {
        let (root, program) = tpc::parse_and_build(&source).map_err(CliError::Compile)?;

        if show_tree {
            print!("{}", dump::dump_tree(&root));
        }
        if show_globals || show_all_tables {
            print!("{}", dump::dump_globals(&program));
        }
        if show_all_functions || show_all_tables {
            print!("{}", dump::dump_functions(&program));
        }
        if show_all_tables {
            for function in program.functions.iter() {
                if let Some(text) = dump::dump_one_function(&program, &function.id) {
                    print!("{}", text);
                }
            }
        }
        if let Some(name) = function_to_show {
            match dump::dump_one_function(&program, name) {
                Some(text) => print!("{}", text),
                None => return Err(CliError::FunctionNotFound(name.to_string())),
            }
        }
        return Ok(());
    }

    let asm = tpc::compile_source(&source).map_err(CliError::Compile)?;

    let output_path = PathBuf::from(matches.value_of("output").unwrap_or("_anonymous.asm"));
    fs::write(&output_path, asm).map_err(|err| CliError::Io(err, "writing output file", output_path))?;
    Ok(())
}

fn read_source(input: Option<&str>) -> Result<String, CliError> {
    match input {
        Some(path_str) => {
            let path = Path::new(path_str);
            fs::read_to_string(path).map_err(|err| CliError::Io(err, "reading input file", path.to_owned()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|err| CliError::Io(err, "reading standard input", PathBuf::from("<stdin>")))?;
            Ok(buf)
        }
    }
}
