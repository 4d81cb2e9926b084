//! Stack VM - CLI
//!
//! Command-line front end: compiles source files to bytecode blobs, runs
//! source or compiled blobs, and prints instruction listings.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};

use svm_core::{compile_with, disassemble, BytecodeLoader, Instruction, SvmConfig, VirtualMachine};

/// What to do with the input once it is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Compile to a file
    Compile,
    /// Compile and write the blob to stdout
    Stdout,
    /// Compile and execute
    Execute,
    /// Execute an already compiled blob
    Run,
}

/// Bytecode ready to write or run, with its listing when already decoded
struct Program {
    bytecode: Vec<u8>,
    listing: Option<Vec<(usize, Instruction)>>,
}

impl Program {
    fn from_source(source: &str, config: &SvmConfig) -> Result<Self> {
        Ok(Program {
            bytecode: compile_with(source, config)?,
            listing: None,
        })
    }

    /// A blob from disk is validated by the loader, which decodes it fully
    fn from_blob(bytes: &[u8]) -> Result<Self> {
        let loaded = BytecodeLoader::load(bytes)?;
        Ok(Program {
            bytecode: loaded.instructions,
            listing: Some(loaded.listing),
        })
    }

    fn listing(&mut self) -> Result<&[(usize, Instruction)]> {
        let listing = match self.listing.take() {
            Some(listing) => listing,
            None => disassemble(&self.bytecode)?,
        };
        Ok(self.listing.insert(listing))
    }
}

#[derive(Debug)]
struct Options {
    mode: Mode,
    disassemble: bool,
    input: PathBuf,
    output: Option<PathBuf>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("svm");

    let options = match parse_args(args.get(1..).unwrap_or(&[])) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage(program);
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Returns `Ok(None)` when help was requested
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut mode = Mode::Compile;
    let mut disassemble = false;
    let mut output = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" => mode = Mode::Stdout,
            "-e" => mode = Mode::Execute,
            "--run" => mode = Mode::Run,
            "--disassemble" => disassemble = true,
            "-o" => {
                let path = iter.next().context("-o requires a file name")?;
                output = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option '{}'", flag),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let input = positional.next().context("missing input file")?;
    if let Some(extra) = positional.next() {
        if output.is_some() {
            bail!("output given twice ('-o' and '{}')", extra.display());
        }
        output = Some(extra);
    }
    if let Some(extra) = positional.next() {
        bail!("unexpected argument '{}'", extra.display());
    }

    Ok(Some(Options {
        mode,
        disassemble,
        input,
        output,
    }))
}

fn run(options: &Options) -> Result<()> {
    let config = SvmConfig::default();
    let input = options.input.display();

    let mut program = if options.mode == Mode::Run {
        let bytes = fs::read(&options.input)
            .with_context(|| format!("failed to read bytecode file '{}'", input))?;
        Program::from_blob(&bytes).with_context(|| format!("invalid bytecode in '{}'", input))?
    } else {
        let source = fs::read_to_string(&options.input)
            .with_context(|| format!("failed to read source file '{}'", input))?;
        Program::from_source(&source, &config)
            .with_context(|| format!("failed to compile '{}'", input))?
    };

    if options.disassemble {
        let listing = program.listing().context("failed to disassemble")?;
        print_listing(listing)?;
        return Ok(());
    }

    let bytecode = program.bytecode;

    match options.mode {
        Mode::Compile => {
            let target = options
                .output
                .clone()
                .unwrap_or_else(|| default_output(&options.input));
            fs::write(&target, &bytecode)
                .with_context(|| format!("failed to write '{}'", target.display()))?;
            println!("compiled {} -> {}", input, target.display());
        }
        Mode::Stdout => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(&bytecode)?;
            out.flush()?;
        }
        Mode::Execute | Mode::Run => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let mut vm = VirtualMachine::new(config, bytecode);
            vm.execute(&mut out).context("runtime error")?;
        }
    }

    Ok(())
}

/// `dir/name.src` becomes `dir/name.bin`
fn default_output(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

fn print_listing(listing: &[(usize, Instruction)]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (offset, instruction) in listing {
        writeln!(out, "{:04}  {}", offset, instruction)?;
    }
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!("Stack VM compiler and runner");
    eprintln!("Usage: {} [options] <input> [output]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o <file>        write compiled bytecode to <file> (default: <input>.bin)");
    eprintln!("  -c               write compiled bytecode to stdout");
    eprintln!("  -e               compile and execute <input>");
    eprintln!("  --run            execute <input> as a compiled bytecode blob");
    eprintln!("  --disassemble    print the instruction listing instead of running");
    eprintln!("  -h, --help       show this help");
}
