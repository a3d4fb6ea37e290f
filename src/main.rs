use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;

use ls8::{Cpu, Program};

#[derive(Parser, Debug)]
#[command(name = "ls8", version, about = "Emulator for the LS-8 8 bit computer")]
struct Cli {
    /// Program to run, one base-2 byte per line, `#` starts a comment
    program: Option<PathBuf>,
    /// Log the machine state before every instruction
    #[arg(short, long)]
    trace: bool,
    /// Only log errors
    #[arg(short, long, conflicts_with = "trace")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.trace {
            LevelFilter::Trace
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let cli = Cli::parse();
    SimpleLogger::new()
        .with_level(cli.log_level())
        .init()
        .map_err(|err| eyre!("Failed to set up logging: {}", err))?;

    let path = match cli.program {
        Some(path) => path,
        None => {
            println!("Error: no program given. Pass a program file as the first argument, e.g. `ls8 programs/print8.ls8`");
            return Ok(());
        }
    };

    let program = match Program::from_file(&path) {
        Ok(program) => program,
        Err(err) => {
            error!("{}", err);
            process::exit(err.exit_code());
        }
    };

    let mut cpu = Cpu::new();
    cpu.load(program.bytes())
        .wrap_err_with(|| format!("Failed to load `{}`", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cpu.run(&mut out)?;

    Ok(())
}
