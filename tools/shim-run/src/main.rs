//! shim-run - host harness for the POSIX runtime shim
//!
//! Builds an initial process stack from the command line, seeds the mock
//! kernel from a fixture, and runs the built-in `ls` through the same
//! bootstrap sequence a real process goes through.
//!
//! Usage:
//!   shim-run --fixture fixtures/demo.toml -e HOME=/root -- ls -l /srv

mod fixture;
mod program;

use std::ffi::CString;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shim_crt::{HookTable, ProcessImage};
use shim_posix::{Runtime, RuntimeConfig};

use crate::fixture::Fixture;

#[derive(Parser, Debug)]
#[command(name = "shim-run")]
#[command(about = "Run a program through the POSIX shim bootstrap against a mock kernel")]
struct Args {
    /// Mock kernel fixture (TOML)
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Environment entry (NAME=value), repeatable
    #[arg(short = 'e', long = "env")]
    env: Vec<String>,

    /// Do not print option scanner diagnostics
    #[arg(long)]
    quiet: bool,

    /// Program arguments, argv[0] first
    #[arg(last = true, required = true)]
    argv: Vec<String>,
}

/// Strings and words of a synthetic initial stack
struct InitialStack {
    _strings: Vec<CString>,
    words: Vec<usize>,
}

impl InitialStack {
    fn build(argv: &[String], env: &[String]) -> Result<Self> {
        let strings = argv
            .iter()
            .chain(env)
            .map(|s| CString::new(s.as_str()).with_context(|| format!("NUL byte in {:?}", s)))
            .collect::<Result<Vec<_>>>()?;
        let ptrs: Vec<usize> = strings.iter().map(|s| s.as_ptr() as usize).collect();

        let mut words = Vec::with_capacity(ptrs.len() + 3);
        words.push(argv.len());
        words.extend_from_slice(&ptrs[..argv.len()]);
        words.push(0);
        words.extend_from_slice(&ptrs[argv.len()..]);
        words.push(0);

        Ok(Self {
            _strings: strings,
            words,
        })
    }

    fn image(&self) -> Result<ProcessImage<'_>> {
        // SAFETY: every string word points into `_strings`, which lives as
        // long as `self`.
        let image = unsafe { ProcessImage::from_words(&self.words) }?;
        Ok(image)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let fixture = match &args.fixture {
        Some(path) => Fixture::load(path)?,
        None => Fixture::default(),
    };
    let kernel = fixture.build_kernel();
    log::info!(
        "Mock kernel: pid {}, {} directories, {} ready descriptors",
        kernel.pid(),
        fixture.directories.len(),
        fixture.ready.len()
    );

    let stack = InitialStack::build(&args.argv, &args.env)?;
    let image = stack.image()?;

    let config = RuntimeConfig {
        opterr: !args.quiet,
        ..RuntimeConfig::default()
    };
    let mut rt = Runtime::with_config(kernel, config);
    let status = shim_crt::run(
        &mut rt,
        &image,
        &HookTable::empty(),
        &HookTable::empty(),
        program::ls,
    );
    rt.exit(status);

    let kernel = rt.kernel_mut();
    std::io::stdout()
        .write_all(&kernel.take_output(1))
        .context("Failed to write program stdout")?;
    std::io::stderr()
        .write_all(&kernel.take_output(2))
        .context("Failed to write program stderr")?;

    let status = kernel.exit_status().unwrap_or(status);
    log::info!("Program exited with status {}", status);
    std::process::exit(status);
}
