use std::io::ErrorKind;
use std::process;

use clap::Parser;
use cli::{Args, Command};
use error::{ClaimsetError, ClaimsetResult};

mod cli;
mod combiner;
mod commands;
mod config;
mod error;
mod extract;
mod label;
mod normalized;
mod normalizer;
mod prelude;
mod progress;
mod project;
mod prompt;
mod raw;
mod review;
mod review_log;

fn init_logger() {
    let env = env_logger::Env::new()
        .filter_or("CLAIMSET_LOG", "info")
        .write_style("CLAIMSET_LOG_STYLE");

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(args: Args) -> ClaimsetResult<()> {
    match args.cmd {
        Command::Combine(cmd) => cmd.execute(),
        Command::Completions(cmd) => cmd.execute(),
        Command::Config(cmd) => cmd.execute(),
        Command::Init(cmd) => cmd.execute(),
        Command::Normalize(cmd) => cmd.execute(),
        Command::Status(cmd) => cmd.execute(),
        Command::Version(cmd) => cmd.execute(),
    }
}

fn main() {
    let args = Args::parse();
    init_logger();

    match run(args) {
        Ok(()) => process::exit(0),
        Err(ClaimsetError::IO(e))
            if e.kind() == ErrorKind::BrokenPipe =>
        {
            process::exit(0)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
