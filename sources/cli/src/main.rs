use std::{io, process::exit};

use anyhow::{Context, Result};
use args::{Cli, USAGE};
use clap::{error::ErrorKind, Parser};
use parse::loader::ClassLocator;
use tracing::{error, info, Level};
use tracing_subscriber::fmt;
use trace::DriveOptions;

mod args;

fn run(args: &Cli) -> Result<()> {
    let mut locator = ClassLocator::new();
    if args.classpath.is_empty() {
        locator.add_path(".");
    }

    for cp in &args.classpath {
        locator.add_path(cp);
    }

    let class = locator
        .for_identifier(&args.class)
        .with_context(|| format!("could not load {}", args.class))?;

    let options = DriveOptions {
        skip_debug: !args.debug,
    };

    trace::render(&class, io::stdout().lock(), &options)
        .with_context(|| format!("could not render {}", args.class))?;

    Ok(())
}

fn main() {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            eprintln!("{USAGE}");
            exit(1);
        }
    };

    let format = fmt::format()
        .with_ansi(false)
        .without_time()
        .with_level(true)
        .with_target(false)
        .with_thread_names(false)
        .with_source_location(args.verbose)
        .compact();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::TRACE } else { Level::WARN })
        .event_format(format)
        .with_writer(io::stderr)
        .init();

    info!("Printing {}", args.class);

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        exit(1);
    }
}
