use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gem_prepare::config;
use gem_prepare::process::SystemRunner;
use gem_prepare::ui::{self, ConsoleLogger, Logger};
use gem_prepare::verify::verify_conditions;
use gem_prepare::{prepare, Context, NextRelease};

#[derive(clap::Parser)]
#[command(
    name = "gem-prepare",
    about = "Write the release version, update Gemfile.lock and build the gem"
)]
struct Args {
    #[arg(short, long, help = "Version being released (e.g. 2.0.0-rc.1)")]
    next_version: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short = 'C', long, default_value = ".", help = "Working directory of the gem")]
    cwd: PathBuf,

    #[arg(long, help = "Skip the pre-flight checks")]
    skip_verify: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("gem-prepare {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let logger = ConsoleLogger;

    let Some(next_version) = args.next_version else {
        logger.error("--next-version is required");
        std::process::exit(1);
    };
    let release = NextRelease::new(next_version);

    let config = match config::load_config(args.config.as_deref(), &args.cwd) {
        Ok(cfg) => cfg,
        Err(e) => {
            logger.error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    // Subprocesses inherit the process environment, so ctx.env stays empty
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut ctx = Context::new(&args.cwd, &logger, &mut stdout, &mut stderr);

    if !args.skip_verify {
        if let Err(e) = verify_conditions(&config, &release, &ctx) {
            logger.error(&e.to_string());
            std::process::exit(1);
        }
    }

    let result = match prepare(&config, &release, &mut ctx, &SystemRunner) {
        Ok(result) => result,
        Err(e) => {
            logger.error(&format!("Prepare failed: {}", e));
            std::process::exit(1);
        }
    };

    logger.success(&ui::format_prepared(&result.gem_file, &release.version));
    Ok(())
}
