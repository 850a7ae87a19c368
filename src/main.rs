use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use rjs_filter::cmd;
use std::path::PathBuf;
use std::process;

/// Drive the r.js optimizer over JavaScript assets
///
/// rjs-filter generates an r.js build profile per asset from .rjs-filter.toml,
/// runs the optimizer and collects the optimized output.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize JavaScript files with r.js
    Optimize {
        /// Files to optimize, relative to the current directory
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Directory the optimized files are written to
        #[arg(short, long, default_value = "build")]
        out_dir: PathBuf,

        /// Configuration file (default: ./.rjs-filter.toml)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the build profile that would be handed to r.js for a file
    Profile {
        /// File to build the profile for
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory the optimized file would be written to
        #[arg(short, long, default_value = "build")]
        out_dir: PathBuf,

        /// Configuration file (default: ./.rjs-filter.toml)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Create a starter .rjs-filter.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Check that the configured interpreter and optimizer can be found
    Check {
        /// Configuration file (default: ./.rjs-filter.toml)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Optimize {
            files,
            out_dir,
            config,
            json,
        } => cmd::cmd_optimize(files, out_dir, config.as_deref(), *json),
        Commands::Profile {
            file,
            out_dir,
            config,
        } => cmd::cmd_profile(file, out_dir, config.as_deref()),
        Commands::Init { force } => cmd::cmd_init(*force),
        Commands::Check { config } => cmd::cmd_check(config.as_deref()),
        Commands::Completions { shell } => {
            cmd::cmd_completions(*shell, &mut Cli::command());
            Ok(())
        }
    };

    if let Err(e) = result {
        use rjs_filter::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}
