//! Command-line front end for editing PlainText world files.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "pt",
    about = "PlainText: inspect and edit the objects of a world file",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a property: <object-name> [#] <property-name> <value>
    Set {
        /// World file to edit
        file: PathBuf,

        /// Command arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Only consider this area and what it lists (e.g. area:1)
        #[arg(short, long)]
        area: Option<String>,

        /// Read malformed integers as 0 instead of failing
        #[arg(long)]
        lenient_integers: bool,

        /// Do not report new display forms
        #[arg(long)]
        quiet_forms: bool,

        /// Apply the edit without writing the file back
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the properties of one object
    Show {
        /// World file to read
        file: PathBuf,

        /// Object name or identifier
        selector: String,

        /// Only consider this area and what it lists (e.g. area:1)
        #[arg(short, long)]
        area: Option<String>,
    },

    /// Print every object
    Export {
        /// World file to read
        file: PathBuf,

        /// Output format: wire, text
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report references to objects that do not exist
    Check {
        /// World file to read
        file: PathBuf,
    },

    /// List the registered property types
    Types,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "pt_cli=debug,pt_core=debug"
    } else {
        "pt_cli=warn,pt_core=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Set {
            file,
            args,
            area,
            lenient_integers,
            quiet_forms,
            dry_run,
        } => commands::set::run(
            &file,
            &args.join(" "),
            &commands::set::SetOptions {
                area,
                lenient_integers,
                quiet_forms,
                dry_run,
            },
        ),
        Commands::Show {
            file,
            selector,
            area,
        } => commands::show::run(&file, &selector, area.as_deref()),
        Commands::Export {
            file,
            format,
            output,
        } => commands::export::run(&file, &format, output.as_deref()),
        Commands::Check { file } => commands::check::run(&file),
        Commands::Types => commands::types::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
