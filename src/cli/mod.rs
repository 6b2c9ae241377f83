use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Assemble the extension package archive.
    #[command(alias = "p")]
    Pack {
        /// Package root that manifest source paths are resolved against.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// The path for the output archive file. [default: <root>/build/extension.xpi]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON include manifest to use instead of the built-in one.
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Suppress per-entry progress lines.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the include entries a pack run would write, without writing anything.
    #[command(alias = "dry-run")]
    Plan {
        /// Package root that manifest source paths are resolved against.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// JSON include manifest to use instead of the built-in one.
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
