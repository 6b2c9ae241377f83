//! Main entry point for the xpipack CLI app

use std::path::Path;
use std::process::ExitCode;

use xpipack::cli::{self, Commands};
use xpipack::manifest::{EntryKind, Manifest};
use xpipack::packager;

fn main() -> ExitCode {
    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match &command {
        Commands::Pack { root, output, manifest, quiet } => {
            let manifest = load_manifest(manifest.as_deref())?;
            let output = output
                .clone()
                .unwrap_or_else(|| root.join(packager::DEFAULT_OUTPUT));
            packager::run(&manifest, root, &output, *quiet)?;
        }
        Commands::Plan { root, manifest } => {
            let manifest = load_manifest(manifest.as_deref())?;
            packager::validate_sources(&manifest, root)?;
            for entry in &manifest.entries {
                let kind = match entry.kind {
                    EntryKind::Dir => "dir ",
                    EntryKind::File => "file",
                };
                println!("{} {} -> {}", kind, entry.source.display(), entry.target.display());
            }
        }
    }

    Ok(())
}

fn load_manifest(path: Option<&Path>) -> Result<Manifest, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(p) => Manifest::from_json_file(p)?,
        None => Manifest::builtin(),
    })
}
