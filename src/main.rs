use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio::build::build_site;
use folio::config::Config;
use folio::route::{enumerate_routes, listing_routes};
use folio::store::Store;
use std::path::{Path, PathBuf};

/// Build a blog and tutorial site from a directory of markdown documents.
#[derive(Parser)]
#[command(name = "folio", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory.
    Build {
        /// The project directory (or any directory below it).
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Where to write the site. Defaults to `{project}/_output`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Worker threads for parsing documents. Defaults to one per CPU.
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print every route the site would render.
    Routes {
        /// The project directory (or any directory below it).
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Also print routes whose document is a draft.
        #[arg(long)]
        drafts: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Build {
            project,
            output,
            threads,
        } => {
            let config = Config::from_directory(&absolute(&project)?, output.as_deref(), threads)?;
            build_site(&config).context("Building site")?;
        }
        Command::Routes { project, drafts } => {
            let config = Config::from_directory(&absolute(&project)?, None, None)?;
            let store = Store::load(&config.content_directory, &config.load_options())
                .context("Loading content")?;
            for listing in listing_routes() {
                println!("{:<40} listing", listing.path());
            }
            for (document, route) in store.documents().iter().zip(enumerate_routes(&store)?) {
                if !drafts && document.draft() {
                    continue;
                }
                println!(
                    "{:<40} {}{}",
                    route.path(),
                    document.collection(),
                    if document.draft() { " (draft)" } else { "" },
                );
            }
        }
    }
    Ok(())
}

// The project file search walks up through parent directories, which a
// relative path like `.` doesn't have.
fn absolute(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize()
        .with_context(|| format!("Resolving project directory `{}`", dir.display()))
}
