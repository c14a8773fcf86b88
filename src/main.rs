// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! jopi CLI - run the loader hooks outside of a JavaScript host
//!
//! Handy for checking what a stylesheet compiles to, or where an import
//! ends up once the directory and `.js` fallbacks have run.

use clap::{Parser, Subcommand};
use jopi_loader::{
    FsLoader, LoadContext, LoaderConfig, LoaderHooks, NodeResolver, ResolveContext,
    ResolvedModule, TYPE_DECLARATIONS, VERSION,
};
use owo_colors::OwoColorize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jopi",
    about = "Stylesheet, asset and import-fallback hooks for JavaScript hosts",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Configuration file, instead of the layered project configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a stylesheet and print the generated module
    Compile {
        /// Stylesheet to compile
        file: PathBuf,
    },
    /// Resolve an import specifier
    Resolve {
        /// Specifier as written in the import statement
        specifier: String,
        /// Importing file (defaults to a module in the current directory)
        #[arg(short, long)]
        parent: Option<PathBuf>,
    },
    /// Resolve then load an import specifier and print its source
    Load {
        /// Specifier as written in the import statement
        specifier: String,
        /// Importing file (defaults to a module in the current directory)
        #[arg(short, long)]
        parent: Option<PathBuf>,
    },
    /// Print the TypeScript declarations for stylesheet imports
    Types {
        /// Write the declarations to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match env::var("JOPI_LOG") {
        Ok(filter) => EnvFilter::new(filter),
        Err(_) if cli.verbose => EnvFilter::new("jopi=debug,jopi_loader=debug"),
        Err(_) => EnvFilter::new("jopi=warn,jopi_loader=warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cwd = env::current_dir()?;
    let config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::load(&cwd)?,
    };
    debug!("Using configuration {:?}", config);

    let hooks = LoaderHooks::new(config);

    let outcome = match cli.command {
        Command::Compile { file } => compile(&hooks, &cwd.join(file)).await,
        Command::Resolve { specifier, parent } => {
            resolve(&hooks, &specifier, parent.as_deref(), &cwd)
                .await
                .map(|resolved| print_resolved(&resolved))
        }
        Command::Load { specifier, parent } => {
            load(&hooks, &specifier, parent.as_deref(), &cwd).await
        }
        Command::Types { out } => types(out.as_deref()).await,
    };

    if let Err(e) = outcome {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn compile(hooks: &LoaderHooks, file: &Path) -> anyhow::Result<()> {
    let module = hooks.compiler().compile(file).await?;
    println!("{}", module.source);
    Ok(())
}

async fn resolve(
    hooks: &LoaderHooks,
    specifier: &str,
    parent: Option<&Path>,
    cwd: &Path,
) -> anyhow::Result<ResolvedModule> {
    // Imports typed at the prompt behave like imports from the working directory
    let parent = match parent {
        Some(parent) => cwd.join(parent),
        None => cwd.join("[eval].js"),
    };
    let context = ResolveContext::from_parent_path(&parent)?;

    Ok(hooks.resolve(specifier, &context, &NodeResolver::new()).await?)
}

async fn load(
    hooks: &LoaderHooks,
    specifier: &str,
    parent: Option<&Path>,
    cwd: &Path,
) -> anyhow::Result<()> {
    let resolved = resolve(hooks, specifier, parent, cwd).await?;
    let loaded = hooks
        .load(&resolved.url, &LoadContext::for_resolved(&resolved), &FsLoader)
        .await?;

    eprintln!(
        "{} {} ({})",
        "Loaded".green().bold(),
        resolved.url.as_str().cyan(),
        loaded.format.dimmed()
    );
    match loaded.source {
        Some(source) => println!("{}", source),
        None => println!("{}", "<built-in module>".dimmed()),
    }
    Ok(())
}

async fn types(out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            tokio::fs::write(path, TYPE_DECLARATIONS).await?;
            eprintln!("{} {}", "Wrote".green().bold(), path.display().cyan());
        }
        None => print!("{}", TYPE_DECLARATIONS),
    }
    Ok(())
}

fn print_resolved(resolved: &ResolvedModule) {
    let format = resolved
        .format
        .as_ref()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("{}", resolved.url);
    println!("  {} {}", "format:".dimmed(), format.yellow());
    if resolved.short_circuit {
        println!("  {}", "short-circuit".dimmed());
    }
}
