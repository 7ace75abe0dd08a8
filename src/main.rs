// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use treasury::config::StoreConfig;
use treasury::{cli, commands, repository};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config = StoreConfig::from_matches(&matches);
    let mut repo = config.open()?;
    let repo = repo.as_mut();

    match matches.subcommand() {
        Some(("init", _)) => {
            let seeded = repository::seed_default_categories(repo)?;
            println!(
                "Store initialized at {} ({} default categories added)",
                config.store_path()?.display(),
                seeded
            );
        }
        Some(("tx", sub)) => commands::transactions::handle(repo, sub)?,
        Some(("category", sub)) => commands::categories::handle(repo, sub)?,
        Some(("period", sub)) => commands::periods::handle(repo, sub)?,
        Some(("settings", sub)) => commands::settings::handle(repo, sub)?,
        Some(("report", sub)) => commands::reports::handle(repo, sub)?,
        Some(("export", sub)) => commands::exporter::handle(repo, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(repo, sub)?,
        Some(("reset", _)) => {
            repo.reset_all()?;
            println!("All data deleted");
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
