// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walletboard::auth::SessionStore;
use walletboard::config::Config;
use walletboard::{cli, commands, db, ledger};

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config);

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::settings::handle(sub)?,
        Some(("auth", sub)) => commands::auth::handle(&config, &SessionStore::open_default()?, sub)?,
        Some(("month", sub)) => commands::month::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some((name, sub)) => {
            let ledger = ledger::connect(&config, &conn)?;
            let ledger = ledger.as_ref();
            match name {
                "summary" => commands::dashboard::summary(&conn, ledger, sub)?,
                "balances" => commands::dashboard::balances(&conn, ledger, &config, sub)?,
                "income" => commands::income::handle(&conn, ledger, sub)?,
                "expense" => commands::expenses::handle(&conn, ledger, sub)?,
                "export" => commands::exporter::handle(&conn, ledger, sub)?,
                _ => {}
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
