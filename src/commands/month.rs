// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_selected_month, parse_month, set_selected_month};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let current = get_selected_month(conn)?;
    let selected = match m.subcommand() {
        Some(("set", sub)) => parse_month(sub.get_one::<String>("month").unwrap())?,
        Some(("next", _)) => current.next(),
        Some(("prev", _)) => current.prev(),
        _ => {
            println!("{} ({})", current, current.label());
            return Ok(());
        }
    };
    set_selected_month(conn, selected)?;
    println!("Selected month: {} ({})", selected, selected.label());
    Ok(())
}
