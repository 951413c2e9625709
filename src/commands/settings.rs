// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Config, default_config_toml};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let path = Config::path()?;
    match m.subcommand() {
        Some(("init", sub)) => {
            write_default_config(&path, sub.get_flag("force"))?;
            println!("Wrote {}", path.display());
        }
        _ => println!("{}", path.display()),
    }
    Ok(())
}

pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Create {}", dir.display()))?;
    }
    fs::write(path, default_config_toml())
        .with_context(|| format!("Write {}", path.display()))?;
    Ok(())
}
