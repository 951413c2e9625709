// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{AuthClient, SessionStore, validate_new_password};
use crate::config::Config;
use crate::error::LedgerError;
use crate::utils::require_text;
use anyhow::Result;

pub fn handle(config: &Config, store: &SessionStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("signin", sub)) => {
            let email = require_text("Email", sub.get_one::<String>("email").unwrap())?;
            let password = sub.get_one::<String>("password").unwrap();
            let session = AuthClient::new(&config.backend)?.sign_in(&email, password)?;
            store.save(&session)?;
            println!("Signed in as {}", session.user.email.as_deref().unwrap_or(&email));
        }
        Some(("signup", sub)) => {
            let email = require_text("Email", sub.get_one::<String>("email").unwrap())?;
            let password = sub.get_one::<String>("password").unwrap();
            validate_new_password(password, password)?;
            let nickname = sub.get_one::<String>("nickname").map(|s| s.trim());
            match AuthClient::new(&config.backend)?.sign_up(&email, password, nickname)? {
                Some(session) => {
                    store.save(&session)?;
                    println!("Account created; signed in as {}", email);
                }
                None => println!("Account created; check {} to confirm it", email),
            }
        }
        Some(("signout", _)) => {
            if let Some(session) = store.load()? {
                if let Err(err) = AuthClient::new(&config.backend)?.sign_out(&session) {
                    // the local session is dropped either way
                    tracing::warn!(error = %err, "remote sign-out failed");
                }
            }
            store.clear()?;
            println!("Signed out");
        }
        Some(("passwd", sub)) => {
            let password = sub.get_one::<String>("password").unwrap();
            let confirm = sub.get_one::<String>("confirm").unwrap();
            validate_new_password(password, confirm)?;
            let session = store.load()?.ok_or(LedgerError::NotSignedIn)?;
            AuthClient::new(&config.backend)?.update_password(&session, password)?;
            println!("Password changed");
        }
        Some(("reset", sub)) => {
            let email = require_text("Email", sub.get_one::<String>("email").unwrap())?;
            AuthClient::new(&config.backend)?.reset_password(&email)?;
            println!("Password reset instructions sent to {}", email);
        }
        Some(("status", _)) => match store.load()? {
            Some(session) => println!(
                "Signed in as {} ({})",
                session.user.email.as_deref().unwrap_or("unknown email"),
                session.user.id
            ),
            None => println!("Not signed in"),
        },
        _ => {}
    }
    Ok(())
}
