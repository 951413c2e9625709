// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use tempfile::tempdir;
use walletboard::auth::{Session, SessionStore, SessionUser, validate_new_password};
use walletboard::commands::settings::write_default_config;
use walletboard::config::{BackendKind, Config, default_config_toml};
use walletboard::error::LedgerError;
use walletboard::models::PaymentMethod;

#[test]
fn default_toml_parses_to_local_backend() {
    let config = Config::from_toml_str(default_config_toml()).unwrap();
    assert_eq!(config.backend.kind, BackendKind::Local);
    assert_eq!(config.backend.timeout_secs, 15);
    assert_eq!(config.cards.len(), 3);
    assert_eq!(config.logging.level, "walletboard=warn");
}

#[test]
fn empty_file_means_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.backend.kind, BackendKind::Local);
    assert!(config.cards.is_empty());
    assert_eq!(config.card(PaymentMethod::Pix).display_name(), "Pix");
}

#[test]
fn card_display_uses_last_four_digits() {
    let config = Config::from_toml_str(
        r#"
        [[cards]]
        method = "nubank"
        label = "Nubank"
        holder = "Ana Souza"
        last_four = "2682"
        "#,
    )
    .unwrap();
    let card = config.card(PaymentMethod::Nubank);
    assert_eq!(card.display_name(), "Nubank •••• 2682");
    assert_eq!(card.holder.as_deref(), Some("Ana Souza"));
    assert_eq!(config.card(PaymentMethod::Inter).display_name(), "Inter");
}

#[test]
fn env_overrides_win_over_file() {
    let mut config = Config::from_toml_str(
        r#"
        [backend]
        kind = "local"
        url = "https://file.example.co"
        "#,
    )
    .unwrap();
    let env: HashMap<&str, &str> = [
        ("WALLETBOARD_BACKEND", " Remote "),
        ("WALLETBOARD_URL", "https://env.example.co/"),
        ("WALLETBOARD_ANON_KEY", "anon"),
        ("WALLETBOARD_LOG", "walletboard=debug"),
    ]
    .into_iter()
    .collect();
    config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(config.backend.kind, BackendKind::Remote);
    assert_eq!(config.backend.url().unwrap(), "https://env.example.co");
    assert_eq!(config.backend.anon_key().unwrap(), "anon");
    assert_eq!(config.logging.level, "walletboard=debug");
}

#[test]
fn unknown_backend_override_is_ignored() {
    let mut config = Config::default();
    config.apply_overrides(|k| (k == "WALLETBOARD_BACKEND").then(|| "carrier-pigeon".to_string()));
    assert_eq!(config.backend.kind, BackendKind::Local);
}

#[test]
fn remote_settings_must_be_present() {
    let config = Config::default();
    assert!(matches!(
        config.backend.url(),
        Err(LedgerError::MissingBackendSetting("backend.url"))
    ));
    assert!(matches!(
        config.backend.anon_key(),
        Err(LedgerError::MissingBackendSetting("backend.anon_key"))
    ));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("walletboard.toml");
    write_default_config(&path, false).unwrap();
    assert!(Config::from_file(&path).is_ok());

    std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();
    assert!(write_default_config(&path, false).is_err());
    write_default_config(&path, true).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), default_config_toml());
}

fn session() -> Session {
    Session {
        access_token: "token-abc".into(),
        refresh_token: Some("refresh-xyz".into()),
        expires_at: Some(1_760_000_000),
        user: SessionUser {
            id: "0b7f6c1e".into(),
            email: Some("ana@example.com".into()),
        },
    }
}

#[test]
fn session_store_saves_loads_and_clears() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    assert_eq!(store.load().unwrap(), None);

    store.save(&session()).unwrap();
    assert_eq!(store.load().unwrap(), Some(session()));

    store.clear().unwrap();
    assert!(!store.path().exists());
    store.clear().unwrap();
}

#[test]
fn corrupt_session_file_is_an_error() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    std::fs::write(store.path(), "{not json").unwrap();
    assert!(store.load().is_err());
}

#[test]
fn new_password_needs_length_and_confirmation() {
    assert!(validate_new_password("12345", "12345").is_err());
    assert!(validate_new_password("segredo1", "segredo2").is_err());
    assert!(validate_new_password("segredo", "segredo").is_ok());
}
