// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hosted auth service client and the on-disk session it produces.

use crate::config::BackendConfig;
use crate::error::LedgerError;
use crate::utils::{check_response, http_client};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(SessionStore::new(crate::db::session_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Read session {}", self.path.display()))?;
        let session = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)
            .with_context(|| format!("Write session {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Remove session {}", self.path.display()))?;
        }
        Ok(())
    }
}

pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), LedgerError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LedgerError::invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirmation {
        return Err(LedgerError::invalid("Passwords do not match"));
    }
    Ok(())
}

pub struct AuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

/// Sign-up either returns a full session (auto-confirm) or just the user
/// when email confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(SessionUser),
}

impl AuthClient {
    pub fn new(backend: &BackendConfig) -> Result<Self> {
        Ok(AuthClient {
            http: http_client(backend.timeout_secs)?,
            base_url: backend.url()?.to_string(),
            anon_key: backend.anon_key()?.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let resp = self
            .http
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .context("Auth request failed")?;
        let session: Session = check_response(resp)?
            .json()
            .context("Unexpected sign-in response")?;
        tracing::info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    /// Returns the session when the service signs the new user in directly.
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        nickname: Option<&str>,
    ) -> Result<Option<Session>> {
        let resp = self
            .http
            .post(self.url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "nickname": nickname },
            }))
            .send()
            .context("Auth request failed")?;
        let body: SignUpResponse = check_response(resp)?
            .json()
            .context("Unexpected sign-up response")?;
        Ok(match body {
            SignUpResponse::Session(s) => Some(s),
            SignUpResponse::User(u) => {
                tracing::info!(user = %u.id, "sign-up pending confirmation");
                None
            }
        })
    }

    pub fn sign_out(&self, session: &Session) -> Result<()> {
        let resp = self
            .http
            .post(self.url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .context("Auth request failed")?;
        check_response(resp)?;
        Ok(())
    }

    pub fn update_password(&self, session: &Session, new_password: &str) -> Result<()> {
        let resp = self
            .http
            .put(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .context("Auth request failed")?;
        check_response(resp)?;
        Ok(())
    }

    pub fn reset_password(&self, email: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("recover"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email }))
            .send()
            .context("Auth request failed")?;
        check_response(resp)?;
        Ok(())
    }
}
