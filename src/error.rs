// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures the ledger reports to callers. Everything else travels as
/// `anyhow::Error` with context attached at the call site.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Invalid(String),

    #[error("Installment {0} not found")]
    InstallmentNotFound(i64),

    #[error("Not signed in; run `walletboard auth signin` first")]
    NotSignedIn,

    #[error("Backend setting '{0}' is missing (set it in walletboard.toml or the environment)")]
    MissingBackendSetting(&'static str),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::Invalid(msg.into())
    }
}
