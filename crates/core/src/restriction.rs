//! Transfer restriction predicate.
//!
//! [`TransferPolicy::evaluate`] is the single gate consulted before every
//! balance-changing operation on the token ledger. It is a pure function of
//! the policy state and the supplied date; the ledger itself is out of scope.
//!
//! Check precedence is fixed and observable: paused, then blacklist, then
//! whitelist, then lock-up. A blacklisted address always receives
//! `Blacklisted` even when it also fails the whitelist check.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::errors::{Error, Result};
use crate::traits::{Authorization, Role};

/// Outcome of a transfer restriction check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferCode {
    Success,
    Paused,
    Blacklisted,
    NotWhitelisted,
    LockUpActive,
}

impl TransferCode {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TransferCode::Success)
    }
}

impl fmt::Display for TransferCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TransferCode::Success => "transfer allowed",
            TransferCode::Paused => "transfers are paused",
            TransferCode::Blacklisted => "address is blacklisted",
            TransferCode::NotWhitelisted => "address is not whitelisted",
            TransferCode::LockUpActive => "lock-up period has not ended",
        };
        write!(f, "{reason}")
    }
}

/// Restriction state for one debenture's token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPolicy {
    paused: bool,
    whitelist_enabled: bool,
    whitelist: HashSet<String>,
    blacklist: HashSet<String>,
    lock_up_end: Option<NaiveDate>,
    /// Issuer transfers are exempt from the lock-up, for initial
    /// distribution.
    issuer: String,
}

impl TransferPolicy {
    pub fn new(issuer: impl Into<String>, lock_up_end: Option<NaiveDate>) -> Self {
        Self {
            paused: false,
            whitelist_enabled: false,
            whitelist: HashSet::new(),
            blacklist: HashSet::new(),
            lock_up_end,
            issuer: issuer.into(),
        }
    }

    /// Evaluates a transfer. `None` for `from` or `to` means mint or burn,
    /// which bypasses the predicate entirely.
    pub fn evaluate(&self, from: Option<&str>, to: Option<&str>, today: NaiveDate) -> TransferCode {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => return TransferCode::Success,
        };

        if self.paused {
            return TransferCode::Paused;
        }
        if self.blacklist.contains(from) || self.blacklist.contains(to) {
            return TransferCode::Blacklisted;
        }
        if self.whitelist_enabled
            && (!self.whitelist.contains(from) || !self.whitelist.contains(to))
        {
            return TransferCode::NotWhitelisted;
        }
        if let Some(end) = self.lock_up_end {
            if today < end && from != self.issuer {
                return TransferCode::LockUpActive;
            }
        }
        TransferCode::Success
    }

    // =========================================================================
    // Admin Mutators
    // =========================================================================

    pub fn set_paused(
        &mut self,
        caller: &str,
        authorization: &dyn Authorization,
        paused: bool,
    ) -> Result<()> {
        require_whitelist_admin(caller, authorization)?;
        self.paused = paused;
        Ok(())
    }

    pub fn set_whitelist_enabled(
        &mut self,
        caller: &str,
        authorization: &dyn Authorization,
        enabled: bool,
    ) -> Result<()> {
        require_whitelist_admin(caller, authorization)?;
        self.whitelist_enabled = enabled;
        Ok(())
    }

    pub fn add_to_whitelist(
        &mut self,
        caller: &str,
        authorization: &dyn Authorization,
        address: impl Into<String>,
    ) -> Result<()> {
        require_whitelist_admin(caller, authorization)?;
        self.whitelist.insert(address.into());
        Ok(())
    }

    pub fn remove_from_whitelist(
        &mut self,
        caller: &str,
        authorization: &dyn Authorization,
        address: &str,
    ) -> Result<()> {
        require_whitelist_admin(caller, authorization)?;
        self.whitelist.remove(address);
        Ok(())
    }

    pub fn add_to_blacklist(
        &mut self,
        caller: &str,
        authorization: &dyn Authorization,
        address: impl Into<String>,
    ) -> Result<()> {
        require_whitelist_admin(caller, authorization)?;
        self.blacklist.insert(address.into());
        Ok(())
    }

    pub fn remove_from_blacklist(
        &mut self,
        caller: &str,
        authorization: &dyn Authorization,
        address: &str,
    ) -> Result<()> {
        require_whitelist_admin(caller, authorization)?;
        self.blacklist.remove(address);
        Ok(())
    }
}

fn require_whitelist_admin(principal: &str, authorization: &dyn Authorization) -> Result<()> {
    if !authorization.has_capability(principal, Role::WhitelistAdmin) {
        return Err(Error::Unauthorized {
            principal: principal.to_string(),
            role: Role::WhitelistAdmin,
        });
    }
    Ok(())
}
