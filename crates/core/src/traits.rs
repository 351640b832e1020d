//! Collaborator traits.
//!
//! The core deliberately does not own authorization, the token balance ledger,
//! or the payment custody. It queries them through these seams so the
//! valuation and lifecycle engines stay independently testable, and so hosts
//! can wire in their own role graph and settlement rails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::errors::Result;

// =============================================================================
// Authorization
// =============================================================================

/// Capabilities the core checks before privileged operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Issuer,
    Trustee,
    WhitelistAdmin,
    OracleUpdater,
}

/// External authorization capability.
///
/// The core never stores a role graph; it asks this collaborator before every
/// privileged operation and fails with `Unauthorized` on a false answer.
pub trait Authorization: Send + Sync {
    fn has_capability(&self, principal: &str, role: Role) -> bool;
}

/// Fixed role-to-principal grants, for wiring simple deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorization {
    grants: HashMap<Role, HashSet<String>>,
}

impl StaticAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, role: Role, principal: impl Into<String>) -> Self {
        self.grants.entry(role).or_default().insert(principal.into());
        self
    }
}

impl Authorization for StaticAuthorization {
    fn has_capability(&self, principal: &str, role: Role) -> bool {
        self.grants
            .get(&role)
            .map_or(false, |principals| principals.contains(principal))
    }
}

// =============================================================================
// Payment Custody
// =============================================================================

/// Payment-token custody collaborator.
///
/// `pull` moves funds from an external account into the debenture's custody;
/// `push` pays out of custody. Both are all-or-nothing: a failure must leave
/// the external ledger untouched, and the core will retain no state mutation
/// from the aborted operation.
#[async_trait]
pub trait PaymentCustody: Send + Sync {
    async fn pull(&self, from: &str, amount: i128) -> Result<()>;
    async fn push(&self, to: &str, amount: i128) -> Result<()>;
}

// =============================================================================
// Balance Ledger
// =============================================================================

/// Read-only view of the external token balance ledger.
///
/// Transfer bookkeeping itself is out of scope; claims only need to know how
/// many units a holder owns at claim time.
pub trait BalanceLedger: Send + Sync {
    fn balance_of(&self, holder: &str) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_authorization_grants() {
        let auth = StaticAuthorization::new()
            .grant(Role::Issuer, "acme")
            .grant(Role::Trustee, "custodian");

        assert!(auth.has_capability("acme", Role::Issuer));
        assert!(!auth.has_capability("acme", Role::Trustee));
        assert!(auth.has_capability("custodian", Role::Trustee));
        assert!(!auth.has_capability("stranger", Role::Issuer));
    }
}
