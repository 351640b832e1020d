#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::errors::Error;
    use crate::restriction::{TransferCode, TransferPolicy};
    use crate::traits::{Role, StaticAuthorization};

    const ISSUER: &str = "acme-energia";
    const ADMIN: &str = "compliance-desk";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn authorization() -> StaticAuthorization {
        StaticAuthorization::new().grant(Role::WhitelistAdmin, ADMIN)
    }

    fn policy_with_lockup() -> TransferPolicy {
        TransferPolicy::new(ISSUER, Some(date(2025, 6, 1)))
    }

    #[test]
    fn open_policy_allows_transfers() {
        let policy = TransferPolicy::new(ISSUER, None);
        assert_eq!(
            policy.evaluate(Some("alice"), Some("bob"), date(2025, 1, 1)),
            TransferCode::Success
        );
    }

    #[test]
    fn mint_and_burn_bypass_all_checks() {
        let auth = authorization();
        let mut policy = TransferPolicy::new(ISSUER, None);
        policy.set_paused(ADMIN, &auth, true).unwrap();
        policy.add_to_blacklist(ADMIN, &auth, "mallory").unwrap();

        // No from: mint. No to: burn. Both skip the predicate even while
        // paused and even for blacklisted parties.
        assert_eq!(
            policy.evaluate(None, Some("mallory"), date(2025, 1, 1)),
            TransferCode::Success
        );
        assert_eq!(
            policy.evaluate(Some("mallory"), None, date(2025, 1, 1)),
            TransferCode::Success
        );
    }

    #[test]
    fn paused_takes_precedence_over_everything() {
        let auth = authorization();
        let mut policy = policy_with_lockup();
        policy.set_paused(ADMIN, &auth, true).unwrap();
        policy.add_to_blacklist(ADMIN, &auth, "mallory").unwrap();

        assert_eq!(
            policy.evaluate(Some("mallory"), Some("bob"), date(2025, 1, 1)),
            TransferCode::Paused
        );
    }

    #[test]
    fn blacklist_beats_whitelist() {
        let auth = authorization();
        let mut policy = TransferPolicy::new(ISSUER, None);
        policy.set_whitelist_enabled(ADMIN, &auth, true).unwrap();
        policy.add_to_blacklist(ADMIN, &auth, "mallory").unwrap();

        // mallory is blacklisted and also absent from the whitelist; the
        // code must say Blacklisted, never NotWhitelisted.
        assert_eq!(
            policy.evaluate(Some("mallory"), Some("bob"), date(2025, 1, 1)),
            TransferCode::Blacklisted
        );
        assert_eq!(
            policy.evaluate(Some("alice"), Some("mallory"), date(2025, 1, 1)),
            TransferCode::Blacklisted
        );
    }

    #[test]
    fn whitelist_covers_both_endpoints() {
        let auth = authorization();
        let mut policy = TransferPolicy::new(ISSUER, None);
        policy.set_whitelist_enabled(ADMIN, &auth, true).unwrap();
        policy.add_to_whitelist(ADMIN, &auth, "alice").unwrap();

        assert_eq!(
            policy.evaluate(Some("alice"), Some("bob"), date(2025, 1, 1)),
            TransferCode::NotWhitelisted
        );
        policy.add_to_whitelist(ADMIN, &auth, "bob").unwrap();
        assert_eq!(
            policy.evaluate(Some("alice"), Some("bob"), date(2025, 1, 1)),
            TransferCode::Success
        );
    }

    #[test]
    fn lockup_blocks_holders_but_not_issuer() {
        let policy = policy_with_lockup();

        assert_eq!(
            policy.evaluate(Some("alice"), Some("bob"), date(2025, 5, 31)),
            TransferCode::LockUpActive
        );
        // Initial distribution from the issuer is exempt.
        assert_eq!(
            policy.evaluate(Some(ISSUER), Some("alice"), date(2025, 5, 31)),
            TransferCode::Success
        );
        // The end date itself is no longer locked.
        assert_eq!(
            policy.evaluate(Some("alice"), Some("bob"), date(2025, 6, 1)),
            TransferCode::Success
        );
    }

    #[test]
    fn codes_carry_readable_reasons() {
        assert_eq!(TransferCode::Blacklisted.to_string(), "address is blacklisted");
        assert!(TransferCode::Success.is_allowed());
        assert!(!TransferCode::LockUpActive.is_allowed());
    }

    #[test]
    fn mutators_require_whitelist_admin() {
        let auth = authorization();
        let mut policy = TransferPolicy::new(ISSUER, None);
        let err = policy.set_paused("stranger", &auth, true).unwrap_err();
        assert_eq!(
            err,
            Error::Unauthorized {
                principal: "stranger".to_string(),
                role: Role::WhitelistAdmin,
            }
        );
        // State is untouched after the rejected call.
        assert_eq!(
            policy.evaluate(Some("alice"), Some("bob"), date(2025, 1, 1)),
            TransferCode::Success
        );
    }
}
