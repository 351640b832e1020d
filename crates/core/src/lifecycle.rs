//! Debenture lifecycle state machine.
//!
//! [`Debenture`] is the aggregate: it owns its terms, status, valuation
//! state, amortization schedule, coupon records, and per-holder claim state,
//! and holds shared references to the oracle, authorization, payment custody,
//! and balance ledger collaborators.
//!
//! # State Machine
//!
//! ```text
//! Active ──> Matured
//!        ──> Defaulted
//!        ──> EarlyRedeemed
//!        ──> Repactuated ──> Repactuated (terms may be renegotiated again)
//! ```
//!
//! Every mutating operation runs to completion atomically relative to all
//! others; hosts get that discipline by driving one instance through a
//! [`DebentureHandle`]. Custody transfers happen before bookkeeping commits,
//! so a failed transfer leaves no partial state behind.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::{FACTOR_PRECISION, PU_PRECISION};
use crate::errors::{Error, LifecycleError, Result};
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::fixed::mul_div;
use crate::terms::{
    AmortizationBasis, AmortizationEntry, ClaimPolicy, DebentureTerms, RateLink, SchedulePolicy,
};
use crate::traits::{Authorization, BalanceLedger, PaymentCustody, Role};
use crate::valuation::{CouponQuote, Valuation};
use lastro_oracle::RateOracle;

// =============================================================================
// Status
// =============================================================================

/// Debenture status. `Active` is initial; `Repactuated` permits further
/// repactuations but no other transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebentureStatus {
    Active,
    Matured,
    Defaulted,
    EarlyRedeemed,
    Repactuated,
}

// =============================================================================
// Coupon Records
// =============================================================================

/// One recorded coupon. Append-only; the position in the record list is the
/// stable index used by claim cursors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRecord {
    pub record_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    /// Total annual rate in basis points; zero for DI-linked coupons.
    pub rate_bps_used: i64,
    /// Oracle index value consulted, 8 decimals; zero when none was needed.
    pub index_value_used: i64,
    /// Coupon amount per unit, 6 decimals.
    pub coupon_amount_per_unit: i128,
    /// Amortization amount folded into this coupon, 6 decimals per unit.
    pub amort_amount_per_unit: i128,
    pub calculated: bool,
    pub paid: bool,
}

impl CouponRecord {
    fn total_per_unit(&self) -> i128 {
        self.coupon_amount_per_unit + self.amort_amount_per_unit
    }
}

/// Per-holder claim bookkeeping, one variant per [`ClaimPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
enum ClaimState {
    /// Any paid index may be claimed once, in any order.
    Unordered {
        claimed: HashMap<String, BTreeSet<usize>>,
    },
    /// Claims proceed strictly in index order from one cursor per holder.
    Ordered { next_index: HashMap<String, usize> },
}

impl ClaimState {
    fn new(policy: ClaimPolicy) -> Self {
        match policy {
            ClaimPolicy::Unordered => ClaimState::Unordered {
                claimed: HashMap::new(),
            },
            ClaimPolicy::Ordered => ClaimState::Ordered {
                next_index: HashMap::new(),
            },
        }
    }

    fn has_claimed(&self, holder: &str, index: usize) -> bool {
        match self {
            ClaimState::Unordered { claimed } => claimed
                .get(holder)
                .map_or(false, |indices| indices.contains(&index)),
            ClaimState::Ordered { next_index } => {
                index < next_index.get(holder).copied().unwrap_or(0)
            }
        }
    }

    /// Validates the claim against the policy without committing it.
    fn check(&self, holder: &str, index: usize) -> Result<()> {
        match self {
            ClaimState::Unordered { .. } => {
                if self.has_claimed(holder, index) {
                    return Err(LifecycleError::AlreadyClaimed(index).into());
                }
            }
            ClaimState::Ordered { next_index } => {
                let expected = next_index.get(holder).copied().unwrap_or(0);
                if index != expected {
                    return Err(LifecycleError::ClaimOutOfOrder {
                        expected,
                        requested: index,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, holder: &str, index: usize) {
        match self {
            ClaimState::Unordered { claimed } => {
                claimed.entry(holder.to_string()).or_default().insert(index);
            }
            ClaimState::Ordered { next_index } => {
                next_index.insert(holder.to_string(), index + 1);
            }
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Read-only serializable view of an aggregate, for query surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebentureSnapshot {
    pub id: Uuid,
    pub isin: String,
    pub series: String,
    pub status: DebentureStatus,
    pub vne: i128,
    pub vna: i128,
    pub di_factor: i128,
    pub coupon_count: usize,
    pub schedule: Vec<AmortizationEntry>,
    pub custody_balance: i128,
}

// =============================================================================
// Debenture Aggregate
// =============================================================================

/// One debenture series instance.
pub struct Debenture {
    id: Uuid,
    terms: DebentureTerms,
    status: DebentureStatus,
    valuation: Valuation,
    schedule: Vec<AmortizationEntry>,
    coupons: Vec<CouponRecord>,
    claims: ClaimState,
    /// Payment funds held against recorded coupons and redemptions, 6 dec.
    custody_balance: i128,
    oracle: Arc<dyn RateOracle>,
    authorization: Arc<dyn Authorization>,
    custody: Arc<dyn PaymentCustody>,
    ledger: Arc<dyn BalanceLedger>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl Debenture {
    /// Creates an Active debenture after validating its terms.
    pub fn new(
        terms: DebentureTerms,
        oracle: Arc<dyn RateOracle>,
        authorization: Arc<dyn Authorization>,
        custody: Arc<dyn PaymentCustody>,
        ledger: Arc<dyn BalanceLedger>,
    ) -> Result<Self> {
        terms.validate()?;
        let valuation = Valuation::new(&terms);
        let claims = ClaimState::new(terms.claim_policy);
        Ok(Self {
            id: Uuid::new_v4(),
            terms,
            status: DebentureStatus::Active,
            valuation,
            schedule: Vec::new(),
            coupons: Vec::new(),
            claims,
            custody_balance: 0,
            oracle,
            authorization,
            custody,
            ledger,
            event_sink: Arc::new(NoOpDomainEventSink),
        })
    }

    /// Sets the domain event sink (builder style).
    pub fn with_event_sink(mut self, sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn terms(&self) -> &DebentureTerms {
        &self.terms
    }

    pub fn status(&self) -> DebentureStatus {
        self.status
    }

    /// Current updated face value per unit, 6 decimals.
    pub fn vna(&self) -> i128 {
        self.valuation.vna.value
    }

    /// Running DI accumulation factor, 9 decimals.
    pub fn di_factor(&self) -> i128 {
        self.valuation.di.factor
    }

    pub fn coupon(&self, index: usize) -> Option<&CouponRecord> {
        self.coupons.get(index)
    }

    pub fn coupons(&self) -> &[CouponRecord] {
        &self.coupons
    }

    pub fn schedule(&self) -> &[AmortizationEntry] {
        &self.schedule
    }

    pub fn custody_balance(&self) -> i128 {
        self.custody_balance
    }

    /// Par unit price including accrued interest, 6 decimals.
    pub fn pu_par(&self, today: NaiveDate) -> i128 {
        self.valuation
            .pu_par(&self.terms, self.last_coupon_date(), today)
    }

    /// Previews the next coupon. Callable any time; mutates nothing.
    pub fn next_coupon(&self) -> Result<CouponQuote> {
        self.valuation.next_coupon(&self.terms, self.oracle.as_ref())
    }

    /// The date the next coupon becomes recordable.
    pub fn next_coupon_date(&self) -> NaiveDate {
        self.last_coupon_date() + chrono::Duration::days(self.terms.coupon_frequency_days as i64)
    }

    /// What `holder` could claim right now across all paid records.
    pub fn pending_claim(&self, holder: &str) -> i128 {
        let balance = self.ledger.balance_of(holder) as i128;
        let mut total = 0i128;
        for (index, record) in self.coupons.iter().enumerate() {
            if !record.paid || self.claims.has_claimed(holder, index) {
                // Under the ordered policy an unpaid record also blocks
                // everything after it.
                if matches!(self.claims, ClaimState::Ordered { .. }) && !record.paid {
                    break;
                }
                continue;
            }
            total += mul_div(record.total_per_unit(), balance, PU_PRECISION);
        }
        total
    }

    pub fn snapshot(&self) -> DebentureSnapshot {
        DebentureSnapshot {
            id: self.id,
            isin: self.terms.isin.clone(),
            series: self.terms.series.clone(),
            status: self.status,
            vne: self.valuation.vne(),
            vna: self.valuation.vna.value,
            di_factor: self.valuation.di.factor,
            coupon_count: self.coupons.len(),
            schedule: self.schedule.clone(),
            custody_balance: self.custody_balance,
        }
    }

    // =========================================================================
    // Valuation Updates
    // =========================================================================

    /// Folds the latest IPCA/IGPM reading into VNA. Unprivileged: the oracle
    /// already validated the data, so anyone may crystallize it.
    pub fn update_vna(&mut self, now: DateTime<Utc>) -> Result<(i128, i128)> {
        let (old_value, new_value) =
            self.valuation
                .update_vna(&self.terms, self.oracle.as_ref(), now)?;
        self.event_sink.emit(DomainEvent::VnaUpdated {
            debenture_id: self.id,
            old_value,
            new_value,
        });
        Ok((old_value, new_value))
    }

    /// Folds one daily DI factor into the running accumulation.
    pub fn update_di_factor(
        &mut self,
        caller: &str,
        di_rate: i64,
        now: DateTime<Utc>,
    ) -> Result<i128> {
        self.require_capability(caller, Role::OracleUpdater)?;
        let factor = self
            .valuation
            .update_di_factor(&self.terms, di_rate, now.date_naive())?;
        self.event_sink.emit(DomainEvent::DiFactorUpdated {
            debenture_id: self.id,
            factor,
        });
        Ok(factor)
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Records the coupon that just became due.
    ///
    /// Computes the amount via the valuation engine, folds in the first
    /// unexecuted amortization entry due by `now`, appends the record, and
    /// resets the DI factor to exactly 1.0 for DI-linked debentures. The
    /// folded amortization entry is not marked executed; execution remains an
    /// explicit issuer act.
    ///
    /// Returns the new record's index.
    pub fn record_coupon(&mut self, now: DateTime<Utc>) -> Result<usize> {
        self.require_active()?;
        let today = now.date_naive();
        let next_due = self.next_coupon_date();
        if today < next_due {
            return Err(LifecycleError::CouponNotDue {
                next_due,
                today,
            }
            .into());
        }

        let quote = self.valuation.next_coupon(&self.terms, self.oracle.as_ref())?;
        let amort_amount = self
            .schedule
            .iter()
            .find(|entry| !entry.executed && entry.due_date <= today)
            .map(|entry| self.amortization_amount(entry.basis))
            .unwrap_or(0);

        let index = self.coupons.len();
        self.coupons.push(CouponRecord {
            record_date: today,
            payment_date: None,
            rate_bps_used: quote.rate_bps_used,
            index_value_used: quote.index_value_used,
            coupon_amount_per_unit: quote.amount_per_unit,
            amort_amount_per_unit: amort_amount,
            calculated: true,
            paid: false,
        });
        if self.terms.rate_link.is_di_linked() {
            self.valuation.reset_di_factor(today);
            debug_assert_eq!(self.valuation.di.factor, FACTOR_PRECISION);
        }
        info!(
            "Recorded coupon {} for {}: {} + {} amort per unit",
            index, self.terms.isin, quote.amount_per_unit, amort_amount
        );
        self.event_sink.emit(DomainEvent::CouponRecorded {
            debenture_id: self.id,
            index,
            coupon_amount_per_unit: quote.amount_per_unit,
            amort_amount_per_unit: amort_amount,
        });
        Ok(index)
    }

    /// Issuer funds a recorded coupon.
    ///
    /// Pulls `(coupon + amort) x units / 1e6` into custody before marking the
    /// record paid; a failed pull leaves the record unpaid.
    pub async fn pay_coupon(&mut self, caller: &str, index: usize, now: DateTime<Utc>) -> Result<i128> {
        self.require_capability(caller, Role::Issuer)?;
        let record = self
            .coupons
            .get(index)
            .ok_or(LifecycleError::CouponNotFound(index))?;
        if !record.calculated {
            return Err(LifecycleError::CouponNotCalculated(index).into());
        }
        if record.paid {
            return Err(LifecycleError::AlreadyPaid(index).into());
        }

        let total = mul_div(
            record.total_per_unit(),
            self.terms.unit_count as i128,
            PU_PRECISION,
        );
        self.custody.pull(caller, total).await?;
        self.custody_balance += total;
        let record = &mut self.coupons[index];
        record.paid = true;
        record.payment_date = Some(now.date_naive());
        self.event_sink.emit(DomainEvent::CouponPaid {
            debenture_id: self.id,
            index,
            total_amount: total,
        });
        Ok(total)
    }

    /// Holder claims their share of one paid coupon.
    ///
    /// Amount is `(coupon + amort) x holder balance / 1e6`. The claim policy
    /// decides eligibility: unordered tracks a per-index set, ordered
    /// enforces a monotonic cursor.
    pub async fn claim_coupon(&mut self, holder: &str, index: usize) -> Result<i128> {
        let record = self
            .coupons
            .get(index)
            .ok_or(LifecycleError::CouponNotFound(index))?;
        if !record.paid {
            return Err(LifecycleError::CouponNotPaid(index).into());
        }
        self.claims.check(holder, index)?;

        let balance = self.ledger.balance_of(holder) as i128;
        let amount = mul_div(record.total_per_unit(), balance, PU_PRECISION);
        if amount > self.custody_balance {
            return Err(LifecycleError::InsufficientCustody {
                available: self.custody_balance,
                required: amount,
            }
            .into());
        }
        self.custody.push(holder, amount).await?;
        self.custody_balance -= amount;
        self.claims.commit(holder, index);
        debug!("Holder {holder} claimed {amount} from coupon {index}");
        self.event_sink.emit(DomainEvent::CouponClaimed {
            debenture_id: self.id,
            index,
            holder: holder.to_string(),
            amount,
        });
        Ok(amount)
    }

    /// Claims every coupon the holder is eligible for.
    ///
    /// Under the ordered policy this stops at the first unpaid record and
    /// never skips past it. Returns the total amount claimed, zero when
    /// nothing was eligible.
    pub async fn claim_all(&mut self, holder: &str) -> Result<i128> {
        let mut total = 0i128;
        for index in 0..self.coupons.len() {
            if !self.coupons[index].paid {
                // The ordered cursor must not advance past an unpaid coupon.
                if matches!(self.claims, ClaimState::Ordered { .. }) {
                    break;
                }
                continue;
            }
            if self.claims.has_claimed(holder, index) {
                continue;
            }
            total += self.claim_coupon(holder, index).await?;
        }
        Ok(total)
    }

    // =========================================================================
    // Amortization
    // =========================================================================

    /// Appends one schedule entry. Dates must stay strictly ascending.
    pub fn add_amortization_entry(
        &mut self,
        caller: &str,
        entry: AmortizationEntry,
    ) -> Result<()> {
        self.require_capability(caller, Role::Issuer)?;
        if entry.executed {
            return Err(LifecycleError::NonAscendingSchedule.into());
        }
        if entry.basis.is_negative() {
            return Err(LifecycleError::NegativeAmortization.into());
        }
        if let Some(last) = self.schedule.last() {
            if entry.due_date <= last.due_date {
                return Err(LifecycleError::NonAscendingSchedule.into());
            }
        }
        self.schedule.push(entry);
        self.event_sink.emit(DomainEvent::ScheduleChanged {
            debenture_id: self.id,
        });
        Ok(())
    }

    /// Swaps the whole schedule.
    ///
    /// Only available under the replaceable policy, and only before any entry
    /// has been executed.
    pub fn replace_schedule(
        &mut self,
        caller: &str,
        entries: Vec<AmortizationEntry>,
    ) -> Result<()> {
        self.require_capability(caller, Role::Issuer)?;
        if self.terms.schedule_policy != SchedulePolicy::Replaceable {
            return Err(LifecycleError::ScheduleNotReplaceable.into());
        }
        if self.schedule.iter().any(|entry| entry.executed) {
            return Err(LifecycleError::ScheduleNotReplaceable.into());
        }
        let ascending = entries
            .windows(2)
            .all(|pair| pair[0].due_date < pair[1].due_date);
        if !ascending || entries.iter().any(|entry| entry.executed) {
            return Err(LifecycleError::NonAscendingSchedule.into());
        }
        if entries.iter().any(|entry| entry.basis.is_negative()) {
            return Err(LifecycleError::NegativeAmortization.into());
        }
        self.schedule = entries;
        self.event_sink.emit(DomainEvent::ScheduleChanged {
            debenture_id: self.id,
        });
        Ok(())
    }

    /// Executes one due amortization entry: computes the amount from its
    /// basis, decrements VNA by it, marks the entry executed.
    ///
    /// Returns the amount per unit. VNA decreases monotonically through
    /// amortization, independent of indexation gains.
    pub fn execute_amortization(
        &mut self,
        caller: &str,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<i128> {
        self.require_capability(caller, Role::Issuer)?;
        self.require_active()?;
        let today = now.date_naive();
        let entry = self
            .schedule
            .get(index)
            .ok_or(LifecycleError::AmortizationNotFound(index))?;
        if entry.executed {
            return Err(LifecycleError::AlreadyExecuted(index).into());
        }
        if today < entry.due_date {
            return Err(LifecycleError::AmortizationNotDue {
                due: entry.due_date,
                today,
            }
            .into());
        }

        let amount = self.amortization_amount(entry.basis);
        if amount < 0 {
            return Err(LifecycleError::NegativeAmortization.into());
        }
        if amount > self.valuation.vna.value {
            return Err(LifecycleError::AmortizationExceedsVna {
                amount,
                vna: self.valuation.vna.value,
            }
            .into());
        }
        let new_vna = self.valuation.amortize(amount);
        self.schedule[index].executed = true;
        self.event_sink.emit(DomainEvent::AmortizationExecuted {
            debenture_id: self.id,
            index,
            amount_per_unit: amount,
            new_vna,
        });
        Ok(amount)
    }

    /// Amount per unit an entry's basis resolves to against current state.
    fn amortization_amount(&self, basis: AmortizationBasis) -> i128 {
        match basis {
            AmortizationBasis::PercentOfVne { bps } => mul_div(
                self.valuation.vne(),
                bps as i128,
                crate::constants::BPS_DENOMINATOR,
            ),
            AmortizationBasis::PercentOfVna { bps } => mul_div(
                self.valuation.vna.value,
                bps as i128,
                crate::constants::BPS_DENOMINATOR,
            ),
            AmortizationBasis::FixedValue { value } => value,
        }
    }

    // =========================================================================
    // Status Transitions
    // =========================================================================

    /// Marks the debenture matured once the maturity date is reached.
    pub fn mature(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require_active()?;
        let today = now.date_naive();
        if today < self.terms.maturity_date {
            return Err(LifecycleError::MaturityNotReached {
                maturity: self.terms.maturity_date,
                today,
            }
            .into());
        }
        self.transition(DebentureStatus::Matured);
        Ok(())
    }

    /// Trustee declares an event of default.
    pub fn declare_default(&mut self, caller: &str) -> Result<()> {
        self.require_capability(caller, Role::Trustee)?;
        self.require_active()?;
        self.transition(DebentureStatus::Defaulted);
        Ok(())
    }

    /// Issuer redeems the whole series early at `price_per_unit` (6 dec).
    ///
    /// Requires the early-redemption clause. The redemption amount is pulled
    /// into custody before the status flips.
    pub async fn early_redeem(&mut self, caller: &str, price_per_unit: i128) -> Result<()> {
        self.require_capability(caller, Role::Issuer)?;
        self.require_active()?;
        if !self.terms.early_redemption_allowed {
            return Err(LifecycleError::ClauseNotEnabled("early redemption".to_string()).into());
        }
        let total = mul_div(price_per_unit, self.terms.unit_count as i128, PU_PRECISION);
        self.custody.pull(caller, total).await?;
        self.custody_balance += total;
        self.transition(DebentureStatus::EarlyRedeemed);
        Ok(())
    }

    /// Issuer renegotiates the rate link and maturity.
    ///
    /// Requires the repactuation clause. Allowed from Active and from
    /// Repactuated, so terms can be renegotiated more than once. Resets the
    /// DI accumulation when the new link is DI-linked.
    pub fn repactuate(
        &mut self,
        caller: &str,
        new_link: RateLink,
        new_maturity: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_capability(caller, Role::Issuer)?;
        if !matches!(
            self.status,
            DebentureStatus::Active | DebentureStatus::Repactuated
        ) {
            return Err(LifecycleError::NotActive(self.status).into());
        }
        if !self.terms.repactuation_allowed {
            return Err(LifecycleError::ClauseNotEnabled("repactuation".to_string()).into());
        }
        if new_maturity <= self.terms.issue_date {
            return Err(crate::errors::TermsError::MaturityBeforeIssue {
                issue: self.terms.issue_date,
                maturity: new_maturity,
            }
            .into());
        }
        self.terms.rate_link = new_link;
        self.terms.maturity_date = new_maturity;
        if new_link.is_di_linked() {
            self.valuation.reset_di_factor(now.date_naive());
        }
        self.transition(DebentureStatus::Repactuated);
        Ok(())
    }

    // =========================================================================
    // Custody
    // =========================================================================

    /// Issuer deposits extra payment funds into custody.
    pub async fn deposit(&mut self, caller: &str, amount: i128) -> Result<()> {
        self.require_capability(caller, Role::Issuer)?;
        self.custody.pull(caller, amount).await?;
        self.custody_balance += amount;
        Ok(())
    }

    /// Issuer withdraws unencumbered funds from custody.
    pub async fn withdraw(&mut self, caller: &str, amount: i128) -> Result<()> {
        self.require_capability(caller, Role::Issuer)?;
        if amount > self.custody_balance {
            return Err(LifecycleError::InsufficientCustody {
                available: self.custody_balance,
                required: amount,
            }
            .into());
        }
        self.custody.push(caller, amount).await?;
        self.custody_balance -= amount;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn last_coupon_date(&self) -> NaiveDate {
        self.coupons
            .last()
            .map(|record| record.record_date)
            .unwrap_or(self.terms.issue_date)
    }

    fn require_active(&self) -> Result<()> {
        if self.status != DebentureStatus::Active {
            return Err(LifecycleError::NotActive(self.status).into());
        }
        Ok(())
    }

    fn require_capability(&self, principal: &str, role: Role) -> Result<()> {
        if !self.authorization.has_capability(principal, role) {
            return Err(Error::Unauthorized {
                principal: principal.to_string(),
                role,
            });
        }
        Ok(())
    }

    fn transition(&mut self, new_status: DebentureStatus) {
        let old_status = self.status;
        self.status = new_status;
        info!(
            "Debenture {} status: {:?} -> {:?}",
            self.terms.isin, old_status, new_status
        );
        self.event_sink.emit(DomainEvent::StatusChanged {
            debenture_id: self.id,
            old_status,
            new_status,
        });
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Single-writer handle for one debenture instance.
///
/// All mutating calls go through the async lock, giving the
/// run-to-completion atomicity the aggregate assumes. Clone freely; clones
/// share the same instance.
#[derive(Clone)]
pub struct DebentureHandle {
    inner: Arc<tokio::sync::Mutex<Debenture>>,
}

impl DebentureHandle {
    pub fn new(debenture: Debenture) -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(debenture)),
        }
    }

    /// Exclusive access for a mutation or a consistent multi-field read.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Debenture> {
        self.inner.lock().await
    }

    /// Consistent point-in-time view.
    pub async fn snapshot(&self) -> DebentureSnapshot {
        self.inner.lock().await.snapshot()
    }
}
