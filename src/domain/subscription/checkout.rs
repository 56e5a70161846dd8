//! Checkout charge-schedule rules.
//!
//! Pure functions deciding the authorization charge, the first-charge
//! delay and the subscription start time for a new checkout.

use crate::domain::foundation::{Timestamp, ValidationError};
use std::fmt;

/// Authorization charge used when the caller does not specify one (1 rupee, in paise).
pub const DEFAULT_AUTHORIZATION_AMOUNT: i64 = 100;

/// First-charge delay used when the caller does not specify one.
pub const DEFAULT_FIRST_CHARGE_DELAY_DAYS: i64 = 1;

/// Charge count used when the caller does not specify one.
pub const DEFAULT_TOTAL_COUNT: u32 = 120;

/// Longest first-charge delay a caller may ask for (about ten years).
pub const MAX_FIRST_CHARGE_DELAY_DAYS: i64 = 3650;

/// Largest charge count or quantity; the local record stores both as 32-bit integers.
pub const MAX_COUNT: i64 = i32::MAX as i64;

/// Checkout links expire this many days after creation.
pub const CHECKOUT_LINK_TTL_DAYS: i64 = 7;

/// Smallest start offset the gateway accepts.
pub const MIN_START_OFFSET_HOURS: i64 = 1;

pub const DEFAULT_CURRENCY: &str = "INR";

pub const AUTHORIZATION_ADDON_NAME: &str = "Initial Charge";

/// Minor units per whole currency unit.
const MINOR_UNITS: i64 = 100;

/// Billing period of a gateway plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Other(String),
}

impl BillingPeriod {
    /// Case-insensitive; unrecognized periods are kept verbatim.
    pub fn parse(period: &str) -> Self {
        match period.trim().to_ascii_lowercase().as_str() {
            "daily" => BillingPeriod::Daily,
            "weekly" => BillingPeriod::Weekly,
            "monthly" => BillingPeriod::Monthly,
            "yearly" => BillingPeriod::Yearly,
            _ => BillingPeriod::Other(period.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BillingPeriod::Daily => "daily",
            BillingPeriod::Weekly => "weekly",
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Yearly => "yearly",
            BillingPeriod::Other(other) => other,
        }
    }

    /// Approximate length of one period in days. Unknown periods count as 30.
    pub fn days(&self) -> i64 {
        match self {
            BillingPeriod::Daily => 1,
            BillingPeriod::Weekly => 7,
            BillingPeriod::Monthly => 30,
            BillingPeriod::Yearly => 365,
            BillingPeriod::Other(_) => 30,
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the mandate authorization is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationCharge {
    /// No separate charge.
    None,
    /// One-time addon attached to the subscription, in minor units.
    Addon { amount: i64 },
    /// The plan's own first charge authorizes the mandate; nothing is attached.
    PlanAmount { amount: i64 },
}

impl AuthorizationCharge {
    /// Amount to attach as an addon item, if any.
    pub fn addon_amount(&self) -> Option<i64> {
        match self {
            AuthorizationCharge::Addon { amount } if *amount > 0 => Some(*amount),
            _ => None,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            AuthorizationCharge::None => 0,
            AuthorizationCharge::Addon { amount } | AuthorizationCharge::PlanAmount { amount } => {
                *amount
            }
        }
    }
}

/// Resolved authorization charge and first-charge delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeSchedule {
    pub authorization: AuthorizationCharge,
    pub first_charge_delay_days: i64,
}

/// Outcome of applying the caller's schedule options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Resolved(ChargeSchedule),
    /// Both options were explicitly zero; the plan decides amount and delay.
    FromPlan,
}

impl ChargeSchedule {
    /// Applies the caller's options.
    ///
    /// `initial_charge` is in whole currency units. Zero or negative means no
    /// addon. A negative delay falls back to the default; a delay above
    /// [`MAX_FIRST_CHARGE_DELAY_DAYS`] is rejected.
    pub fn decide(
        initial_charge: Option<i64>,
        first_charge_delay_days: Option<i64>,
    ) -> Result<ScheduleDecision, ValidationError> {
        if matches!(first_charge_delay_days, Some(days) if days > MAX_FIRST_CHARGE_DELAY_DAYS) {
            return Err(ValidationError::invalid_format(
                "first_charge_delay_days",
                format!("must be at most {} days", MAX_FIRST_CHARGE_DELAY_DAYS),
            ));
        }
        if initial_charge == Some(0) && first_charge_delay_days == Some(0) {
            return Ok(ScheduleDecision::FromPlan);
        }

        let authorization = match initial_charge {
            None => AuthorizationCharge::Addon {
                amount: DEFAULT_AUTHORIZATION_AMOUNT,
            },
            Some(units) if units <= 0 => AuthorizationCharge::None,
            Some(units) => AuthorizationCharge::Addon {
                amount: units.saturating_mul(MINOR_UNITS),
            },
        };

        let first_charge_delay_days = match first_charge_delay_days {
            Some(days) if days >= 0 => days,
            _ => DEFAULT_FIRST_CHARGE_DELAY_DAYS,
        };

        Ok(ScheduleDecision::Resolved(ChargeSchedule {
            authorization,
            first_charge_delay_days,
        }))
    }

    /// Schedule for the "charge the full plan now" case.
    pub fn from_plan(plan_amount: i64, period: &BillingPeriod) -> Self {
        ChargeSchedule {
            authorization: AuthorizationCharge::PlanAmount {
                amount: plan_amount,
            },
            first_charge_delay_days: period.days(),
        }
    }

    /// Subscription start time. An explicit caller value always wins.
    pub fn start_at(
        &self,
        now: Timestamp,
        explicit: Option<Timestamp>,
    ) -> Result<Timestamp, ValidationError> {
        if let Some(start) = explicit {
            return Ok(start);
        }
        let start = if self.first_charge_delay_days > 0 {
            now.plus_days(self.first_charge_delay_days)
        } else {
            now.plus_hours(MIN_START_OFFSET_HOURS)
        };
        start.ok_or_else(|| {
            ValidationError::invalid_format("first_charge_delay_days", "start time out of range")
        })
    }
}

/// Expiry of the hosted checkout link.
pub fn checkout_link_expiry(now: Timestamp) -> Result<Timestamp, ValidationError> {
    now.plus_days(CHECKOUT_LINK_TTL_DAYS)
        .ok_or_else(|| ValidationError::invalid_format("expire_by", "out of range"))
}

/// Charge count sent to the gateway; non-positive values use the default.
pub fn effective_total_count(requested: Option<i64>) -> Result<u32, ValidationError> {
    bounded_count("total_count", requested, DEFAULT_TOTAL_COUNT)
}

/// Quantity sent to the gateway; non-positive values use 1.
pub fn effective_quantity(requested: Option<i64>) -> Result<u32, ValidationError> {
    bounded_count("quantity", requested, 1)
}

fn bounded_count(field: &str, requested: Option<i64>, default: u32) -> Result<u32, ValidationError> {
    match requested {
        Some(value) if value > MAX_COUNT => Err(ValidationError::invalid_format(
            field,
            format!("must be at most {}", MAX_COUNT),
        )),
        Some(value) if value > 0 => Ok(value as u32),
        _ => Ok(default),
    }
}

/// Trims the plan identifier and rejects blanks.
pub fn normalize_plan_id(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("plan_id"));
    }
    Ok(trimmed.to_string())
}
