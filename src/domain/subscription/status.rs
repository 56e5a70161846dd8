//! Subscription status state machine.
//!
//! Mirrors the gateway's subscription lifecycle:
//! `created -> authenticated -> active -> {paused <-> active} | cancelled | completed | expired`.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Local subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created at the gateway, mandate not yet authorized.
    /// Also the state a charge retry window falls back to.
    Created,

    /// Customer authorized the mandate; no recurring charge yet.
    Authenticated,

    /// Recurring charges are being collected.
    Active,

    /// Charging suspended; may resume.
    Paused,

    /// Cancelled by the merchant or the customer.
    Cancelled,

    /// All charges collected.
    Completed,

    /// Halted by the gateway after repeated charge failures.
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Created => "created",
            SubscriptionStatus::Authenticated => "authenticated",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Completed => "completed",
            SubscriptionStatus::Expired => "expired",
        }
    }

    /// Maps a status string reported by the gateway onto the local enum.
    ///
    /// The gateway has two states we fold: `pending` (charge retry) is
    /// tracked as `created` and `halted` as `expired`. Unknown values
    /// return `None`.
    pub fn from_gateway(status: &str) -> Option<Self> {
        match status {
            "created" | "pending" => Some(SubscriptionStatus::Created),
            "authenticated" => Some(SubscriptionStatus::Authenticated),
            "active" => Some(SubscriptionStatus::Active),
            "paused" => Some(SubscriptionStatus::Paused),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            "completed" => Some(SubscriptionStatus::Completed),
            "halted" | "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    /// Whether the mandate has been authorized at some point.
    pub fn is_authorized(&self) -> bool {
        !matches!(self, SubscriptionStatus::Created)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(SubscriptionStatus::Created),
            "authenticated" => Ok(SubscriptionStatus::Authenticated),
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "completed" => Ok(SubscriptionStatus::Completed),
            "expired" => Ok(SubscriptionStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From CREATED
            (Created, Authenticated)
                | (Created, Active)
                | (Created, Cancelled)
                | (Created, Expired)
            // From AUTHENTICATED
                | (Authenticated, Active)
                | (Authenticated, Created) // charge retry window
                | (Authenticated, Cancelled)
                | (Authenticated, Expired)
            // From ACTIVE
                | (Active, Paused)
                | (Active, Created) // charge retry window
                | (Active, Cancelled)
                | (Active, Completed)
                | (Active, Expired)
            // From PAUSED
                | (Paused, Active)
                | (Paused, Cancelled)
                | (Paused, Completed)
                | (Paused, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Created => vec![Authenticated, Active, Cancelled, Expired],
            Authenticated => vec![Active, Created, Cancelled, Expired],
            Active => vec![Paused, Created, Cancelled, Completed, Expired],
            Paused => vec![Active, Cancelled, Completed, Expired],
            Cancelled | Completed | Expired => vec![],
        }
    }
}
