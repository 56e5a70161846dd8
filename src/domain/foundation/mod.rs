//! Foundation module - Shared domain primitives.
//!
//! Identifiers, time, error vocabulary, pagination and the state machine
//! contract used by the subscription and tenant modules.

mod errors;
mod ids;
mod pagination;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{SubscriptionId, TenantConfigId, UserId};
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
