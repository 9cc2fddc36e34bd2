//! Core Kernel - Foundational types for the loan billing system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money in integer minor units and interest rates with exact decimal arithmetic
//! - Clock abstraction and calendar-week helpers
//! - Strongly-typed identifiers
//! - Port error and health-check types for adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Rate, MoneyError};
pub use temporal::{Clock, SystemClock, ManualClock, TemporalError};
pub use identifiers::{BillableId, PaymentId};
pub use ports::{PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable};
pub use error::CoreError;
