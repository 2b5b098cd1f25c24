//! Prelude module for convenient imports.
//!
//! ```
//! use dao_header::prelude::*;
//! ```
//!
//! # What's included
//!
//! - [`SubscriptionBinder`], [`SubscriptionSpec`], [`Subscribed`], [`Phase`] and [`BindError`]
//! - [`Source`] and [`SourceError`]
//! - [`DaoHeader`], [`HeaderProps`] and [`Signal`]
//! - [`Ledger`], [`MemoryLedger`] and the ledger data types
//! - [`DashboardConfig`]
//! - [`Runtime`]

pub use crate::config::{DashboardConfig, TokenInfo};
pub use crate::header::{DaoHeader, HeaderProps, Signal};
pub use crate::ledger::memory::MemoryLedger;
pub use crate::ledger::{Address, Balance, DaoState, Ledger, Page, Scheme};
pub use crate::runtime::Runtime;
pub use crate::subscription::source::{Source, SourceError};
pub use crate::subscription::{BindError, Phase, Subscribed, SubscriptionBinder, SubscriptionSpec};
