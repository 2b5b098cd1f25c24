//! Ledger client interface.
//!
//! The header only needs a handful of stateless queries, each returning a
//! [`Source`]. Protocol details stay behind the [`Ledger`] trait;
//! [`MemoryLedger`](memory::MemoryLedger) is an in-process implementation.

pub mod memory;

use std::fmt;

use crate::subscription::source::{Source, SourceError};

/// Account or contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Token amount in base units (wei for ETH).
pub type Balance = u128;

/// Snapshot of a DAO as known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoState {
    pub address: Address,
    pub name: String,
    pub member_count: u64,
    pub reputation_total_supply: Balance,
}

/// A scheme registered with a DAO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    pub id: String,
    pub name: String,
}

/// Pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub first: usize,
    pub skip: usize,
}

impl Page {
    #[must_use]
    pub const fn first(first: usize) -> Self {
        Self { first, skip: 0 }
    }
}

/// Queries the header subscribes to.
///
/// Implementations fail synchronously when a query cannot even be issued, and
/// through the returned source once it is running.
pub trait Ledger: Send + Sync {
    /// Schemes registered with `dao`.
    fn schemes(&self, dao: &Address) -> Result<Source<Vec<Scheme>>, SourceError>;

    /// Native currency balance of `dao`.
    fn eth_balance(&self, dao: &Address) -> Result<Source<Balance>, SourceError>;

    /// Member addresses of `dao`.
    fn members(&self, dao: &Address, page: Page) -> Result<Source<Vec<Address>>, SourceError>;

    /// Balance of `owner` in the ERC20-style `token`.
    fn token_balance(&self, token: &Address, owner: &Address) -> Result<Source<Balance>, SourceError>;
}
