use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use super::{Address, Balance, Ledger, Page, Scheme};
use crate::subscription::source::{Source, SourceError};

#[derive(Debug, Default)]
struct Tables {
    schemes: DashMap<Address, Vec<Scheme>>,
    eth: DashMap<Address, Balance>,
    members: DashMap<Address, Vec<Address>>,
    tokens: DashMap<(Address, Address), Balance>,
    offline: AtomicBool,
    queries: AtomicUsize,
}

impl Tables {
    fn check_online(&self) -> Result<(), SourceError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(SourceError::new("ledger offline"))
        } else {
            Ok(())
        }
    }
}

/// In-process ledger whose queries poll shared tables.
///
/// Clones share the same tables, so a test or demo can keep one clone to
/// mutate balances while the header subscribes through another. Missing
/// entries read as zero or empty.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    tables: Arc<Tables>,
    poll_interval: Duration,
}

impl MemoryLedger {
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            tables: Arc::new(Tables::default()),
            poll_interval,
        }
    }

    pub fn set_schemes(&self, dao: &Address, schemes: Vec<Scheme>) {
        self.tables.schemes.insert(dao.clone(), schemes);
    }

    pub fn set_eth_balance(&self, dao: &Address, balance: Balance) {
        self.tables.eth.insert(dao.clone(), balance);
    }

    pub fn set_members(&self, dao: &Address, members: Vec<Address>) {
        self.tables.members.insert(dao.clone(), members);
    }

    pub fn set_token_balance(&self, token: &Address, owner: &Address, balance: Balance) {
        self.tables
            .tokens
            .insert((token.clone(), owner.clone()), balance);
    }

    /// While offline, new queries fail immediately and running ones fail on
    /// their next poll.
    pub fn set_offline(&self, offline: bool) {
        self.tables.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of queries issued so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.tables.queries.load(Ordering::SeqCst)
    }

    fn query<V, F>(&self, read: F) -> Result<Source<V>, SourceError>
    where
        V: Clone + PartialEq + Send + 'static,
        F: Fn(&Tables) -> V + Send + 'static,
    {
        self.tables.check_online()?;
        self.tables.queries.fetch_add(1, Ordering::SeqCst);

        let tables = self.tables.clone();
        Ok(Source::poll(self.poll_interval, move || {
            tables.check_online()?;
            Ok(read(tables.as_ref()))
        }))
    }
}

impl Ledger for MemoryLedger {
    fn schemes(&self, dao: &Address) -> Result<Source<Vec<Scheme>>, SourceError> {
        let dao = dao.clone();
        self.query(move |tables| {
            tables
                .schemes
                .get(&dao)
                .map(|schemes| schemes.value().clone())
                .unwrap_or_default()
        })
    }

    fn eth_balance(&self, dao: &Address) -> Result<Source<Balance>, SourceError> {
        let dao = dao.clone();
        self.query(move |tables| tables.eth.get(&dao).map_or(0, |balance| *balance))
    }

    fn members(&self, dao: &Address, page: Page) -> Result<Source<Vec<Address>>, SourceError> {
        let dao = dao.clone();
        self.query(move |tables| {
            tables
                .members
                .get(&dao)
                .map(|members| members.iter().skip(page.skip).take(page.first).cloned().collect())
                .unwrap_or_default()
        })
    }

    fn token_balance(&self, token: &Address, owner: &Address) -> Result<Source<Balance>, SourceError> {
        let key = (token.clone(), owner.clone());
        self.query(move |tables| tables.tokens.get(&key).map_or(0, |balance| *balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::time::timeout;

    fn dao() -> Address {
        Address::from("0xdao")
    }

    #[tokio::test]
    async fn test_missing_entries_read_as_empty() {
        let ledger = MemoryLedger::new(Duration::from_millis(10));
        let balance = ledger.eth_balance(&dao()).expect("online").first().await;
        let schemes = ledger.schemes(&dao()).expect("online").first().await;

        assert_eq!(balance, Ok(0));
        assert_eq!(schemes, Ok(Vec::new()));
        assert_eq!(ledger.query_count(), 2);
    }

    #[tokio::test]
    async fn test_members_are_paged() {
        let ledger = MemoryLedger::new(Duration::from_millis(10));
        let members: Vec<Address> = ["0xa", "0xb", "0xc"].into_iter().map(Address::from).collect();
        ledger.set_members(&dao(), members);

        let page = Page { first: 2, skip: 1 };
        let result = ledger.members(&dao(), page).expect("online").first().await;
        assert_eq!(result, Ok(vec![Address::from("0xb"), Address::from("0xc")]));
    }

    #[tokio::test]
    async fn test_token_balance_is_keyed_by_token_and_owner() {
        let ledger = MemoryLedger::new(Duration::from_millis(10));
        let token = Address::from("0xgen");
        ledger.set_token_balance(&token, &dao(), 5);

        let owned = ledger.token_balance(&token, &dao()).expect("online").first().await;
        let other = ledger
            .token_balance(&token, &Address::from("0xother"))
            .expect("online")
            .first()
            .await;
        assert_eq!(owned, Ok(5));
        assert_eq!(other, Ok(0));
    }

    #[tokio::test]
    async fn test_zero_poll_interval_does_not_panic() {
        let ledger = MemoryLedger::new(Duration::ZERO);
        ledger.set_eth_balance(&dao(), 9);
        let balance = ledger.eth_balance(&dao()).expect("online").first().await;
        assert_eq!(balance, Ok(9));
    }

    #[tokio::test]
    async fn test_offline_fails_new_queries() {
        let ledger = MemoryLedger::new(Duration::from_millis(10));
        ledger.set_offline(true);

        assert!(ledger.eth_balance(&dao()).is_err());
        assert_eq!(ledger.query_count(), 0);
    }

    #[tokio::test]
    async fn test_running_query_sees_updates_and_outage() {
        let ledger = MemoryLedger::new(Duration::from_millis(5));
        ledger.set_eth_balance(&dao(), 1);
        let mut stream = ledger
            .eth_balance(&dao())
            .expect("online")
            .open()
            .await
            .expect("plain stream");

        let first = timeout(Duration::from_secs(1), stream.next()).await.expect("first");
        assert_eq!(first, Some(Ok(1)));

        ledger.set_eth_balance(&dao(), 2);
        let second = timeout(Duration::from_secs(1), stream.next()).await.expect("update");
        assert_eq!(second, Some(Ok(2)));

        ledger.set_offline(true);
        let third = timeout(Duration::from_secs(1), stream.next()).await.expect("outage");
        assert_eq!(third, Some(Err(SourceError::new("ledger offline"))));
    }
}
