//! # dao-header
//!
//! A terminal dashboard header for a DAO, built on [ratatui](https://ratatui.rs/).
//! It shows the DAO's name, member count, reputation supply and token holdings,
//! with every ledger-backed value streamed live.
//!
//! ## Architecture
//!
//! Values reach the screen through **subscription binders**:
//!
//! 1. **Source**: an async value stream produced from the current props
//! 2. **Binder**: owns one live subscription, tracks loading/ready/failed, and
//!    decides when new props require a fresh subscription
//! 3. **View**: a pure function from props and the latest value to output
//!
//! ## Core Components
//!
//! - [`SubscriptionBinder`](subscription::SubscriptionBinder): the binding state machine
//! - [`Source`](subscription::source::Source): async/streaming data sources
//! - [`Ledger`](ledger::Ledger): queries the header subscribes to
//! - [`DaoHeader`](header::DaoHeader): the header widget, composed of binders
//! - [`Runtime`](runtime::Runtime): draws the header on a terminal each frame
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dao_header::prelude::*;
//! use tokio::sync::watch;
//!
//! # async fn demo() -> color_eyre::Result<()> {
//! let config = DashboardConfig::default();
//! let ledger = MemoryLedger::new(config.poll_interval());
//! let header = DaoHeader::new(&config, Arc::new(ledger));
//!
//! let dao = DaoState {
//!     address: Address::from("0xdao"),
//!     name: "Genesis Alpha".to_string(),
//!     member_count: 42,
//!     reputation_total_supply: 0,
//! };
//! let (_props_tx, props_rx) = watch::channel(HeaderProps::new(dao));
//!
//! let mut terminal = ratatui::init();
//! let result = Runtime::new(header)
//!     .run(&mut terminal, props_rx, config.frame_rate)
//!     .await;
//! ratatui::restore();
//! result?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod header;
pub mod ledger;
pub mod prelude;
pub mod runtime;
pub mod subscription;
