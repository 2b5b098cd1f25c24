//! The DAO dashboard header.
//!
//! [`DaoHeader`] shows a DAO's name, member count, reputation supply and token
//! holdings. Every ledger-backed value is owned by its own
//! [`SubscriptionBinder`], so a balance that is still loading or failed only
//! affects its own line.

pub mod units;

use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, List, ListItem, Paragraph, Widget, Wrap};

use crate::config::{DashboardConfig, TokenInfo};
use crate::ledger::{Balance, DaoState, Ledger, Page, Scheme};
use crate::subscription::source::{Source, SourceError};
use crate::subscription::{Phase, SubscriptionBinder, SubscriptionSpec};

use self::units::format_units;

const ETH_DECIMALS: u32 = 18;
const REP_DECIMALS: u32 = 18;
const DISPLAY_FRACTION: u32 = 2;

/// A signal attached to the DAO; its name, when present, replaces the DAO's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub id: String,
    pub name: Option<String>,
}

/// Input of the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProps {
    pub dao: DaoState,
    pub signal: Option<Signal>,
}

impl HeaderProps {
    #[must_use]
    pub fn new(dao: DaoState) -> Self {
        Self { dao, signal: None }
    }

    /// The signal's name if it has one, else the DAO's.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.signal
            .as_ref()
            .and_then(|signal| signal.name.as_deref())
            .unwrap_or(&self.dao.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenProps {
    dao: DaoState,
    token: TokenInfo,
}

type SummaryBinder = SubscriptionBinder<HeaderProps, Vec<Scheme>, Text<'static>>;
type BalanceBinder<P> = SubscriptionBinder<P, Balance, Option<Line<'static>>>;

struct TokenBalance {
    info: TokenInfo,
    binder: BalanceBinder<TokenProps>,
}

impl TokenBalance {
    fn props(&self, dao: &DaoState) -> TokenProps {
        TokenProps {
            dao: dao.clone(),
            token: self.info.clone(),
        }
    }
}

/// Header widget for one DAO.
///
/// Drive it like a [`SubscriptionBinder`]: [`attach`](Self::attach) once,
/// [`on_props_changed`](Self::on_props_changed) on every update,
/// [`sync`](Self::sync) before drawing and [`detach`](Self::detach) at the end.
pub struct DaoHeader {
    summary: SummaryBinder,
    eth: BalanceBinder<DaoState>,
    tokens: Vec<TokenBalance>,
    props: Option<HeaderProps>,
}

impl DaoHeader {
    #[must_use]
    pub fn new(config: &DashboardConfig, ledger: Arc<dyn Ledger>) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|info| TokenBalance {
                info: info.clone(),
                binder: SubscriptionBinder::new(token_spec(config, ledger.clone())),
            })
            .collect();

        Self {
            summary: SubscriptionBinder::new(summary_spec(ledger.clone())),
            eth: SubscriptionBinder::new(eth_spec(config, ledger)),
            tokens,
            props: None,
        }
    }

    pub fn attach(&mut self, props: HeaderProps) {
        tracing::debug!(dao = %props.dao.address, "attaching header");
        self.summary.attach(props.clone());
        self.eth.attach(props.dao.clone());
        for token in &mut self.tokens {
            let token_props = token.props(&props.dao);
            token.binder.attach(token_props);
        }
        self.props = Some(props);
    }

    /// Ignored while detached.
    pub fn on_props_changed(&mut self, props: HeaderProps) {
        if self.props.is_none() {
            tracing::trace!("header props changed while detached, ignoring");
            return;
        }
        self.summary.on_props_changed(props.clone());
        self.eth.on_props_changed(props.dao.clone());
        for token in &mut self.tokens {
            let token_props = token.props(&props.dao);
            token.binder.on_props_changed(token_props);
        }
        self.props = Some(props);
    }

    pub fn detach(&mut self) {
        self.summary.detach();
        self.eth.detach();
        for token in &mut self.tokens {
            token.binder.detach();
        }
        self.props = None;
    }

    /// Applies pending emissions of every binder. Returns `true` if anything changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = self.summary.sync();
        changed |= self.eth.sync();
        for token in &mut self.tokens {
            changed |= token.binder.sync();
        }
        changed
    }

    #[must_use]
    pub const fn props(&self) -> Option<&HeaderProps> {
        self.props.as_ref()
    }

    #[must_use]
    pub const fn summary_phase(&self) -> Phase {
        self.summary.phase()
    }

    #[must_use]
    pub const fn eth_phase(&self) -> Phase {
        self.eth.phase()
    }

    /// Phase of the balance binder of the token with `symbol`.
    #[must_use]
    pub fn token_phase(&self, symbol: &str) -> Option<Phase> {
        self.tokens
            .iter()
            .find(|token| token.info.symbol == symbol)
            .map(|token| token.binder.phase())
    }

    /// The name, member and scheme block.
    #[must_use]
    pub fn summary(&self) -> Text<'static> {
        self.summary.render()
    }

    /// One line per visible holding: reputation, ETH, then tokens.
    #[must_use]
    pub fn holdings(&self) -> Vec<Line<'static>> {
        let Some(props) = self.props.as_ref() else {
            return Vec::new();
        };

        let reputation = format_units(
            props.dao.reputation_total_supply,
            REP_DECIMALS,
            DISPLAY_FRACTION,
        );
        std::iter::once(Some(Line::from(format!("{reputation} REP"))))
            .chain(std::iter::once(self.eth.render()))
            .chain(self.tokens.iter().map(|token| token.binder.render()))
            .flatten()
            .collect()
    }
}

impl Widget for &DaoHeader {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(props) = self.props.as_ref() else {
            return;
        };

        let block = Block::bordered().title(Line::from(props.display_name().to_string()).bold());
        let inner = block.inner(area);
        block.render(area, buf);

        let [info, holdings] =
            Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(inner);

        Paragraph::new(self.summary())
            .wrap(Wrap { trim: true })
            .render(info, buf);

        let items: Vec<ListItem> = self.holdings().into_iter().map(ListItem::new).collect();
        List::new(items)
            .block(Block::new().title("Holdings".bold()))
            .render(holdings, buf);
    }
}

fn summary_spec(ledger: Arc<dyn Ledger>) -> SubscriptionSpec<HeaderProps, Vec<Scheme>, Text<'static>> {
    SubscriptionSpec::new(
        move |props: &HeaderProps| ledger.schemes(&props.dao.address),
        |props, sub| summary_text(props, sub.data),
    )
    .on_loading(|props| Text::from(format!("Loading {}…", props.display_name())))
    .on_error(|props, error| {
        Text::from(vec![
            Line::from(props.display_name().to_string()).bold(),
            Line::from(format!("Could not load DAO: {error}")),
        ])
    })
    .resubscribe_when(|old, new| old.dao.address != new.dao.address)
}

fn summary_text(props: &HeaderProps, schemes: &[Scheme]) -> Text<'static> {
    let dao = &props.dao;
    let schemes = match schemes.len() {
        1 => "1 scheme".to_string(),
        n => format!("{n} schemes"),
    };

    Text::from(vec![
        Line::from(props.display_name().to_string()).bold(),
        Line::from(format!("{} Reputation Holders", dao.member_count)),
        Line::from(schemes),
        Line::default(),
        Line::from(format!("This is the {} Header", dao.name)).italic(),
        Line::from(format!(
            "{} is an independent, global community of people working together to build \
             and promote Decentralized Autonomous Organizations (DAOs). It's the perfect \
             place to get involved with DAOstack.",
            dao.name
        )),
    ])
}

fn eth_spec(
    config: &DashboardConfig,
    ledger: Arc<dyn Ledger>,
) -> SubscriptionSpec<DaoState, Balance, Option<Line<'static>>> {
    let symbol = config.base_token.clone();
    let loading_symbol = config.base_token.clone();

    SubscriptionSpec::new(
        move |dao: &DaoState| ledger.eth_balance(&dao.address),
        move |_, sub| {
            let amount = format_units(*sub.data, ETH_DECIMALS, DISPLAY_FRACTION);
            Some(Line::from(format!("{amount} {symbol}")))
        },
    )
    .on_loading(move |_| Some(Line::from(format!("... {loading_symbol}"))))
    .resubscribe_when(|old, new| old.address != new.address)
}

fn token_spec(
    config: &DashboardConfig,
    ledger: Arc<dyn Ledger>,
) -> SubscriptionSpec<TokenProps, Balance, Option<Line<'static>>> {
    let governance = config.governance_token.clone();
    let page = Page::first(config.member_page);

    SubscriptionSpec::new(
        move |props: &TokenProps| token_source(&ledger, props, page),
        move |props, sub| token_line(&props.token, *sub.data, &governance),
    )
    .resubscribe_when(|old, new| {
        old.dao.address != new.dao.address || old.token.address != new.token.address
    })
}

/// Waits for the first page of members, which warms the ledger for this DAO,
/// before subscribing to the balance.
fn token_source(
    ledger: &Arc<dyn Ledger>,
    props: &TokenProps,
    page: Page,
) -> Result<Source<Balance>, SourceError> {
    let members = ledger.members(&props.dao.address, page)?;
    let ledger = Arc::clone(ledger);
    let token = props.token.address();
    let owner = props.dao.address.clone();

    Ok(Source::deferred(async move {
        members.first().await?;
        ledger.token_balance(&token, &owner)
    }))
}

/// Zero balances are hidden, except for the governance token.
fn token_line(token: &TokenInfo, balance: Balance, governance: &str) -> Option<Line<'static>> {
    if balance == 0 && token.symbol != governance {
        return None;
    }
    let amount = format_units(balance, token.decimals, DISPLAY_FRACTION);
    Some(Line::from(format!("{amount} {}", token.symbol)))
}
