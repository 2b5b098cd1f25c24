use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use dao_header::prelude::*;
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::prelude::CrosstermBackend;
use tokio::sync::watch;
use tokio::time::{Duration, interval};
use tokio_util::sync::CancellationToken;

const ETHER: Balance = 1_000_000_000_000_000_000;

fn daos() -> [DaoState; 2] {
    [
        DaoState {
            address: Address::from("0x294f999356ed03347c7a23bcbcf8d33fa41dc830"),
            name: "Genesis Alpha".to_string(),
            member_count: 158,
            reputation_total_supply: 1_000_000 * ETHER,
        },
        DaoState {
            address: Address::from("0xa3f5411cfc9eee0dd108bf0d07433b6dd99037f1"),
            name: "Identity".to_string(),
            member_count: 12,
            reputation_total_supply: 2_400 * ETHER,
        },
    ]
}

fn seed(ledger: &MemoryLedger, config: &DashboardConfig) {
    for (index, dao) in daos().iter().enumerate() {
        let schemes = (0..=index)
            .map(|id| Scheme {
                id: id.to_string(),
                name: format!("Scheme {id}"),
            })
            .collect();
        ledger.set_schemes(&dao.address, schemes);
        ledger.set_members(&dao.address, vec![Address::from("0x1"), Address::from("0x2")]);
        ledger.set_eth_balance(&dao.address, 12 * ETHER / (index as u128 + 1));
        for token in &config.tokens {
            ledger.set_token_balance(&token.address(), &dao.address, 500 * ETHER);
        }
    }
}

/// Grows the first DAO's ETH balance so updates are visible.
async fn simulate_deposits(ledger: MemoryLedger, shutdown: CancellationToken) {
    let dao = daos()[0].address.clone();
    let mut balance = 12 * ETHER;
    let mut ticker = interval(Duration::from_secs(2));
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                balance += ETHER / 4;
                ledger.set_eth_balance(&dao, balance);
            }
        }
    }
}

/// `q`, `Esc` or `Ctrl-C` quits; `n` switches to the next DAO.
async fn handle_input(props: watch::Sender<HeaderProps>, shutdown: CancellationToken) {
    let daos = daos();
    let mut current = 0;
    let mut events = EventStream::new();

    loop {
        let event = tokio::select! {
            () = shutdown.cancelled() => break,
            _ = tokio::signal::ctrl_c() => {
                shutdown.cancel();
                break;
            }
            event = events.next() => event,
        };

        let key = match event {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => key,
            Some(_) => continue,
            None => {
                shutdown.cancel();
                break;
            }
        };

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => shutdown.cancel(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => shutdown.cancel(),
            KeyCode::Char('n') => {
                current = (current + 1) % daos.len();
                let _ = props.send(HeaderProps::new(daos[current].clone()));
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = match std::env::args().nth(1) {
        Some(path) => DashboardConfig::load(PathBuf::from(path))?,
        None => DashboardConfig::default(),
    };

    let ledger = MemoryLedger::new(config.poll_interval());
    seed(&ledger, &config);

    let header = DaoHeader::new(&config, Arc::new(ledger.clone()));
    let runtime = Runtime::new(header);
    let shutdown = runtime.shutdown_token();
    let (props_tx, props_rx) = watch::channel(HeaderProps::new(daos()[0].clone()));

    tokio::spawn(simulate_deposits(ledger, shutdown.clone()));
    tokio::spawn(handle_input(props_tx, shutdown));

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = runtime.run(&mut terminal, props_rx, config.frame_rate).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|_| ())
}
