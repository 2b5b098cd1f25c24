// Integration tests for Runtime::run
// These drive the whole loop against a TestBackend and inspect the last frame.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use dao_header::prelude::*;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use tokio::sync::watch;
use tokio::time::{Duration, Instant, sleep, timeout};

const ETHER: Balance = 1_000_000_000_000_000_000;

fn dao(address: &str, name: &str) -> DaoState {
    DaoState {
        address: Address::from(address),
        name: name.to_string(),
        member_count: 7,
        reputation_total_supply: 100 * ETHER,
    }
}

fn ledger() -> MemoryLedger {
    let ledger = MemoryLedger::new(Duration::from_millis(5));
    ledger.set_eth_balance(&Address::from("0xa"), 4 * ETHER);
    ledger.set_eth_balance(&Address::from("0xb"), 9 * ETHER);
    ledger
}

fn screen(buf: &Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_cancelled_before_run_draws_once_and_stops() {
    let config = DashboardConfig::default();
    let header = DaoHeader::new(&config, Arc::new(ledger()));
    let (_props_tx, props_rx) = watch::channel(HeaderProps::new(dao("0xa", "Alpha")));
    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();

    let runtime = Runtime::new(header);
    runtime.shutdown_token().cancel();

    let header = timeout(Duration::from_secs(1), runtime.run(&mut terminal, props_rx, 30))
        .await
        .expect("runtime should stop")
        .expect("runtime should not fail");

    assert_eq!(header.summary_phase(), Phase::Detached);
    assert!(header.props().is_none());
    assert!(screen(terminal.backend().buffer()).contains("Alpha"));
}

#[tokio::test]
async fn test_quit_is_responsive_at_low_frame_rate() {
    let config = DashboardConfig::default();
    let header = DaoHeader::new(&config, Arc::new(ledger()));
    let (_props_tx, props_rx) = watch::channel(HeaderProps::new(dao("0xa", "Alpha")));
    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();

    let runtime = Runtime::new(header);
    let shutdown = runtime.shutdown_token();
    tokio::spawn(async move {
        sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
    });

    let start = Instant::now();
    // One frame per second; shutdown must not wait for the next frame.
    let result = timeout(Duration::from_millis(500), runtime.run(&mut terminal, props_rx, 1)).await;

    assert!(result.is_ok(), "runtime should quit within 500ms");
    assert!(result.unwrap().is_ok());
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_ledger_values_are_drawn() {
    let config = DashboardConfig::default();
    let header = DaoHeader::new(&config, Arc::new(ledger()));
    let (_props_tx, props_rx) = watch::channel(HeaderProps::new(dao("0xa", "Alpha")));
    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();

    let runtime = Runtime::new(header);
    let shutdown = runtime.shutdown_token();
    let stop = async {
        sleep(Duration::from_millis(150)).await;
        shutdown.cancel();
    };

    let (result, ()) = tokio::join!(runtime.run(&mut terminal, props_rx, 60), stop);
    result.expect("runtime should not fail");

    let screen = screen(terminal.backend().buffer());
    assert!(screen.contains("7 Reputation Holders"), "{screen}");
    assert!(screen.contains("100 REP"), "{screen}");
    assert!(screen.contains("4 ETH"), "{screen}");
}

#[tokio::test]
async fn test_props_updates_switch_dao() {
    let config = DashboardConfig::default();
    let ledger = ledger();
    let header = DaoHeader::new(&config, Arc::new(ledger.clone()));
    let (props_tx, props_rx) = watch::channel(HeaderProps::new(dao("0xa", "Alpha")));
    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();

    let runtime = Runtime::new(header);
    let shutdown = runtime.shutdown_token();
    let driver = async {
        sleep(Duration::from_millis(50)).await;
        props_tx.send(HeaderProps::new(dao("0xb", "Beta"))).unwrap();
        sleep(Duration::from_millis(150)).await;
        shutdown.cancel();
    };

    let (result, ()) = tokio::join!(runtime.run(&mut terminal, props_rx, 60), driver);
    result.expect("runtime should not fail");

    let screen = screen(terminal.backend().buffer());
    assert!(screen.contains("Beta"), "{screen}");
    assert!(screen.contains("9 ETH"), "{screen}");
    assert!(!screen.contains("Alpha"), "{screen}");
}

#[tokio::test]
async fn test_dropped_props_sender_keeps_running() {
    let config = DashboardConfig::default();
    let header = DaoHeader::new(&config, Arc::new(ledger()));
    let (props_tx, props_rx) = watch::channel(HeaderProps::new(dao("0xa", "Alpha")));
    drop(props_tx);
    let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();

    let runtime = Runtime::new(header);
    let shutdown = runtime.shutdown_token();
    let stop = async {
        sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
    };

    let (result, ()) = tokio::join!(runtime.run(&mut terminal, props_rx, 60), stop);
    result.expect("runtime should not fail");
    assert!(screen(terminal.backend().buffer()).contains("4 ETH"));
}
