use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::Terminal;
use ratatui::prelude::Backend;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::header::{DaoHeader, HeaderProps};

/// Drives a [`DaoHeader`] on a terminal.
///
/// Each frame applies pending ledger emissions, forwards any new props from
/// the host, and draws. The loop ends when the shutdown token is cancelled,
/// at which point the header is detached.
pub struct Runtime {
    header: DaoHeader,
    shutdown: CancellationToken,
}

impl Runtime {
    #[must_use]
    pub fn new(header: DaoHeader) -> Self {
        Self {
            header,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn process_props(&mut self, props: &mut watch::Receiver<HeaderProps>) {
        // A dropped sender only means no more updates.
        if props.has_changed().unwrap_or(false) {
            let next = props.borrow_and_update().clone();
            self.header.on_props_changed(next);
        }
    }

    /// Runs until shutdown and hands the detached header back.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing to the terminal fails.
    pub async fn run<B: Backend>(
        mut self,
        terminal: &mut Terminal<B>,
        mut props: watch::Receiver<HeaderProps>,
        frame_rate: u32,
    ) -> Result<DaoHeader> {
        let frame_duration = Duration::from_millis(1000 / u64::from(frame_rate.max(1)));

        let initial = props.borrow_and_update().clone();
        tracing::debug!(dao = %initial.dao.address, frame_rate, "runtime started");
        self.header.attach(initial);

        let result: Result<()> = loop {
            self.process_props(&mut props);
            self.header.sync();

            if let Err(error) = terminal.draw(|frame| {
                frame.render_widget(&self.header, frame.area());
            }) {
                break Err(error.into());
            }

            tokio::select! {
                () = self.shutdown.cancelled() => break Ok(()),
                () = sleep(frame_duration) => {}
            }
        };

        self.header.detach();
        tracing::debug!("runtime stopped");
        result.map(|()| self.header)
    }
}
