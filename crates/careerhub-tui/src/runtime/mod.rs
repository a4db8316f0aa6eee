//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces effects;
//! this module executes them. Async results come back through the inbox
//! channel and are drained every loop iteration.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use careerhub_core::api::ApiClient;
use careerhub_core::config::{Config, paths};
use careerhub_core::jobs::FeedSnapshot;
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::Overlay;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Spinner and toast cadence.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop and panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    client: ApiClient,
    /// Where the last good job list is kept between sessions.
    cache_path: PathBuf,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    /// Cancelled on quit so in-flight requests stop posting results.
    cancel: CancellationToken,
    last_tick: Instant,
}

impl TuiRuntime {
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: &Config, client: ApiClient) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let cache_path = paths::jobs_cache_path();
        let cached = FeedSnapshot::load(&cache_path).unwrap_or_else(|err| {
            tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable job cache");
            None
        });
        let state = AppState::with_cached(config, client.base_url(), cached);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state,
            client,
            cache_path,
            inbox_tx,
            inbox_rx,
            cancel: CancellationToken::new(),
            last_tick: Instant::now(),
        })
    }

    pub fn open_overlay(&mut self, overlay: Overlay) {
        self.state.overlay = Some(overlay);
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal events fails.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        self.cancel.cancel();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        // First tick kicks off the initial fetch.
        self.dispatch_event(UiEvent::Tick);
        let mut dirty = true;

        while !self.state.board.should_quit {
            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }

            let events = self.collect_events()?;
            if !events.is_empty() {
                dirty = true;
            }
            for event in events {
                self.dispatch_event(event);
            }
        }

        Ok(())
    }

    /// Collects events from the inbox and the terminal, plus a Tick when due.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            TICK_INTERVAL.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= TICK_INTERVAL {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and posts its event to the inbox unless the
    /// runtime has shut down first.
    fn spawn_effect<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                event = fut => {
                    let _ = tx.send(event);
                }
            }
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.board.should_quit = true;
                self.cancel.cancel();
            }
            UiEffect::FetchJobs => {
                self.spawn_effect(handlers::fetch_jobs(self.client.clone()));
            }
            UiEffect::SaveJobs => {
                if let Some(snapshot) = self.state.board.feed.snapshot()
                    && let Err(err) = snapshot.save(&self.cache_path)
                {
                    tracing::warn!(error = %format!("{err:#}"), "failed to save job cache");
                }
            }
            UiEffect::SubmitAuth { request } => {
                self.spawn_effect(handlers::submit_auth(self.client.clone(), request));
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.cancel.cancel();
        let _ = terminal::restore_terminal();
    }
}
