//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use careerhub_core::auth::{DialogOutcome, Tab};
use careerhub_core::jobs::{BatchYear, FilterAction, FilterFlag, ListingAction, SortMode};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::{self, AuthOverlayState, Overlay};
use crate::state::{AppState, Toast};

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => handle_tick(app, Instant::now()),
        UiEvent::Terminal(Event::Key(key)) if key.kind != KeyEventKind::Release => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::JobsLoaded { result, fetched_at } => {
            let board = &mut app.board;
            let failed = result.as_ref().err().cloned();
            let mut effects = vec![];
            if let Some(jobs) = board.feed.complete(result, fetched_at) {
                board.listing.set_jobs(jobs.to_vec());
                board.clamp_selection();
                effects.push(UiEffect::SaveJobs);
            } else if !board.listing.is_loaded() {
                // First load failed: show the empty state instead of spinning forever.
                board.listing.set_jobs(Vec::new());
            }
            if let Some(error) = failed {
                board.show_toast(Toast::error(format!("Could not load jobs: {error}")));
            }
            effects
        }
        UiEvent::AuthReplied { kind, reply } => {
            let late_message = reply.closing_message(kind);
            let outcome = match app.overlay.as_mut().and_then(Overlay::as_auth_mut) {
                Some(dialog) => dialog.apply_reply(kind, reply),
                None => DialogOutcome::Ignored,
            };
            match outcome {
                DialogOutcome::Ignored => match late_message {
                    // Dismissed while in flight; the flow still finished.
                    Some(message) => app.board.show_toast(Toast::info(message)),
                    None => tracing::debug!(?kind, "auth reply arrived after the dialog closed"),
                },
                DialogOutcome::Stay { message: None } => app
                    .board
                    .show_toast(Toast::error("Request failed, see log for details")),
                outcome => {
                    if let DialogOutcome::Close { .. } = outcome {
                        app.overlay = None;
                    }
                    if let Some(message) = outcome.message() {
                        app.board.show_toast(Toast::info(message));
                    }
                }
            }
            vec![]
        }
    }
}

fn handle_tick(app: &mut AppState, now: Instant) -> Vec<UiEffect> {
    let board = &mut app.board;
    board.spinner_frame = board.spinner_frame.wrapping_add(1);
    if board.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
        board.toast = None;
    }
    if board.feed.begin_revalidate(now, false) {
        vec![UiEffect::FetchJobs]
    } else {
        vec![]
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(effects) = overlays::handle_overlay_key(&mut app.overlay, key) {
        return effects;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => vec![UiEffect::Quit],
            _ => vec![],
        };
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return vec![UiEffect::Quit],
        KeyCode::Up => {
            app.board.select_prev();
            return vec![];
        }
        KeyCode::Down => {
            app.board.select_next();
            return vec![];
        }
        KeyCode::Char('g') => {
            return if app.board.feed.begin_revalidate(Instant::now(), true) {
                vec![UiEffect::FetchJobs]
            } else {
                vec![]
            };
        }
        KeyCode::Char('l') => {
            app.overlay = Some(open_dialog(app, Tab::Login));
            return vec![];
        }
        KeyCode::Char('u') => {
            app.overlay = Some(open_dialog(app, Tab::Signup));
            return vec![];
        }
        KeyCode::Char('j') => toggle(FilterFlag::Jobs),
        KeyCode::Char('i') => toggle(FilterFlag::Internships),
        KeyCode::Char('m') => toggle(FilterFlag::MyJobs),
        KeyCode::Char('a') => toggle(FilterFlag::AddJob),
        KeyCode::Char('x') => ListingAction::Filter(FilterAction::Reset),
        KeyCode::Char('r') => ListingAction::Sort(SortMode::Recent),
        KeyCode::Char('s') => ListingAction::Sort(SortMode::Stipend),
        KeyCode::Char(c @ '2'..='7') => {
            let Some(year) = c
                .to_digit(10)
                .and_then(|d| u16::try_from(d).ok())
                .and_then(|d| BatchYear::from_code(20 + d))
            else {
                return vec![];
            };
            toggle(FilterFlag::Batch(year))
        }
        _ => return vec![],
    };
    app.board.dispatch(action);
    vec![]
}

fn toggle(flag: FilterFlag) -> ListingAction {
    ListingAction::Filter(FilterAction::Toggle(flag))
}

/// Builds a fresh auth dialog on `tab`.
pub fn open_dialog(app: &AppState, tab: Tab) -> Overlay {
    Overlay::Auth(AuthOverlayState::open(tab, app.board.policy.clone()))
}
