//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never mutate
//! state or return effects.

use careerhub_core::jobs::{
    BatchYear, FilterFlag, JobPosting, ListingView, SortMode, format_date, format_stipend,
};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::common::truncate_with_ellipsis;
use crate::state::{AppState, BoardState, ToastKind};

const HEADER_HEIGHT: u16 = 4;
const STATUS_HEIGHT: u16 = 1;

/// Spinner frames for the loading state.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const FILTER_KEYS: &[(&str, FilterFlag)] = &[
    ("m", FilterFlag::MyJobs),
    ("a", FilterFlag::AddJob),
    ("j", FilterFlag::Jobs),
    ("i", FilterFlag::Internships),
];

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_header(&app.board, frame, chunks[0]);
    render_body(&app.board, frame, chunks[1]);
    render_status(&app.board, frame, chunks[2]);

    if let Some(overlay) = &app.overlay {
        overlay.render(frame, area);
    }
}

fn chip(key: &str, label: &str, active: bool) -> Vec<Span<'static>> {
    let style = if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    vec![
        Span::styled(format!("{key}:"), Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {label} "), style),
        Span::raw(" "),
    ]
}

fn render_header(board: &BoardState, frame: &mut Frame, area: Rect) {
    let filters = board.listing.filters();

    let mut flags: Vec<Span> = Vec::new();
    for (key, flag) in FILTER_KEYS {
        flags.extend(chip(key, &flag.label(), filters.is_active(*flag)));
    }

    let mut batches: Vec<Span> = Vec::new();
    for year in BatchYear::ALL {
        let flag = FilterFlag::Batch(year);
        let key = (year.code() % 10).to_string();
        batches.extend(chip(&key, &flag.label(), filters.is_active(flag)));
    }
    batches.extend(chip("x", "RESET", false));

    let mut sorts: Vec<Span> = vec![Span::styled("Sort by ", Style::default().fg(Color::DarkGray))];
    for mode in SortMode::all() {
        let key = match mode {
            SortMode::Recent => "r",
            SortMode::Stipend => "s",
        };
        sorts.extend(chip(key, mode.label(), board.listing.sort_mode() == *mode));
    }

    let lines = vec![Line::from(flags), Line::from(batches), Line::from(sorts)];
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " CareerHub ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_body(board: &BoardState, frame: &mut Frame, area: Rect) {
    match board.listing.view() {
        ListingView::Loading => {
            let spinner = SPINNER_FRAMES[board.spinner_frame % SPINNER_FRAMES.len()];
            render_centered(frame, area, &format!("{spinner} Loading..."), Color::Yellow);
        }
        ListingView::NoMatch => render_centered(frame, area, "No Match Found", Color::DarkGray),
        ListingView::Jobs(jobs) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(area);
            render_list(board, jobs, frame, chunks[0]);
            render_detail(board.selected_job(), frame, chunks[1]);
        }
    }
}

fn render_centered(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height / 2;
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_string(), Style::default().fg(color)))
            .alignment(Alignment::Center),
        Rect::new(area.x, y, area.width, 1),
    );
}

fn render_list(board: &BoardState, jobs: &[JobPosting], frame: &mut Frame, area: Rect) {
    // Borders and the highlight symbol.
    let usable = (area.width as usize).saturating_sub(4);
    let stipend_w = 10;
    let company_w = (usable.saturating_sub(stipend_w) * 2 / 5).clamp(6, 24);
    let title_w = usable.saturating_sub(stipend_w + company_w + 2);

    let items: Vec<ListItem> = jobs
        .iter()
        .map(|job| {
            let title = truncate_with_ellipsis(&job.title, title_w);
            let company = truncate_with_ellipsis(&job.company_name, company_w);
            let pad = title_w.saturating_sub(title.width());
            ListItem::new(Line::from(vec![
                Span::raw(format!("{title}{} ", " ".repeat(pad))),
                Span::styled(
                    format!("{company:<company_w$} "),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:>stipend_w$}", format_stipend(job.stipend)),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    let title = format!(" Postings ({}/{}) ", jobs.len(), board.listing.total());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(board.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn detail_text(job: &JobPosting) -> Text<'static> {
    let label = Style::default().fg(Color::DarkGray);
    let row = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:<12}"), label),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            job.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("at {}", job.company_name)),
        Line::from(""),
        row("Type", job.category.label().to_string()),
        row("Stipend", format_stipend(job.stipend)),
        row("Starts", format_date(&job.start_date)),
        row("Batch", job.batch_label()),
    ];
    if !job.job_location.is_empty() {
        lines.push(row("Location", job.job_location.clone()));
    }
    if !job.floated_by.is_empty() {
        lines.push(row("Floated by", job.floated_by.clone()));
    }
    lines.push(row("Posted", format_date(&job.created_at)));
    Text::from(lines)
}

fn render_detail(job: Option<&JobPosting>, frame: &mut Frame, area: Rect) {
    let text = job.map_or_else(|| Text::raw("No posting selected"), detail_text);
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_status(board: &BoardState, frame: &mut Frame, area: Rect) {
    if let Some(toast) = &board.toast {
        let color = match toast.kind {
            ToastKind::Info => Color::Green,
            ToastKind::Error => Color::Red,
        };
        let message = truncate_with_ellipsis(&toast.message, area.width as usize);
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(color))),
            area,
        );
        return;
    }

    let mut parts = Vec::new();
    if board.feed.is_fetching() {
        parts.push("refreshing…".to_string());
    } else {
        if board.feed.last_error().is_some() {
            parts.push("refresh failed".to_string());
        }
        if let Some(at) = board.feed.fetched_at() {
            parts.push(format!(
                "updated {}",
                at.with_timezone(&chrono::Local).format("%H:%M")
            ));
        }
    }
    parts.push(board.api_url.clone());
    parts.push("↑↓ move  g refresh  l login  u signup  q quit".to_string());
    let text = truncate_with_ellipsis(&parts.join("  ·  "), area.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
        area,
    );
}
