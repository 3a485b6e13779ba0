use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;

use quire::analytics;
use quire::book::Book;
use quire::catalog;
use quire::preferences::{MarginSize, ReadingPreferences, ReadingTheme};

use crate::{App, Screen};

const READER_PAGE_LINES: usize = 18;

pub fn draw(app: &App, frame: &mut Frame) {
    match app.screen {
        Screen::Library => draw_library(app, frame),
        Screen::Reader => draw_reader(app, frame),
        Screen::Analytics => draw_analytics(app, frame),
    }
}

fn theme_style(theme: ReadingTheme) -> Style {
    match theme {
        ReadingTheme::Light => Style::default().fg(Color::Black).bg(Color::White),
        ReadingTheme::Dark => Style::default().fg(Color::Gray).bg(Color::Black),
        ReadingTheme::Sepia => Style::default().fg(Color::Black).bg(Color::Yellow),
    }
}

fn horizontal_margin(margins: MarginSize) -> u16 {
    match margins {
        MarginSize::Small => 4,
        MarginSize::Medium => 10,
        MarginSize::Large => 20,
    }
}

fn last_opened_label(book: &Book) -> String {
    match book.last_opened_date {
        Some(date) => {
            let days = (Local::now().date_naive() - date).num_days();
            let secs = days.max(0) * 24 * 3600;
            format!("opened {}", HumanTime::from(-secs))
        }
        None => "never opened".to_string(),
    }
}

fn draw_library(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Span::styled(
        "quire — library",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = app
        .library
        .books()
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let selected = i == app.selected;
            let marker = if selected { "> " } else { "  " };
            let progress = (book.reading_progress * 100.0).round() as u32;
            let line = Line::from(vec![
                Span::styled(
                    format!("{marker}{} — {}", book.title, book.author),
                    if selected {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    },
                ),
                Span::styled(
                    format!(
                        "  [{}] {}% · {} · {}",
                        book.format,
                        progress,
                        book.file_size,
                        last_opened_label(book)
                    ),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("books"));
    frame.render_widget(list, chunks[1]);

    let help = Paragraph::new(Span::styled(
        "j/k move · enter read · x remove · a analytics · q quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);
}

fn draw_reader(app: &App, frame: &mut Frame) {
    let Some(book) = app.open_book.as_ref().and_then(|id| app.library.get(id)) else {
        return;
    };
    let prefs = app.tracker.preferences();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(theme_style(prefs.theme)),
        area,
    );

    let margin = horizontal_margin(prefs.margins).min(area.width / 3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(margin)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area);

    let title = centered_title(book, chunks[0].width);
    frame.render_widget(
        Paragraph::new(title)
            .style(theme_style(prefs.theme).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let body = page_text(
        catalog::placeholder_text(),
        app.tracker.current_page(),
        chunks[1].width.saturating_sub(2) as usize,
        READER_PAGE_LINES,
    );
    frame.render_widget(
        Paragraph::new(body)
            .style(theme_style(prefs.theme))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    let bookmark = if app.tracker.is_bookmarked(app.tracker.current_page()) {
        " ⊙"
    } else {
        ""
    };
    let status = format!(
        "page {}/{}{}  ·  ←/→ turn · b bookmark · t theme · +/- font · esc close",
        app.tracker.current_page(),
        book.total_pages,
        bookmark
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            status,
            theme_style(prefs.theme).add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center),
        chunks[2],
    );
}

fn centered_title(book: &Book, width: u16) -> String {
    let full = format!("{} · {}", book.title, book.author);
    if full.width() <= width as usize {
        full
    } else {
        book.title.clone()
    }
}

fn draw_analytics(app: &App, frame: &mut Frame) {
    let sessions = app.tracker.sessions();
    let today = Local::now().date_naive();
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Span::styled(
        "quire — reading analytics",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let week = analytics::range_stats(&sessions, today - chrono::Duration::days(6), today);
    let streak = analytics::current_streak(&sessions, today);
    let longest = analytics::longest_streak(&sessions);
    let summary = Paragraph::new(vec![
        Line::from(format!(
            "this week: {:.0} min · {} pages · {} words · avg {:.0} wpm",
            week.minutes_read, week.pages_read, week.words_read, week.average_wpm
        )),
        Line::from(format!(
            "streak: {streak} day(s) · longest {longest} day(s)"
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(summary, chunks[1]);

    let series = analytics::week_series(&sessions, today);
    let bars: Vec<Bar> = series
        .iter()
        .map(|day| {
            Bar::default()
                .label(Line::from(day.day.format("%a").to_string()))
                .value(day.stats.minutes_read.round() as u64)
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("minutes read, last 7 days"),
        )
        .bar_width(5)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, chunks[2]);

    let goal_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 3])
        .split(chunks[3]);
    for (goal, row) in app.goals.iter().zip(goal_rows.iter()) {
        let completion =
            analytics::goal_completion(goal, &sessions, app.library.books(), today);
        let progress = analytics::goal_progress(goal, &sessions, app.library.books(), today);
        let gauge = Gauge::default()
            .ratio(completion)
            .label(format!(
                "{} {} / {} {}",
                goal.cadence,
                progress.round() as u64,
                goal.target,
                goal.unit
            ))
            .gauge_style(Style::default().fg(Color::Magenta));
        frame.render_widget(gauge, *row);
    }

    let help = Paragraph::new(Span::styled(
        "esc back · q quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

/// Greedy word wrap that respects paragraph breaks.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.trim().split("\n\n") {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line = word.to_string();
            } else if line.width() + 1 + word.width() <= width {
                line.push(' ');
                line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut line));
                line = word.to_string();
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines.push(String::new());
    }
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Slice of the placeholder text for the given 1-indexed page. The model's
/// page count comes from the book record, so the fixed text is cycled.
pub fn page_text(text: &str, page: u32, width: usize, page_lines: usize) -> String {
    let lines = wrap_text(text, width);
    if lines.is_empty() {
        return String::new();
    }
    let page_lines = page_lines.max(1);
    let page_count = lines.len().div_ceil(page_lines);
    let index = (page.max(1) as usize - 1) % page_count;
    lines[index * page_lines..((index + 1) * page_lines).min(lines.len())].join("\n")
}

#[allow(dead_code)]
pub fn preferences_summary(prefs: &ReadingPreferences) -> String {
    format!(
        "{} · {:?} · {} · {:?} margins",
        prefs.font_family, prefs.font_size, prefs.theme, prefs.margins
    )
}
