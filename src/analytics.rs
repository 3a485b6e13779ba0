use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::book::Book;
use crate::session::ReadingSession;
use crate::util::mean;

/// Aggregated reading activity over some window of the session log.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadingStats {
    pub minutes_read: f64,
    pub pages_read: i64,
    pub words_read: u64,
    pub average_wpm: f64,
}

impl ReadingStats {
    fn over<'a>(sessions: impl Iterator<Item = &'a ReadingSession>) -> Self {
        let mut stats = ReadingStats::default();
        let mut wpms = Vec::new();
        for session in sessions {
            stats.minutes_read += session.minutes();
            stats.pages_read += session.pages_read;
            stats.words_read += session.words_read;
            wpms.push(session.wpm as f64);
        }
        stats.average_wpm = mean(&wpms).unwrap_or(0.0);
        stats
    }
}

/// One day's aggregate, used for the 7-day chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DayStats {
    pub day: NaiveDate,
    pub stats: ReadingStats,
}

pub fn daily_stats(sessions: &[ReadingSession], day: NaiveDate) -> ReadingStats {
    ReadingStats::over(sessions.iter().filter(|s| s.date == day))
}

/// Inclusive date range aggregate.
pub fn range_stats(sessions: &[ReadingSession], from: NaiveDate, to: NaiveDate) -> ReadingStats {
    ReadingStats::over(sessions.iter().filter(|s| s.date >= from && s.date <= to))
}

/// Last seven days ending at `today`, oldest first.
pub fn week_series(sessions: &[ReadingSession], today: NaiveDate) -> Vec<DayStats> {
    (0..7)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            DayStats {
                day,
                stats: daily_stats(sessions, day),
            }
        })
        .collect()
}

fn session_days(sessions: &[ReadingSession]) -> BTreeSet<NaiveDate> {
    sessions.iter().map(|s| s.date).collect()
}

/// Consecutive calendar days with at least one session, counting back from
/// `today`. A streak kept alive through yesterday still counts even when
/// today has no session yet.
pub fn current_streak(sessions: &[ReadingSession], today: NaiveDate) -> u32 {
    let days = session_days(sessions);
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive session days anywhere in the log.
pub fn longest_streak(sessions: &[ReadingSession]) -> u32 {
    let days = session_days(sessions);
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum GoalCadence {
    Daily,
    Weekly,
    Monthly,
}

impl GoalCadence {
    /// Start of the goal's current window, ending at `today` inclusive.
    fn window_start(self, today: NaiveDate) -> NaiveDate {
        match self {
            GoalCadence::Daily => today,
            GoalCadence::Weekly => today - Duration::days(6),
            GoalCadence::Monthly => today - Duration::days(29),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum GoalUnit {
    Minutes,
    Pages,
    Words,
    Books,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingGoal {
    pub id: String,
    pub cadence: GoalCadence,
    pub target: u64,
    pub unit: GoalUnit,
}

/// Progress toward a goal over its current window. Books counts the books
/// finished (progress reached 1.0) that were read during the window.
pub fn goal_progress(
    goal: &ReadingGoal,
    sessions: &[ReadingSession],
    books: &[Book],
    today: NaiveDate,
) -> f64 {
    let from = goal.cadence.window_start(today);
    match goal.unit {
        GoalUnit::Minutes => range_stats(sessions, from, today).minutes_read,
        GoalUnit::Pages => range_stats(sessions, from, today).pages_read.max(0) as f64,
        GoalUnit::Words => range_stats(sessions, from, today).words_read as f64,
        GoalUnit::Books => sessions
            .iter()
            .filter(|s| s.date >= from && s.date <= today)
            .map(|s| s.book_id.as_str())
            .unique()
            .filter(|id| books.iter().any(|b| b.id == *id && b.is_finished()))
            .count() as f64,
    }
}

/// Completion ratio in [0, 1].
pub fn goal_completion(
    goal: &ReadingGoal,
    sessions: &[ReadingSession],
    books: &[Book],
    today: NaiveDate,
) -> f64 {
    if goal.target == 0 {
        return 1.0;
    }
    (goal_progress(goal, sessions, books, today) / goal.target as f64).min(1.0)
}

/// Starter goals shown on the dashboard until goal editing exists.
pub fn default_goals() -> Vec<ReadingGoal> {
    vec![
        ReadingGoal {
            id: "goal-daily-minutes".to_string(),
            cadence: GoalCadence::Daily,
            target: 30,
            unit: GoalUnit::Minutes,
        },
        ReadingGoal {
            id: "goal-weekly-words".to_string(),
            cadence: GoalCadence::Weekly,
            target: 20_000,
            unit: GoalUnit::Words,
        },
        ReadingGoal {
            id: "goal-monthly-books".to_string(),
            cadence: GoalCadence::Monthly,
            target: 5,
            unit: GoalUnit::Books,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookFormat;
    use chrono::Local;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(book_id: &str, date: NaiveDate, mins: u64, pages: i64, words: u64) -> ReadingSession {
        let mut s = ReadingSession::begin(book_id, Local::now());
        s.date = date;
        s.duration = mins * 60;
        s.pages_read = pages;
        s.words_read = words;
        s.wpm = ReadingSession::derive_wpm(words, s.duration);
        s
    }

    fn finished_book(id: &str) -> Book {
        Book {
            id: id.to_string(),
            title: id.to_string(),
            author: String::new(),
            cover_url: String::new(),
            format: BookFormat::Epub,
            total_pages: 100,
            current_page: 100,
            added_date: day(2023, 1, 1),
            last_opened_date: None,
            description: String::new(),
            file_size: String::new(),
            reading_progress: 1.0,
            total_reading_time: 0,
            categories: vec![],
        }
    }

    #[test]
    fn daily_stats_sums_only_that_day() {
        let sessions = vec![
            session("b1", day(2023, 12, 15), 45, 18, 5400),
            session("b1", day(2023, 12, 14), 60, 22, 6600),
        ];
        let stats = daily_stats(&sessions, day(2023, 12, 15));
        assert_eq!(stats.minutes_read, 45.0);
        assert_eq!(stats.pages_read, 18);
        assert_eq!(stats.words_read, 5400);
        assert_eq!(stats.average_wpm, 120.0);
    }

    #[test]
    fn empty_day_is_all_zero() {
        let stats = daily_stats(&[], day(2023, 12, 15));
        assert_eq!(stats, ReadingStats::default());
    }

    #[test]
    fn week_series_is_seven_days_oldest_first() {
        let today = day(2023, 12, 15);
        let sessions = vec![session("b1", day(2023, 12, 12), 30, 10, 3000)];
        let series = week_series(&sessions, today);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].day, day(2023, 12, 9));
        assert_eq!(series[6].day, today);
        assert_eq!(series[3].stats.minutes_read, 30.0);
        assert_eq!(series[6].stats.minutes_read, 0.0);
    }

    #[test]
    fn current_streak_counts_back_from_today() {
        let today = day(2023, 12, 15);
        let sessions = vec![
            session("b1", day(2023, 12, 15), 10, 1, 100),
            session("b1", day(2023, 12, 14), 10, 1, 100),
            session("b2", day(2023, 12, 13), 10, 1, 100),
            // Gap on the 12th breaks the run
            session("b1", day(2023, 12, 11), 10, 1, 100),
        ];
        assert_eq!(current_streak(&sessions, today), 3);
    }

    #[test]
    fn current_streak_survives_a_sessionless_today() {
        let today = day(2023, 12, 15);
        let sessions = vec![
            session("b1", day(2023, 12, 14), 10, 1, 100),
            session("b1", day(2023, 12, 13), 10, 1, 100),
        ];
        assert_eq!(current_streak(&sessions, today), 2);
    }

    #[test]
    fn current_streak_zero_without_recent_sessions() {
        let today = day(2023, 12, 15);
        let sessions = vec![session("b1", day(2023, 12, 10), 10, 1, 100)];
        assert_eq!(current_streak(&sessions, today), 0);
        assert_eq!(current_streak(&[], today), 0);
    }

    #[test]
    fn longest_streak_finds_best_historical_run() {
        let sessions = vec![
            session("b1", day(2023, 11, 1), 10, 1, 100),
            session("b1", day(2023, 11, 2), 10, 1, 100),
            session("b1", day(2023, 11, 3), 10, 1, 100),
            session("b1", day(2023, 11, 4), 10, 1, 100),
            session("b1", day(2023, 11, 10), 10, 1, 100),
            session("b1", day(2023, 11, 11), 10, 1, 100),
        ];
        assert_eq!(longest_streak(&sessions), 4);
    }

    #[test]
    fn longest_streak_dedups_same_day_sessions() {
        let sessions = vec![
            session("b1", day(2023, 11, 1), 10, 1, 100),
            session("b2", day(2023, 11, 1), 10, 1, 100),
            session("b1", day(2023, 11, 2), 10, 1, 100),
        ];
        assert_eq!(longest_streak(&sessions), 2);
    }

    #[test]
    fn minute_goal_progress_over_window() {
        let today = day(2023, 12, 15);
        let goal = ReadingGoal {
            id: "g".to_string(),
            cadence: GoalCadence::Daily,
            target: 30,
            unit: GoalUnit::Minutes,
        };
        let sessions = vec![
            session("b1", today, 45, 18, 5400),
            // Yesterday is outside a daily window
            session("b1", day(2023, 12, 14), 60, 22, 6600),
        ];
        assert_eq!(goal_progress(&goal, &sessions, &[], today), 45.0);
        assert_eq!(goal_completion(&goal, &sessions, &[], today), 1.0);
    }

    #[test]
    fn completion_is_partial_below_target() {
        let today = day(2023, 12, 15);
        let goal = ReadingGoal {
            id: "g".to_string(),
            cadence: GoalCadence::Weekly,
            target: 20_000,
            unit: GoalUnit::Words,
        };
        let sessions = vec![session("b1", today, 45, 18, 5000)];
        assert_eq!(goal_completion(&goal, &sessions, &[], today), 0.25);
    }

    #[test]
    fn book_goal_counts_distinct_finished_books_in_window() {
        let today = day(2023, 12, 15);
        let goal = ReadingGoal {
            id: "g".to_string(),
            cadence: GoalCadence::Monthly,
            target: 5,
            unit: GoalUnit::Books,
        };
        let books = vec![finished_book("b1"), finished_book("b2")];
        let sessions = vec![
            session("b1", day(2023, 12, 1), 30, 10, 3000),
            session("b1", day(2023, 12, 2), 30, 10, 3000),
            session("b2", day(2023, 12, 3), 30, 10, 3000),
            // Read long before the window opened
            session("b3", day(2023, 1, 3), 30, 10, 3000),
        ];
        assert_eq!(goal_progress(&goal, &sessions, &books, today), 2.0);
    }

    #[test]
    fn negative_page_days_do_not_go_below_zero_for_goals() {
        let today = day(2023, 12, 15);
        let goal = ReadingGoal {
            id: "g".to_string(),
            cadence: GoalCadence::Daily,
            target: 10,
            unit: GoalUnit::Pages,
        };
        let sessions = vec![session("b1", today, 30, -12, 3000)];
        assert_eq!(goal_progress(&goal, &sessions, &[], today), 0.0);
    }
}
