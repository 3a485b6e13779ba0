use chrono::Local;
use rand::Rng;
use std::path::Path;

use crate::book::{Book, BookFormat};

const FALLBACK_COVER_URL: &str =
    "https://images.pexels.com/photos/1029141/pexels-photo-1029141.jpeg?auto=compress&cs=tinysrgb&w=600";

/// Render a byte count the way the library card shows it, e.g. "2.4 MB".
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

fn title_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| file_name.to_string())
}

fn format_from_file_name(file_name: &str) -> BookFormat {
    Path::new(file_name)
        .extension()
        .map(|ext| BookFormat::from_extension(&ext.to_string_lossy()))
        .unwrap_or(BookFormat::Epub)
}

/// Build a library record for a simulated upload. Only the file name and
/// byte size are ever inspected; the page count is made up since nothing is
/// parsed.
pub fn book_from_upload(file_name: &str, byte_size: u64) -> Book {
    let mut rng = rand::thread_rng();
    Book {
        id: rng.gen_range(0..10_000).to_string(),
        title: title_from_file_name(file_name),
        author: "Unknown Author".to_string(),
        cover_url: FALLBACK_COVER_URL.to_string(),
        format: format_from_file_name(file_name),
        total_pages: rng.gen_range(100..500),
        current_page: 0,
        added_date: Local::now().date_naive(),
        last_opened_date: None,
        description: "No description available.".to_string(),
        file_size: format_file_size(byte_size),
        reading_progress: 0.0,
        total_reading_time: 0,
        categories: vec![],
    }
}
