use include_dir::{include_dir, Dir};

use crate::book::Book;

static ASSET_DIR: Dir = include_dir!("src/assets");

/// Demo books used to seed an empty library. Every reader gets the same
/// starter shelf; formats are cosmetic since contents are never parsed.
pub fn demo_books() -> Vec<Book> {
    let file = ASSET_DIR
        .get_file("catalog.json")
        .expect("demo catalog missing from embedded assets");
    let json = file
        .contents_utf8()
        .expect("demo catalog is not valid utf-8");
    serde_json::from_str(json).expect("demo catalog does not deserialize")
}

/// The fixed text shown in the reader regardless of book or format.
pub fn placeholder_text() -> &'static str {
    ASSET_DIR
        .get_file("sample.txt")
        .expect("sample text missing from embedded assets")
        .contents_utf8()
        .expect("sample text is not valid utf-8")
}
