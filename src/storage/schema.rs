pub const CREATE_SUBMISSIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS submissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text_content TEXT,
        doodle_filename TEXT,
        kind TEXT NOT NULL CHECK(kind IN ('text', 'doodle', 'both')),
        created_at TEXT NOT NULL
    )
";

pub const CREATE_INDEX_CREATED_AT: &str =
    "CREATE INDEX IF NOT EXISTS idx_submissions_created_at ON submissions(created_at)";
