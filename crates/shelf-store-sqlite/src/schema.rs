//! SQL schema for the Shelf SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS books (
    book_id        TEXT PRIMARY KEY,
    isbn           TEXT,
    title          TEXT NOT NULL,
    author         TEXT NOT NULL,
    cover_url      TEXT,
    synopsis       TEXT,
    year_published INTEGER,
    page_count     INTEGER,
    domains        TEXT NOT NULL DEFAULT '[]',  -- JSON array of domain labels
    owner_id       TEXT,                        -- roster id; may dangle after roster deletes
    status         TEXT NOT NULL DEFAULT 'available',  -- 'available' | 'borrowed'
    created_at     TEXT NOT NULL                -- ISO 8601 UTC; listing order key
);

CREATE TABLE IF NOT EXISTS colleagues (
    colleague_id TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    email        TEXT NOT NULL,
    avatar_url   TEXT,
    created_at   TEXT NOT NULL
);

-- The loan ledger. A row is inserted on borrow and written exactly once on
-- return; rows are never deleted and outlive catalog and roster rows, so
-- the id columns carry no foreign keys.
CREATE TABLE IF NOT EXISTS loans (
    loan_id      TEXT PRIMARY KEY,
    book_id      TEXT NOT NULL,
    colleague_id TEXT NOT NULL,
    borrowed_at  TEXT NOT NULL,
    returned_at  TEXT                            -- NULL while the loan is active
);

-- At most one active loan per book. A concurrent borrow that slips past the
-- application checks fails this index inside SQLite instead.
CREATE UNIQUE INDEX IF NOT EXISTS loans_active_book_idx
    ON loans(book_id) WHERE returned_at IS NULL;

CREATE INDEX IF NOT EXISTS loans_book_idx      ON loans(book_id);
CREATE INDEX IF NOT EXISTS loans_colleague_idx ON loans(colleague_id);
CREATE INDEX IF NOT EXISTS books_created_idx   ON books(created_at);

PRAGMA user_version = 1;
";
