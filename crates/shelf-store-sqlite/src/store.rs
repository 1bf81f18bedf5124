//! [`SqliteStore`] — the SQLite implementation of [`LendingStore`].
//!
//! Borrow and return each run as one transaction covering the ledger write
//! and the denormalized status flip, so the projection can never disagree
//! with the ledger. The partial unique index on active loans enforces
//! at-most-one-per-book inside SQLite itself; the transition checks here
//! exist to produce precise error messages, not to carry the invariant.

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use shelf_core::{
  Error, Result,
  book::{BookPatch, BookStatus, NewBook},
  colleague::{Colleague, ColleaguePatch, NewColleague},
  loan::{BookView, Loan},
  store::LendingStore,
  transition,
};
use uuid::Uuid;

use crate::{
  encode::{
    RawBookView, RawColleague, RawLoan, decode_status, encode_domains,
    encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

/// How long a single store call may run before it is reported unavailable.
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lending store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|e| Error::Storage(e.to_string()))?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|e| Error::Storage(e.to_string()))?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread under the bounded call timeout.
  ///
  /// Connection-level failures become [`Error::Storage`]; an elapsed
  /// timeout becomes [`Error::Unavailable`].
  async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    match tokio::time::timeout(CALL_TIMEOUT, self.conn.call(f)).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => Err(Error::Storage(e.to_string())),
      Err(_) => Err(Error::Unavailable),
    }
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────

/// Lift a decode failure onto the connection error channel; it surfaces as
/// a storage error like any other corrupt-row condition.
fn corrupt(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

const BOOK_VIEW_SELECT: &str = "
  SELECT
    b.book_id, b.isbn, b.title, b.author, b.cover_url, b.synopsis,
    b.year_published, b.page_count, b.domains, b.status,
    o.name AS owner_name,
    c.name AS borrower_name,
    l.borrowed_at
  FROM books b
  LEFT JOIN colleagues o ON o.colleague_id = b.owner_id
  LEFT JOIN loans l      ON l.book_id = b.book_id AND l.returned_at IS NULL
  LEFT JOIN colleagues c ON c.colleague_id = l.colleague_id";

fn book_view_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawBookView> {
  Ok(RawBookView {
    book_id:        row.get(0)?,
    isbn:           row.get(1)?,
    title:          row.get(2)?,
    author:         row.get(3)?,
    cover_url:      row.get(4)?,
    synopsis:       row.get(5)?,
    year_published: row.get(6)?,
    page_count:     row.get(7)?,
    domains:        row.get(8)?,
    status:         row.get(9)?,
    owner_name:     row.get(10)?,
    borrower_name:  row.get(11)?,
    borrowed_at:    row.get(12)?,
  })
}

fn fetch_book_view(
  conn: &rusqlite::Connection,
  book_id: &str,
) -> rusqlite::Result<Option<RawBookView>> {
  conn
    .query_row(
      &format!("{BOOK_VIEW_SELECT} WHERE b.book_id = ?1"),
      rusqlite::params![book_id],
      book_view_row,
    )
    .optional()
}

fn colleague_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawColleague> {
  Ok(RawColleague {
    colleague_id: row.get(0)?,
    name:         row.get(1)?,
    email:        row.get(2)?,
    avatar_url:   row.get(3)?,
  })
}

fn fetch_colleague(
  conn: &rusqlite::Connection,
  colleague_id: &str,
) -> rusqlite::Result<Option<RawColleague>> {
  conn
    .query_row(
      "SELECT colleague_id, name, email, avatar_url
       FROM colleagues WHERE colleague_id = ?1",
      rusqlite::params![colleague_id],
      colleague_row,
    )
    .optional()
}

fn loan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLoan> {
  Ok(RawLoan {
    loan_id:      row.get(0)?,
    book_id:      row.get(1)?,
    colleague_id: row.get(2)?,
    borrowed_at:  row.get(3)?,
    returned_at:  row.get(4)?,
  })
}

/// The book's single active loan, if any (at most one by the index).
fn fetch_active_loan(
  conn: &rusqlite::Connection,
  book_id: &str,
) -> rusqlite::Result<Option<RawLoan>> {
  conn
    .query_row(
      "SELECT loan_id, book_id, colleague_id, borrowed_at, returned_at
       FROM loans WHERE book_id = ?1 AND returned_at IS NULL",
      rusqlite::params![book_id],
      loan_row,
    )
    .optional()
}

fn book_exists(
  conn: &rusqlite::Connection,
  book_id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM books WHERE book_id = ?1",
        rusqlite::params![book_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// The current values of the patchable book columns.
struct EditableBookColumns {
  synopsis:       Option<String>,
  year_published: Option<i32>,
  page_count:     Option<i32>,
  domains:        String,
  owner_id:       Option<String>,
}

fn fetch_editable_columns(
  conn: &rusqlite::Connection,
  book_id: &str,
) -> rusqlite::Result<Option<EditableBookColumns>> {
  conn
    .query_row(
      "SELECT synopsis, year_published, page_count, domains, owner_id
       FROM books WHERE book_id = ?1",
      rusqlite::params![book_id],
      |row| {
        Ok(EditableBookColumns {
          synopsis:       row.get(0)?,
          year_published: row.get(1)?,
          page_count:     row.get(2)?,
          domains:        row.get(3)?,
          owner_id:       row.get(4)?,
        })
      },
    )
    .optional()
}

// ─── LendingStore impl ───────────────────────────────────────────────────────

impl LendingStore for SqliteStore {
  // ── Catalog ───────────────────────────────────────────────────────────

  async fn add_book(&self, input: NewBook) -> Result<BookView> {
    let NewBook {
      title,
      author,
      cover_url,
      synopsis,
      year_published,
      page_count,
      domains,
      owner_id,
    } = input;

    let id_str      = encode_uuid(Uuid::new_v4());
    let created_str = encode_dt(Utc::now());
    let domains_str = encode_domains(&domains)?;
    let owner       = owner_id.map(|o| (o, encode_uuid(o)));

    let out: Result<RawBookView> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        if let Some((owner_id, owner_str)) = &owner
          && fetch_colleague(&tx, owner_str)?.is_none()
        {
          return Ok(Err(Error::OwnerNotFound(*owner_id)));
        }
        let owner_param = owner.as_ref().map(|(_, s)| s.as_str());

        tx.execute(
          "INSERT INTO books (
             book_id, isbn, title, author, cover_url, synopsis,
             year_published, page_count, domains, owner_id, status, created_at
           ) VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'available', ?10)",
          rusqlite::params![
            id_str,
            title,
            author,
            cover_url,
            synopsis,
            year_published,
            page_count,
            domains_str,
            owner_param,
            created_str,
          ],
        )?;
        tx.commit()?;

        let view = fetch_book_view(conn, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok(Ok(view))
      })
      .await?;

    out.and_then(RawBookView::into_view)
  }

  async fn update_book(&self, id: Uuid, patch: BookPatch) -> Result<BookView> {
    if patch.is_empty() {
      return Err(Error::NoFieldsToUpdate);
    }

    let id_str = encode_uuid(id);
    let domains_patch = match &patch.domains {
      Some(d) => Some(encode_domains(d)?),
      None => None,
    };
    let owner_patch: Option<Option<String>> =
      patch.owner_id.map(|o| o.map(encode_uuid));

    let out: Result<RawBookView> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let Some(current) = fetch_editable_columns(&tx, &id_str)? else {
          return Ok(Err(Error::BookNotFound(id)));
        };

        let synopsis = patch.synopsis.unwrap_or(current.synopsis);
        let year_published =
          patch.year_published.unwrap_or(current.year_published);
        let page_count = patch.page_count.unwrap_or(current.page_count);
        let domains = domains_patch.unwrap_or(current.domains);
        let owner_id = owner_patch.unwrap_or(current.owner_id);

        tx.execute(
          "UPDATE books
           SET synopsis = ?2, year_published = ?3, page_count = ?4,
               domains = ?5, owner_id = ?6
           WHERE book_id = ?1",
          rusqlite::params![
            id_str,
            synopsis,
            year_published,
            page_count,
            domains,
            owner_id,
          ],
        )?;
        tx.commit()?;

        let view = fetch_book_view(conn, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok(Ok(view))
      })
      .await?;

    out.and_then(RawBookView::into_view)
  }

  async fn delete_book(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let out: Result<()> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let Some(status_str) = tx
          .query_row(
            "SELECT status FROM books WHERE book_id = ?1",
            rusqlite::params![id_str],
            |row| row.get::<_, String>(0),
          )
          .optional()?
        else {
          return Ok(Err(Error::BookNotFound(id)));
        };
        let status = decode_status(&status_str).map_err(corrupt)?;
        if status == BookStatus::Borrowed {
          return Ok(Err(Error::BookCurrentlyBorrowed));
        }

        tx.execute(
          "DELETE FROM books WHERE book_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    out
  }

  async fn list_books_with_state(&self) -> Result<Vec<BookView>> {
    let raws: Vec<RawBookView> = self
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("{BOOK_VIEW_SELECT} ORDER BY b.created_at DESC"))?;
        let rows = stmt
          .query_map([], book_view_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBookView::into_view).collect()
  }

  async fn get_book_view(&self, id: Uuid) -> Result<Option<BookView>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBookView> = self
      .call(move |conn| Ok(fetch_book_view(conn, &id_str)?))
      .await?;

    raw.map(RawBookView::into_view).transpose()
  }

  // ── Roster ────────────────────────────────────────────────────────────

  async fn add_colleague(&self, input: NewColleague) -> Result<Colleague> {
    let colleague = Colleague {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      avatar_url: None,
    };

    let id_str      = encode_uuid(colleague.id);
    let created_str = encode_dt(Utc::now());
    let name        = colleague.name.clone();
    let email       = colleague.email.clone();

    self
      .call(move |conn| {
        conn.execute(
          "INSERT INTO colleagues (colleague_id, name, email, avatar_url, created_at)
           VALUES (?1, ?2, ?3, NULL, ?4)",
          rusqlite::params![id_str, name, email, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(colleague)
  }

  async fn update_colleague(
    &self,
    id: Uuid,
    patch: ColleaguePatch,
  ) -> Result<Colleague> {
    if patch.is_empty() {
      return Err(Error::NoFieldsToUpdate);
    }

    let id_str = encode_uuid(id);

    let out: Result<RawColleague> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let Some(current) = fetch_colleague(&tx, &id_str)? else {
          return Ok(Err(Error::ColleagueNotFound(id)));
        };

        let name  = patch.name.unwrap_or(current.name);
        let email = patch.email.unwrap_or(current.email);

        tx.execute(
          "UPDATE colleagues SET name = ?2, email = ?3 WHERE colleague_id = ?1",
          rusqlite::params![id_str, name, email],
        )?;
        tx.commit()?;

        Ok(Ok(RawColleague {
          colleague_id: id_str,
          name,
          email,
          avatar_url: current.avatar_url,
        }))
      })
      .await?;

    out.and_then(RawColleague::into_colleague)
  }

  async fn delete_colleague(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let out: Result<()> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        if fetch_colleague(&tx, &id_str)?.is_none() {
          return Ok(Err(Error::ColleagueNotFound(id)));
        }

        let has_active: bool = tx
          .query_row(
            "SELECT 1 FROM loans
             WHERE colleague_id = ?1 AND returned_at IS NULL
             LIMIT 1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if has_active {
          return Ok(Err(Error::ColleagueHasActiveLoans));
        }

        tx.execute(
          "DELETE FROM colleagues WHERE colleague_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    out
  }

  async fn list_colleagues(&self) -> Result<Vec<Colleague>> {
    let raws: Vec<RawColleague> = self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT colleague_id, name, email, avatar_url
           FROM colleagues ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map([], colleague_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawColleague::into_colleague).collect()
  }

  // ── Loan transitions ──────────────────────────────────────────────────

  async fn borrow(&self, book_id: Uuid, colleague_id: Uuid) -> Result<BookView> {
    let book_id_str      = encode_uuid(book_id);
    let colleague_id_str = encode_uuid(colleague_id);
    let loan_id_str      = encode_uuid(Uuid::new_v4());
    let borrowed_at_str  = encode_dt(Utc::now());

    let out: Result<RawBookView> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        if fetch_colleague(&tx, &colleague_id_str)?.is_none() {
          return Ok(Err(Error::ColleagueNotFound(colleague_id)));
        }
        let Some(book) = fetch_book_view(&tx, &book_id_str)? else {
          return Ok(Err(Error::BookNotFound(book_id)));
        };

        let status = decode_status(&book.status).map_err(corrupt)?;
        let active_loan = fetch_active_loan(&tx, &book_id_str)?
          .map(RawLoan::into_loan)
          .transpose()
          .map_err(corrupt)?;
        if let Err(e) =
          transition::check_borrow(status, active_loan.as_ref(), colleague_id)
        {
          return Ok(Err(e));
        }

        let inserted = tx.execute(
          "INSERT INTO loans (loan_id, book_id, colleague_id, borrowed_at, returned_at)
           VALUES (?1, ?2, ?3, ?4, NULL)",
          rusqlite::params![
            loan_id_str,
            book_id_str,
            colleague_id_str,
            borrowed_at_str,
          ],
        );
        if let Err(e) = inserted {
          // A writer on another connection can slip between the checks
          // above and this insert; the partial unique index turns that
          // race into a constraint failure here.
          if is_unique_violation(&e) {
            return Ok(Err(Error::BorrowedByOther));
          }
          return Err(e.into());
        }

        tx.execute(
          "UPDATE books SET status = ?2 WHERE book_id = ?1",
          rusqlite::params![book_id_str, encode_status(BookStatus::Borrowed)],
        )?;
        tx.commit()?;

        let view = fetch_book_view(conn, &book_id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok(Ok(view))
      })
      .await?;

    out.and_then(RawBookView::into_view)
  }

  async fn return_book(
    &self,
    book_id: Uuid,
    colleague_id: Uuid,
  ) -> Result<BookView> {
    let book_id_str      = encode_uuid(book_id);
    let colleague_id_str = encode_uuid(colleague_id);
    let returned_at_str  = encode_dt(Utc::now());

    let out: Result<RawBookView> = self
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        if fetch_colleague(&tx, &colleague_id_str)?.is_none() {
          return Ok(Err(Error::ColleagueNotFound(colleague_id)));
        }

        let active_loan = fetch_active_loan(&tx, &book_id_str)?
          .map(RawLoan::into_loan)
          .transpose()
          .map_err(corrupt)?;
        let loan_id =
          match transition::check_return(active_loan.as_ref(), colleague_id) {
            Ok(id) => id,
            Err(e) => return Ok(Err(e)),
          };

        tx.execute(
          "UPDATE loans SET returned_at = ?2 WHERE loan_id = ?1",
          rusqlite::params![encode_uuid(loan_id), returned_at_str],
        )?;
        tx.execute(
          "UPDATE books SET status = ?2 WHERE book_id = ?1",
          rusqlite::params![book_id_str, encode_status(BookStatus::Available)],
        )?;
        tx.commit()?;

        let view = fetch_book_view(conn, &book_id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok(Ok(view))
      })
      .await?;

    out.and_then(RawBookView::into_view)
  }

  // ── Ledger reads ──────────────────────────────────────────────────────

  async fn active_loans(&self) -> Result<Vec<Loan>> {
    let raws: Vec<RawLoan> = self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT loan_id, book_id, colleague_id, borrowed_at, returned_at
           FROM loans WHERE returned_at IS NULL
           ORDER BY borrowed_at DESC",
        )?;
        let rows = stmt
          .query_map([], loan_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLoan::into_loan).collect()
  }

  async fn loan_history(&self, book_id: Uuid) -> Result<Vec<Loan>> {
    let id_str = encode_uuid(book_id);

    let out: Result<Vec<RawLoan>> = self
      .call(move |conn| {
        if !book_exists(conn, &id_str)? {
          return Ok(Err(Error::BookNotFound(book_id)));
        }

        let mut stmt = conn.prepare(
          "SELECT loan_id, book_id, colleague_id, borrowed_at, returned_at
           FROM loans WHERE book_id = ?1
           ORDER BY borrowed_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], loan_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Ok(rows))
      })
      .await?;

    out?.into_iter().map(RawLoan::into_loan).collect()
  }
}
