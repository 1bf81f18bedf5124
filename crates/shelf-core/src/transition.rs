//! Legal borrow/return transitions.
//!
//! These checks are pure functions over state the store fetches inside its
//! transaction; the storage-level unique index over active loans backstops
//! the same rule against writers the checks cannot see.

use uuid::Uuid;

use crate::{
  Error, Result,
  book::BookStatus,
  loan::Loan,
};

/// Preconditions for borrowing a book; the first failing check wins.
///
/// `active_loan` is the book's single active loan, if any. When one exists
/// it decides the outcome: the same colleague is told they already hold the
/// book, anyone else that it is taken. The bare status check only fires when
/// the projection claims `borrowed` with no ledger row behind it.
pub fn check_borrow(
  status: BookStatus,
  active_loan: Option<&Loan>,
  colleague_id: Uuid,
) -> Result<()> {
  match active_loan {
    Some(loan) if loan.colleague_id == colleague_id => {
      Err(Error::AlreadyCheckedOut)
    }
    Some(_) => Err(Error::BorrowedByOther),
    None if status == BookStatus::Borrowed => Err(Error::BookAlreadyBorrowed),
    None => Ok(()),
  }
}

/// Preconditions for returning a book; returns the id of the loan to close.
///
/// A return must name the colleague who actually holds the book. Naming
/// anyone else is rejected, not redirected.
pub fn check_return(
  active_loan: Option<&Loan>,
  colleague_id: Uuid,
) -> Result<Uuid> {
  match active_loan {
    Some(loan) if loan.colleague_id == colleague_id => Ok(loan.id),
    _ => Err(Error::NotCheckedOut),
  }
}
