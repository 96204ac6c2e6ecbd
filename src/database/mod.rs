//! Internal representation of data.

use chrono::{DateTime, Utc};

use crate::{
    error::DatabaseError,
    types::{Expense, Member, NewDebt, SavedDebt},
};

type DatabaseResult<T> = Result<T, DatabaseError>;

pub mod sqlite;

/// This trait abstracts over the type of database.
///
/// Members and expenses are managed elsewhere: the bot only reads them, with the
/// exception of marking an expense as resolved once its debts are saved.
pub trait Database {
    /// Get the list of all members.
    fn get_members(&self) -> DatabaseResult<Vec<Member>>;

    /// Get all expenses that were not resolved yet, sorted by ID.
    fn get_unresolved_expenses(&self) -> DatabaseResult<Vec<Expense>>;

    /// Mark the expense with the given *expense_id* as resolved.
    fn resolve_expense(&self, expense_id: i64) -> DatabaseResult<()>;

    /// Get the list of all debts, resolved or not, sorted by ID.
    fn get_debts(&self) -> DatabaseResult<Vec<SavedDebt>>;

    /// Save a single unresolved debt and return its ID.
    fn save_debt(&self, debt: &NewDebt, created_at: DateTime<Utc>) -> DatabaseResult<i64>;

    /// Delete the debt with the given *debt_id*.
    ///
    /// If the debt does not exist, it is a no-op.
    fn delete_debt(&self, debt_id: i64) -> DatabaseResult<()>;

    /// Mark all debts as resolved.
    fn resolve_all_debts(&self) -> DatabaseResult<()>;

    /// Delete all debts and restart the ID sequence, so that the next saved
    /// debt gets ID 1.
    fn delete_all_debts(&mut self) -> DatabaseResult<()>;
}
