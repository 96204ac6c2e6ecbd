//! The implementation of a data storage using Sqlite.

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection};
use tokio::task::block_in_place;

use crate::{
    error::DatabaseError,
    types::{Expense, Member, NewDebt, SavedDebt},
};

use super::{Database, DatabaseResult};

#[cfg(test)]
use crate::types::NewExpense;

mod schema;

pub struct SqliteDatabase {
    connection: Connection,
}

impl SqliteDatabase {
    pub fn new<P: AsRef<Path>>(path: P) -> DatabaseResult<SqliteDatabase> {
        block_in_place(|| {
            let connection = Connection::open(path)
                .map_err(|e| DatabaseError::new("cannot open database", e.into()))?;
            schema::create_all_tables(&connection)
                .map_err(|e| DatabaseError::new("cannot create tables", e))?;
            Ok(SqliteDatabase { connection })
        })
    }
}

// Members and expenses are managed outside the bot, tests seed them here.
#[cfg(test)]
impl SqliteDatabase {
    /// Register a new member of the shared fund and return its ID.
    pub fn add_member(&mut self, name: &str) -> DatabaseResult<i64> {
        let fn_impl = || -> anyhow::Result<i64> {
            let member_id = self.connection.query_row(
                "INSERT INTO member (name) VALUES (?1) RETURNING id",
                params![&name],
                |row| row.get(0),
            )?;
            Ok(member_id)
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot add member", e)))
    }

    /// Save an expense and return its ID.
    ///
    /// The order of the participants is preserved when reading the expense back.
    pub fn add_expense(&mut self, expense: &NewExpense) -> DatabaseResult<i64> {
        let mut fn_impl = || -> anyhow::Result<i64> {
            let tx = self.connection.transaction()?;

            let expense_id: i64 = {
                let mut insert_expense_stmt = tx.prepare_cached(
                    "INSERT INTO expense (amount, payer_id, description, tip, required_tip_percentage)
                     VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
                )?;

                insert_expense_stmt.query_row(
                    params![
                        &expense.amount,
                        &expense.payer_id,
                        &expense.description,
                        &expense.tip,
                        &expense.required_tip_percentage,
                    ],
                    |row| row.get(0),
                )?
            };

            debug!("expense_id is {expense_id}");

            {
                let mut insert_participant_stmt = tx.prepare_cached(
                    "INSERT INTO expense_participant (expense_id, member_id, position)
                     VALUES (?1, ?2, ?3)",
                )?;

                for (position, member_id) in expense.participant_ids.iter().enumerate() {
                    insert_participant_stmt.execute(params![
                        &expense_id,
                        member_id,
                        &(position as i64)
                    ])?;
                }
            }

            tx.commit()?;

            Ok(expense_id)
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot add expense", e)))
    }
}

impl Database for SqliteDatabase {
    fn get_members(&self) -> DatabaseResult<Vec<Member>> {
        let fn_impl = || -> anyhow::Result<Vec<Member>> {
            let mut stmt = self
                .connection
                .prepare_cached("SELECT id, name FROM member ORDER BY id")?;

            let member_iter = stmt.query_map((), |row| {
                Ok(Member {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;

            let members = member_iter.collect::<Result<_, _>>()?;
            Ok(members)
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot get members", e)))
    }

    fn get_unresolved_expenses(&self) -> DatabaseResult<Vec<Expense>> {
        let fn_impl = || -> anyhow::Result<Vec<Expense>> {
            let mut stmt = self.connection.prepare_cached(
                "SELECT e.id, e.amount, e.payer_id, e.description, e.tip,
                        e.required_tip_percentage, ep.member_id
                 FROM expense e
                 LEFT JOIN expense_participant ep ON e.id = ep.expense_id
                 WHERE e.resolved = FALSE
                 ORDER BY e.id, ep.position",
            )?;

            let expense_iter = stmt.query_map((), |row| {
                Ok(UnresolvedExpenseQuery {
                    id: row.get(0)?,
                    amount: row.get(1)?,
                    payer_id: row.get(2)?,
                    description: row.get(3)?,
                    tip: row.get(4)?,
                    required_tip_percentage: row.get(5)?,
                    member_id: row.get(6)?,
                })
            })?;

            let rows: Result<Vec<_>, _> = expense_iter.collect();
            Ok(parse_unresolved_expenses_query(rows?))
        };

        block_in_place(|| {
            fn_impl().map_err(|e| DatabaseError::new("cannot get unresolved expenses", e))
        })
    }

    fn resolve_expense(&self, expense_id: i64) -> DatabaseResult<()> {
        debug!("Resolving expense. Expense ID: {expense_id}");
        let fn_impl = || -> anyhow::Result<()> {
            self.connection.execute(
                "UPDATE expense SET resolved = TRUE WHERE id = ?1",
                params![&expense_id],
            )?;
            Ok(())
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot resolve expense", e)))
    }

    fn get_debts(&self) -> DatabaseResult<Vec<SavedDebt>> {
        let fn_impl = || -> anyhow::Result<Vec<SavedDebt>> {
            let mut stmt = self.connection.prepare_cached(
                "SELECT id, amount, debtor_id, creditor_id, expense_id, resolved, created_at
                 FROM debt ORDER BY id",
            )?;

            let debt_iter = stmt.query_map((), |row| {
                Ok(SavedDebt {
                    id: row.get(0)?,
                    amount: row.get(1)?,
                    debtor_id: row.get(2)?,
                    creditor_id: row.get(3)?,
                    expense_id: row.get(4)?,
                    resolved: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?;

            let debts = debt_iter.collect::<Result<_, _>>()?;
            Ok(debts)
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot get debts", e)))
    }

    fn save_debt(&self, debt: &NewDebt, created_at: DateTime<Utc>) -> DatabaseResult<i64> {
        let fn_impl = || -> anyhow::Result<i64> {
            let mut insert_debt_stmt = self.connection.prepare_cached(
                "INSERT INTO debt (amount, debtor_id, creditor_id, expense_id, resolved, created_at)
                 VALUES (?1, ?2, ?3, ?4, FALSE, ?5) RETURNING id",
            )?;

            let debt_id = insert_debt_stmt.query_row(
                params![
                    &debt.amount,
                    &debt.debtor_id,
                    &debt.creditor_id,
                    &debt.expense_id,
                    &created_at
                ],
                |row| row.get(0),
            )?;

            debug!("debt_id is {debt_id}");
            Ok(debt_id)
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot save debt", e)))
    }

    fn delete_debt(&self, debt_id: i64) -> DatabaseResult<()> {
        debug!("Deleting debt. Debt ID: {debt_id}");
        let fn_impl = || -> anyhow::Result<()> {
            self.connection
                .execute("DELETE FROM debt WHERE id = ?1", params![&debt_id])?;
            Ok(())
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot delete debt", e)))
    }

    fn resolve_all_debts(&self) -> DatabaseResult<()> {
        debug!("Marking all debts as resolved");
        let fn_impl = || -> anyhow::Result<()> {
            self.connection
                .execute("UPDATE debt SET resolved = TRUE", ())?;
            Ok(())
        };

        block_in_place(|| {
            fn_impl().map_err(|e| DatabaseError::new("cannot resolve all debts", e))
        })
    }

    fn delete_all_debts(&mut self) -> DatabaseResult<()> {
        debug!("Deleting all debts and restarting the ID sequence");
        let mut fn_impl = || -> anyhow::Result<()> {
            let tx = self.connection.transaction()?;
            tx.execute("DELETE FROM debt", ())?;
            // AUTOINCREMENT keeps its counter in sqlite_sequence: dropping the row
            // restarts the IDs from 1.
            tx.execute("DELETE FROM sqlite_sequence WHERE name = 'debt'", ())?;
            tx.commit()?;
            Ok(())
        };

        block_in_place(|| fn_impl().map_err(|e| DatabaseError::new("cannot delete all debts", e)))
    }
}

/// Group the joined rows by expense, keeping the participants in the order
/// they were returned.
fn parse_unresolved_expenses_query(rows: Vec<UnresolvedExpenseQuery>) -> Vec<Expense> {
    let mut result = BTreeMap::new();
    for row in rows {
        let entry = result.entry(row.id).or_insert_with(|| Expense {
            id: row.id,
            amount: row.amount,
            payer_id: row.payer_id,
            participant_ids: vec![],
            description: row.description.clone(),
            tip: row.tip,
            required_tip_percentage: row.required_tip_percentage,
            resolved: false,
        });

        if let Some(member_id) = row.member_id {
            entry.participant_ids.push(member_id);
        }
    }

    result.into_values().collect()
}

struct UnresolvedExpenseQuery {
    id: i64,
    amount: i64,
    payer_id: i64,
    description: String,
    tip: Option<i64>,
    required_tip_percentage: Option<f64>,
    member_id: Option<i64>,
}
