//! The debt creation wizard.
//!
//! First the user picks an expense, then the bot asks how much every participant
//! spent, one participant at a time. The payer of the expense is the creditor of
//! all the resulting debts.

use log::debug;

use crate::{
    bot_logic::{apply_tip, pair_debts},
    error::WizardError,
    parser::parse_amount_sum,
    types::{Amount, Expense, NewDebt},
    validator::validate_debt_amount,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    ChoosingExpense,
    CollectingAmounts,
}

#[derive(Clone, Debug, Default)]
pub struct CreateDebtSession {
    pub(super) step: Step,
    pub(super) expense_amount: Amount,
    /// Debtors still to be asked; the last one is asked first.
    pub(super) debtor_queue: Vec<i64>,
    /// All the debtors of the expense, in their original order.
    pub(super) debtor_ids: Vec<i64>,
    pub(super) creditor_id: i64,
    /// Debts in the order they were collected.
    pub(super) debt_amounts: Vec<Amount>,
    pub(super) current_debtor: Option<i64>,
    pub(super) expense_id: i64,
    pub(super) tip: Option<Amount>,
    pub(super) required_tip_percentage: Option<f64>,
}

impl CreateDebtSession {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn expense_id(&self) -> i64 {
        self.expense_id
    }

    #[cfg(test)]
    pub fn current_debtor(&self) -> Option<i64> {
        self.current_debtor
    }

    #[cfg(test)]
    pub fn pending_debtors(&self) -> &[i64] {
        &self.debtor_queue
    }

    /// Take everything needed from the chosen expense and start collecting amounts.
    pub fn select_expense(&mut self, expense: &Expense) {
        debug!("Expense {} chosen for debt creation", expense.id);
        self.expense_amount = expense.amount;
        self.expense_id = expense.id;
        self.creditor_id = expense.payer_id;
        self.debtor_queue = expense.participant_ids.clone();
        self.debtor_ids = expense.participant_ids.clone();
        self.tip = expense.tip;
        self.required_tip_percentage = expense.required_tip_percentage;
        self.step = Step::CollectingAmounts;
    }

    /// Move on to the next debtor and return their ID.
    pub fn next_debtor(&mut self) -> Option<i64> {
        self.current_debtor = self.debtor_queue.pop();
        self.current_debtor
    }

    /// Record the amount spent by the current debtor.
    ///
    /// On invalid input the session is left untouched, so the user can try again.
    /// Returns true if there are more debtors to ask.
    pub fn accept_amount(&mut self, input: &str) -> Result<bool, WizardError> {
        // An expense without participants takes one answer and yields no debts.
        let all_answered =
            !self.debtor_ids.is_empty() && self.debt_amounts.len() >= self.debtor_ids.len();
        if self.step != Step::CollectingAmounts || all_answered {
            return Err(WizardError::CorruptedSession);
        }

        let amount = parse_amount_sum(input)?;
        let amount = validate_debt_amount(input, amount, self.expense_amount)?;

        let actual_debt = apply_tip(
            amount,
            self.tip,
            self.required_tip_percentage,
            self.debtor_ids.len(),
        );
        debug!(
            "Debt of {actual_debt} for member {:?} on expense {}",
            self.current_debtor, self.expense_id
        );
        self.debt_amounts.push(actual_debt);

        Ok(!self.debtor_queue.is_empty())
    }

    /// The debts collected so far, each paired with its debtor.
    pub fn debts(&self) -> Vec<NewDebt> {
        pair_debts(
            &self.debtor_ids,
            &self.debt_amounts,
            self.creditor_id,
            self.expense_id,
        )
    }
}
