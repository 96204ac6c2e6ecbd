//! The core of the bot logic: the arithmetic behind debts.

use std::collections::BTreeMap;

use log::debug;

use crate::types::{Amount, NetDebt, NewDebt, SavedDebt};

/// Sum the debts of every debtor towards every creditor.
///
/// Resolved debts do not add to the total, but they still produce an entry for
/// their debtor/creditor pair, possibly with a zero amount. The output is sorted
/// by debtor first and creditor second.
pub fn compute_net_debts(debts: &[SavedDebt]) -> Vec<NetDebt> {
    let mut debt_map: BTreeMap<i64, BTreeMap<i64, Amount>> = BTreeMap::new();

    for debt in debts {
        let total = debt_map
            .entry(debt.debtor_id)
            .or_default()
            .entry(debt.creditor_id)
            .or_insert(0);

        if !debt.resolved {
            *total += debt.amount;
        }
    }

    debt_map
        .into_iter()
        .flat_map(|(debtor_id, creditors)| {
            creditors
                .into_iter()
                .map(move |(creditor_id, amount)| NetDebt::new(debtor_id, creditor_id, amount))
        })
        .collect()
}

/// Compute the actual debt from the amount a debtor spent.
///
/// A required tip percentage is applied first, then the flat tip is split evenly
/// among all participants plus one.
pub fn apply_tip(
    amount: f64,
    tip: Option<Amount>,
    required_tip_percentage: Option<f64>,
    participant_count: usize,
) -> Amount {
    let mut actual_debt = amount;

    if let Some(percentage) = required_tip_percentage {
        let tip_multiplier = percentage / 100.0 + 1.0;
        actual_debt = (actual_debt * tip_multiplier).round();
    }

    if let Some(tip) = tip {
        let tip_part = (tip as f64 / (participant_count + 1) as f64).round();
        actual_debt += tip_part;
    }

    debug!("Debt of {amount} becomes {actual_debt} after tips");
    actual_debt.round() as Amount
}

/// Pair every debtor with the amount collected for them.
///
/// Debtors are prompted starting from the end of the list, so the amounts are in
/// reverse order with respect to *debtor_ids*. Extra debtors or amounts are ignored.
pub fn pair_debts(
    debtor_ids: &[i64],
    amounts: &[Amount],
    creditor_id: i64,
    expense_id: i64,
) -> Vec<NewDebt> {
    let mut result = Vec::with_capacity(debtor_ids.len());

    for (i, &debtor_id) in debtor_ids.iter().enumerate() {
        if i >= amounts.len() {
            break;
        }
        let amount = amounts[amounts.len() - 1 - i];
        result.push(NewDebt::new(amount, debtor_id, creditor_id, expense_id));
    }

    result
}
