//! Produce the strings that are sent as bot messages.

use crate::types::{member_name, Choice, Expense, Member, NetDebt, SavedDebt};

pub const CANCEL_DATA: &str = "cancel";

pub fn format_debt_list(debts: &[SavedDebt], members: &[Member]) -> String {
    if debts.is_empty() {
        "Долгов пока нет".to_string()
    } else {
        debts
            .iter()
            .map(|d| format_debt(d, members))
            .fold("Текущие долги:".to_string(), |a, b| a + "\n" + &b)
    }
}

fn format_debt(debt: &SavedDebt, members: &[Member]) -> String {
    let state = if debt.resolved {
        "Погашен ✅"
    } else {
        "Не погашен ⛔️"
    };

    format!(
        "- {} должен {} {}, статус: {}",
        member_name(members, debt.debtor_id),
        member_name(members, debt.creditor_id),
        debt.amount,
        state
    )
}

/// Format the aggregated debts.
///
/// A pair with nothing left to pay replaces everything collected so far with
/// "Долгов нет!", and following pairs are appended to that.
pub fn format_net_debts(net_debts: &[NetDebt], members: &[Member]) -> String {
    let mut message = "Текущие долги между участниками:\n".to_string();

    for net_debt in net_debts {
        if net_debt.amount > 0 {
            message += &format!(
                "- {} должен {} {}\n",
                member_name(members, net_debt.debtor_id),
                member_name(members, net_debt.creditor_id),
                net_debt.amount
            );
        } else {
            message = "Долгов нет!".to_string();
        }
    }

    message
}

/// One button per expense, plus a button to cancel.
pub fn format_expense_choices(expenses: &[Expense]) -> Vec<Choice> {
    let mut choices: Vec<_> = expenses
        .iter()
        .map(|e| Choice::new(format!("{} в {}", e.amount, e.description), e.id.to_string()))
        .collect();
    choices.push(Choice::new("Отмена", CANCEL_DATA));
    choices
}

pub fn format_debt_choices(debts: &[SavedDebt], members: &[Member]) -> Vec<Choice> {
    debts
        .iter()
        .map(|d| {
            Choice::new(
                format!(
                    "Долг {} {} для {}",
                    d.amount,
                    member_name(members, d.debtor_id),
                    member_name(members, d.creditor_id)
                ),
                d.id.to_string(),
            )
        })
        .collect()
}

pub fn format_debtor_prompt(name: &str) -> String {
    format!("Сколько наел(а) {name}?")
}
