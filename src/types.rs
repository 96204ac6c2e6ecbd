use chrono::{DateTime, Utc};

pub type Amount = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub amount: Amount,
    pub payer_id: i64,
    pub participant_ids: Vec<i64>,
    pub description: String,
    pub tip: Option<Amount>,
    pub required_tip_percentage: Option<f64>,
    pub resolved: bool,
}

/// An expense that has not been saved yet, hence it has no ID.
#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub struct NewExpense {
    pub amount: Amount,
    pub payer_id: i64,
    pub participant_ids: Vec<i64>,
    pub description: String,
    pub tip: Option<Amount>,
    pub required_tip_percentage: Option<f64>,
}

/// A debt that has not been saved yet, hence it has no ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDebt {
    pub amount: Amount,
    pub debtor_id: i64,
    pub creditor_id: i64,
    pub expense_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedDebt {
    pub id: i64,
    pub amount: Amount,
    pub debtor_id: i64,
    pub creditor_id: i64,
    pub expense_id: i64,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetDebt {
    pub debtor_id: i64,
    pub creditor_id: i64,
    pub amount: Amount,
}

#[cfg(test)]
impl Member {
    pub fn new(id: i64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
impl NewExpense {
    pub fn new(
        amount: Amount,
        payer_id: i64,
        participant_ids: Vec<i64>,
        description: &str,
    ) -> NewExpense {
        NewExpense {
            amount,
            payer_id,
            participant_ids,
            description: description.to_string(),
            tip: None,
            required_tip_percentage: None,
        }
    }

    pub fn with_tip(mut self, tip: Amount) -> NewExpense {
        self.tip = Some(tip);
        self
    }

    pub fn with_required_tip_percentage(mut self, percentage: f64) -> NewExpense {
        self.required_tip_percentage = Some(percentage);
        self
    }
}

impl NewDebt {
    pub fn new(amount: Amount, debtor_id: i64, creditor_id: i64, expense_id: i64) -> NewDebt {
        NewDebt {
            amount,
            debtor_id,
            creditor_id,
            expense_id,
        }
    }
}

impl NetDebt {
    pub fn new(debtor_id: i64, creditor_id: i64, amount: Amount) -> NetDebt {
        NetDebt {
            debtor_id,
            creditor_id,
            amount,
        }
    }
}

/// Find the name of the member with the given ID.
///
/// Unknown members are rendered with an empty name.
pub fn member_name(members: &[Member], member_id: i64) -> &str {
    members
        .iter()
        .find(|m| m.id == member_id)
        .map(|m| m.name.as_str())
        .unwrap_or("")
}

/// A message the bot sends back, optionally with an inline keyboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<Choice>,
}

/// A button of the inline keyboard: pressing it sends *data* back to the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub data: String,
}

impl Reply {
    pub fn text<T: Into<String>>(text: T) -> Reply {
        Reply {
            text: text.into(),
            choices: vec![],
        }
    }

    pub fn with_choices<T: Into<String>>(text: T, choices: Vec<Choice>) -> Reply {
        Reply {
            text: text.into(),
            choices,
        }
    }
}

impl Choice {
    pub fn new<T: Into<String>, U: Into<String>>(label: T, data: U) -> Choice {
        Choice {
            label: label.into(),
            data: data.into(),
        }
    }
}
