//! Parse the user input.

mod amount;

pub use amount::parse_amount_sum;

/// Parse the ID of a debt picked from the inline keyboard.
///
/// Zero is not a valid ID, like any non-numeric input.
pub fn parse_debt_id(s: &str) -> Option<i64> {
    s.trim().parse().ok().filter(|&id| id != 0)
}
