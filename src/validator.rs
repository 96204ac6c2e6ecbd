//! Functions that check the validity of user input.
//!
//! These functions are called after the parsing phase and execute
//! checks that are not easily done by the parser.

use crate::{error::InputError, types::Amount};

/// Check that the amount spent by a debtor makes sense for the chosen expense.
///
/// List of checks:
/// - the amount is a finite, strictly positive number
/// - the amount is not bigger than the whole expense
pub fn validate_debt_amount(
    input: &str,
    amount: f64,
    expense_amount: Amount,
) -> Result<f64, InputError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(InputError::invalid_amount(input));
    }

    if amount > expense_amount as f64 {
        return Err(InputError::amount_exceeds_expense(amount));
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_debt_amount() {
        assert_eq!(validate_debt_amount("20", 20.0, 100), Ok(20.0));
        assert_eq!(validate_debt_amount("100", 100.0, 100), Ok(100.0));
        assert_eq!(
            validate_debt_amount("-5", -5.0, 100),
            Err(InputError::invalid_amount("-5"))
        );
        assert_eq!(
            validate_debt_amount("0", 0.0, 100),
            Err(InputError::invalid_amount("0"))
        );
        assert!(validate_debt_amount("nan", f64::NAN, 100).is_err());
        assert_eq!(
            validate_debt_amount("100.5", 100.5, 100),
            Err(InputError::amount_exceeds_expense(100.5))
        );
    }
}
