//! Parse the amount spent by a debtor.
//!
//! The user can type several numbers separated by '+', they are summed up
//! so that nobody has to do the math on the receipt.

use nom::{
    branch::alt,
    bytes::complete::take_till,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::error::InputError;

/// Parse an input like `10 + 5.5 + 4.5` and return the sum of its terms.
///
/// Every term must start with a number, anything after it up to the next '+'
/// is ignored: `10 руб` is 10 and `5,5` is 5. Empty terms are rejected.
pub fn parse_amount_sum(s: &str) -> Result<f64, InputError> {
    let result: IResult<&str, Vec<f64>> =
        all_consuming(separated_list1(char('+'), parse_term))(s);

    match result {
        Ok((_, terms)) => Ok(terms.iter().sum()),
        Err(_) => Err(InputError::invalid_amount(s)),
    }
}

fn parse_term(s: &str) -> IResult<&str, f64> {
    delimited(multispace0, parse_number, take_till(|c: char| c == '+'))(s)
}

/// Parse a decimal number with an optional exponent, like `-1.5e3`.
fn parse_number(s: &str) -> IResult<&str, f64> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    // '+' always separates terms, so an exponent can only be negative.
    let exponent = recognize(tuple((one_of("eE"), opt(char('-')), digit1)));

    map_res(
        recognize(tuple((opt(char('-')), mantissa, opt(exponent)))),
        |x: &str| x.parse::<f64>(),
    )(s)
}
