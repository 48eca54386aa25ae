//! Internal EZK util functions shared between crates.

use nom::character::complete::digit0;
use nom::combinator::map_res;
use nom::error::VerboseError;
use std::str::FromStr;

pub type IResult<I, O> = nom::IResult<I, O, nom::error::VerboseError<I>>;
pub use nom::Finish;

pub fn verbose_error_to_owned(i: VerboseError<&str>) -> VerboseError<String> {
    VerboseError {
        errors: i
            .errors
            .into_iter()
            .map(|(i, kind)| (i.into(), kind))
            .collect(),
    }
}

/// Parse the longest decimal prefix of the input, the way C's `atoi` does.
///
/// Input without a leading digit yields `T::default()`. Fails only if the digits do not fit into `T`.
pub fn leading_number<T>(i: &str) -> IResult<&str, T>
where
    T: FromStr + Default,
{
    map_res(digit0, |digits: &str| {
        if digits.is_empty() {
            Ok(T::default())
        } else {
            digits.parse()
        }
    })(i)
}

/// [`leading_number`] without the remaining input, `None` on overflow
pub fn atoi<T>(i: &str) -> Option<T>
where
    T: FromStr + Default,
{
    leading_number(i).ok().map(|(_, n)| n)
}

/// Split `i` on `sep` skipping empty tokens, like repeated `strtok` calls
pub fn tokens(i: &str, sep: char) -> impl Iterator<Item = &str> {
    i.split(sep).filter(|token| !token.is_empty())
}
