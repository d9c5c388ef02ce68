use nom::error::ParseError;
use nom::{IResult, Parser};

/// A list of `item`s separated by `sep`, between `pre` and `term`.
///
/// Unlike `delimited(pre, separated_list0(sep, item), term)`, a
/// failing item is reported as such, instead of as a missing
/// terminator, unless the terminator is actually there.
///
/// The list may be empty, and may have a trailing separator.
pub fn delimited_list<I, E, P, F, S, T>(
    mut pre: P,
    mut item: F,
    mut sep: S,
    mut term: T,
) -> impl Parser<I, Output = Vec<<F as Parser<I>>::Output>, Error = E>
where
    I: Clone,
    E: ParseError<I>,
    P: Parser<I, Error = E>,
    F: Parser<I, Error = E>,
    S: Parser<I, Error = E>,
    T: Parser<I, Error = E>,
{
    move |input: I| -> IResult<I, Vec<<F as Parser<I>>::Output>, E> {
        let (mut input, _) = pre.parse(input)?;
        let mut list = Vec::new();
        loop {
            let (i, value) = match item.parse(input.clone()) {
                Ok((i, value)) => (i, value),
                Err(item_error) => match term.parse(input) {
                    Ok((i, _)) => return Ok((i, list)),
                    Err(_) => return Err(item_error),
                },
            };
            list.push(value);
            match sep.parse(i.clone()) {
                Ok((i, _)) => input = i,
                Err(_) => {
                    input = i;
                    break;
                }
            }
        }
        let (input, _) = term.parse(input)?;
        Ok((input, list))
    }
}
