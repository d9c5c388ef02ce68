use crate::parseresult::PResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::multispace1;
use nom::combinator::value;
use nom::multi::many0;
use nom::sequence::delimited;
use nom::Parser;

/// Whitespace and comments, in any order.
pub fn spacelike(input: &[u8]) -> PResult<()> {
    value((), many0(alt((comment, value((), multispace1))))).parse(input)
}

pub fn comment(input: &[u8]) -> PResult<()> {
    value((), delimited(tag("@*"), take_until("*@"), tag("*@"))).parse(input)
}
