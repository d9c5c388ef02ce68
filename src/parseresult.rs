use nom::{Err, IResult};
use nom_language::error::{VerboseError, VerboseErrorKind};
use std::io::{self, Write};
use std::str::from_utf8;

/// Parser result, with verbose error.
pub type PResult<'a, O> = IResult<&'a [u8], O, VerboseError<&'a [u8]>>;

/// Build a hard parse failure at `input` carrying `msg`.
pub fn failure<'a, O>(input: &'a [u8], msg: &'static str) -> PResult<'a, O> {
    Err(Err::Failure(VerboseError {
        errors: vec![(input, VerboseErrorKind::Context(msg))],
    }))
}

/// Write a human readable report of a parse error in `buf` to `out`.
///
/// Each context message gets the offending source line, with a
/// caret under the position where the message applies.
pub fn show_errors(
    out: &mut impl Write,
    buf: &[u8],
    error: &Err<VerboseError<&[u8]>>,
    prefix: &str,
) -> io::Result<()> {
    match error {
        Err::Failure(VerboseError { ref errors })
        | Err::Error(VerboseError { ref errors }) => {
            let mut shown = 0;
            for (rest, err) in errors.iter().rev() {
                if let Some(message) = get_message(err) {
                    let pos = buf.len() - rest.len();
                    show_error(out, buf, pos, &message, prefix)?;
                    shown += 1;
                }
            }
            if shown == 0 {
                if let Some((rest, _)) = errors.first() {
                    let pos = buf.len() - rest.len();
                    show_error(out, buf, pos, "Unexpected input", prefix)?;
                }
            }
            Ok(())
        }
        Err::Incomplete(needed) => {
            let msg = format!("Incomplete: {needed:?}");
            show_error(out, buf, 0, &msg, prefix)
        }
    }
}

fn get_message(err: &VerboseErrorKind) -> Option<String> {
    match err {
        VerboseErrorKind::Context(msg) => Some((*msg).into()),
        VerboseErrorKind::Char(ch) => Some(format!("Expected {ch:?}")),
        VerboseErrorKind::Nom(_err) => None,
    }
}

/// Show `msg` with the line of `buf` containing `pos`, and a caret
/// under the column of `pos`.
fn show_error(
    out: &mut impl Write,
    buf: &[u8],
    pos: usize,
    msg: &str,
    prefix: &str,
) -> io::Result<()> {
    let line_start = buf[..pos]
        .iter()
        .rposition(|c| *c == b'\n')
        .map_or(0, |nl| nl + 1);
    let line_end = buf[pos..]
        .iter()
        .position(|c| *c == b'\n')
        .map_or(buf.len(), |nl| pos + nl);
    let line = from_utf8(&buf[line_start..line_end])
        .unwrap_or("(Failed to display line)");
    let line_no = bytecount::count(&buf[..line_start], b'\n') + 1;
    let column =
        String::from_utf8_lossy(&buf[line_start..pos]).chars().count() + 1;
    writeln!(out, "{prefix}{line_no:>4}:{line}")?;
    writeln!(out, "{prefix}     {:>column$} {msg}", "^")
}
