//! Html output of template values.
use std::fmt::Display;
use std::io::{self, Write};

/// Anything that can be written into a rendered page.
///
/// There is an implementation for any `T: Display` that formats the
/// value and html-encodes the result, and one for [`Html`] that
/// writes its content verbatim.
pub trait ToHtml {
    /// Write self to `out`, in html representation.
    fn to_html(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Write the html represention of this value to a new buffer.
    fn to_buffer(&self) -> io::Result<HtmlBuffer> {
        let mut buf = Vec::new();
        self.to_html(&mut buf)?;
        Ok(HtmlBuffer { buf })
    }
}

/// Owned result of [`ToHtml::to_buffer`].
pub struct HtmlBuffer {
    buf: Vec<u8>,
}

impl HtmlBuffer {
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

impl std::fmt::Debug for HtmlBuffer {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(out, "HtmlBuffer({:?})", String::from_utf8_lossy(&self.buf))
    }
}

impl ToHtml for HtmlBuffer {
    fn to_html(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&self.buf)
    }
}

impl PartialEq<&str> for HtmlBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.buf == other.as_bytes()
    }
}

/// Wrapper for data that is already html (markup that must not be
/// escaped).
pub struct Html<T>(pub T);

impl<T: Display> ToHtml for Html<T> {
    #[inline]
    fn to_html(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{}", self.0)
    }
}

impl<T: Display> ToHtml for T {
    #[inline]
    fn to_html(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(Escaping(out), "{self}")
    }
}

/// Escape `text` for use in html content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut buf = Vec::with_capacity(text.len());
    // Writing to a Vec can't fail.
    let _ = Escaping(&mut buf).write_all(text.as_bytes());
    String::from_utf8_lossy(&buf).into_owned()
}

fn entity(c: u8) -> Option<&'static [u8]> {
    match c {
        b'"' => Some(b"&quot;"),
        b'&' => Some(b"&amp;"),
        b'\'' => Some(b"&#39;"),
        b'<' => Some(b"&lt;"),
        b'>' => Some(b"&gt;"),
        _ => None,
    }
}

/// A writer that html-escapes everything written through it.
struct Escaping<'a>(&'a mut dyn Write);

impl<'a> Write for Escaping<'a> {
    // `write` may write less than all of `data`; the rest will be
    // retried by `write_all` or `write_fmt`.
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match data.iter().position(|&c| entity(c).is_some()) {
            Some(0) => {
                if let Some(replacement) = entity(data[0]) {
                    self.0.write_all(replacement)?;
                }
                Ok(1)
            }
            Some(n) => self.0.write(&data[..n]),
            None => self.0.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
