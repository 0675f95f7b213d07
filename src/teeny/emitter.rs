use std::io::{self, Write};

/// Accumulates generated C in two buffers.
///
/// The header holds everything that has to precede the statements
/// (includes, the opening of `main`, hoisted variable declarations) and
/// the body holds the statements in source order.
#[derive(Debug, Default)]
pub struct Emitter {
    header: String,
    body: String,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::default()
    }

    pub fn emit(&mut self, code: &str) {
        self.body.push_str(code);
    }

    pub fn emit_line(&mut self, code: &str) {
        self.body.push_str(code);
        self.body.push('\n');
    }

    pub fn header_line(&mut self, code: &str) {
        self.header.push_str(code);
        self.header.push('\n');
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Header followed by body.
    pub fn contents(&self) -> String {
        let mut out = String::with_capacity(self.header.len() + self.body.len());
        out.push_str(&self.header);
        out.push_str(&self.body);
        out
    }

    /// Writes the whole output in a single write and consumes the emitter,
    /// so nothing can be emitted after the flush.
    pub fn flush(self, writer: &mut dyn Write) -> io::Result<usize> {
        let contents = self.contents();
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        Ok(contents.len())
    }
}
