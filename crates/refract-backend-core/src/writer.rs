//! Indentation-aware text assembly for generated shader source.

/// Accumulates generated source text with four-space indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    indent: usize,
}

impl CodeWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one indented line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Writes `header` followed by an opening brace and indents.
    pub fn open(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.line("{");
        self.indent += 1;
    }

    /// Dedents and closes the current brace.
    pub fn close(&mut self) {
        self.indent -= 1;
        self.line("}");
    }

    /// Dedents and closes the current brace with a trailing semicolon.
    pub fn close_semi(&mut self) {
        self.indent -= 1;
        self.line("};");
    }

    /// The assembled text.
    pub fn finish(self) -> String {
        self.buf
    }
}
