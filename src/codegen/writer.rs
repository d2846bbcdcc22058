//! Indent-aware string builder for Apps Script source (2-space indent).

pub struct CodeWriter {
    buf: String,
    indent_level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(4096),
            indent_level: 0,
        }
    }

    /// Write one indented line.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buf.push_str("  ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write a `//` comment. Line terminators in `text` become spaces so
    /// the comment cannot end early.
    pub fn comment(&mut self, text: &str) {
        let single: String = text
            .chars()
            .map(|c| match c {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => ' ',
                c => c,
            })
            .collect();
        self.line(&format!("// {}", single));
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write `text {` and indent (e.g. `function main() {`).
    pub fn block_open(&mut self, text: &str) {
        self.line(&format!("{} {{", text));
        self.indent();
    }

    /// Dedent and write `}`.
    pub fn block_close(&mut self) {
        self.dedent();
        self.line("}");
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
