/// Utility that incrementally constructs Rust source code with
/// indentation handling.
#[derive(Debug, Default, Clone)]
pub struct SourceBuilder {
    content: String,
    indent_level: usize,
}

const INDENT: &str = "    ";

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            self.content.push('\n');
            return;
        }
        for _ in 0..self.indent_level {
            self.content.push_str(INDENT);
        }
        self.content.push_str(line);
        self.content.push('\n');
    }

    pub fn blank(&mut self) {
        self.content.push('\n');
    }

    /// Open a brace-delimited block: emits `head {` and indents.
    pub fn open(&mut self, head: &str) {
        self.push_line(&format!("{} {{", head));
        self.indent_level += 1;
    }

    /// Close the innermost block, optionally with a trailing token
    /// (e.g. `");"` for a closing paren-call).
    pub fn close(&mut self) {
        self.close_with("}");
    }

    /// Close the innermost block and open a chained one on the same
    /// line (e.g. `} else {`).
    pub fn chain(&mut self, line: &str) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
        self.push_line(line);
        self.indent_level += 1;
    }

    pub fn close_with(&mut self, tail: &str) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
        self.push_line(tail);
    }

    pub fn build(self) -> String {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
