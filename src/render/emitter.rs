//! Output sink for the renderer.

/// Spaces per nesting level.
pub const INDENT: usize = 4;

/// Receives rendered text fragments.
pub trait Emitter {
    fn emit(&mut self, text: &str);

    fn emit_newline(&mut self);

    fn emit_indent(&mut self, spaces: usize);

    /// One full line at `depth` nesting levels. Empty lines carry no indentation.
    fn emit_line(&mut self, depth: usize, text: &str) {
        if !text.is_empty() {
            self.emit_indent(depth * INDENT);
            self.emit(text);
        }
        self.emit_newline();
    }

    /// A block of code lines; embedded newlines start new lines at the same depth.
    fn emit_lines(&mut self, depth: usize, lines: &[String]) {
        for line in lines {
            for part in line.split('\n') {
                self.emit_line(depth, part);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(self) -> String {
        self.buffer
    }
}

impl Emitter for StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn emit_indent(&mut self, spaces: usize) {
        for _ in 0..spaces {
            self.buffer.push(' ');
        }
    }
}
