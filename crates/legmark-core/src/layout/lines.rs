use super::rows::Placed;
use super::LayoutOptions;

/// Append-only sequence of output lines for one page.
///
/// Line and paragraph breaks are pushed as discrete events; the text is joined
/// once in [`LineBuilder::finish`].
#[derive(Debug, Default)]
pub struct LineBuilder {
    lines: Vec<String>,
    current: String,
}

impl LineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_word(&mut self, text: &str, struck: bool, omit_struck: bool) {
        if struck {
            if !omit_struck {
                self.current.push_str("~~");
                self.current.push_str(text);
                self.current.push_str("~~");
            }
        } else {
            self.current.push_str(text);
        }
    }

    pub fn push_space(&mut self) {
        self.current.push(' ');
    }

    /// Close the current line, trimmed.
    pub fn break_line(&mut self) {
        let line = self.current.trim().to_string();
        self.current.clear();
        self.lines.push(line);
    }

    pub fn blank_line(&mut self) {
        self.lines.push(String::new());
    }

    /// Output lines so far, counting blank paragraph separators.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Assemble words in reading order into lines.
///
/// A row advance beyond the line-break threshold closes the line; beyond the
/// paragraph threshold a blank line follows. Within a line, a horizontal gap
/// wider than `word_gap` becomes a single space and narrower gaps join the
/// fragments directly. The final line is always flushed.
pub fn assemble(words: &[Placed<'_>], options: &LayoutOptions) -> LineBuilder {
    let mut builder = LineBuilder::new();
    let Some(first) = words.first() else {
        return builder;
    };

    let mut last_row = first.row;
    let mut last_x1 = first.word.bbox.x0;

    for placed in words {
        let advance = placed.row - last_row;
        if advance > options.line_break_threshold {
            builder.break_line();
            if advance > options.paragraph_break_threshold() {
                builder.blank_line();
            }
            last_x1 = placed.word.bbox.x0;
        }

        if placed.word.bbox.x0 - last_x1 > options.word_gap {
            builder.push_space();
        }
        builder.push_word(&placed.word.text, placed.word.struck, options.omit_struck);

        last_row = placed.row;
        last_x1 = placed.word.bbox.x1;
    }
    builder.break_line();

    builder
}
