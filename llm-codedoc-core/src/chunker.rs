//! Line-aligned greedy chunking.
//!
//! Chunk size is measured in characters as a cheap proxy for tokens so the source is not
//! re-tokenized for every line. The proxy can under- or overshoot the real token count of
//! a chunk; chunk boundaries are kept identical to the character rule on purpose.

use tracing::debug;

/// A contiguous run of whole source lines, each terminated by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence, starting at 0.
    pub index: usize,
    /// 1-based line number of the first line in this chunk.
    pub first_line: usize,
    pub line_count: usize,
    pub text: String,
}

impl Chunk {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Chunk text without its final line terminator, for display inside a code fence.
    pub fn code(&self) -> &str {
        self.text.strip_suffix('\n').unwrap_or(&self.text)
    }

    pub fn last_line(&self) -> usize {
        self.first_line + self.line_count - 1
    }
}

/// Split `source` into chunks of at most roughly `limit` characters.
///
/// A line is never split. A single line longer than `limit` becomes a chunk of its own.
/// Empty input produces no chunks.
pub fn chunk_source(source: &str, limit: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut first_line = 1usize;
    let mut line_count = 0usize;

    for (line_no, line) in source.lines().enumerate() {
        let line_chars = line.chars().count();
        if current_chars + line_chars + 1 > limit && !current.is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                first_line,
                line_count,
                text: std::mem::take(&mut current),
            });
            current_chars = 0;
            line_count = 0;
            first_line = line_no + 1;
        }
        current.push_str(line);
        current.push('\n');
        current_chars += line_chars + 1;
        line_count += 1;
    }

    if !current.is_empty() {
        chunks.push(Chunk {
            index: chunks.len(),
            first_line,
            line_count,
            text: current,
        });
    }

    debug!(
        limit,
        source_bytes = source.len(),
        chunks = chunks.len(),
        "Chunked source"
    );
    chunks
}
