//! Ordered text fragments and the scratch buffer used to build them.

use std::{fmt, io::Write};

/// Indentation of every line inside the class body.
pub const TAB: &str = "  ";

/// The rendering of one structural unit: an append-only list of chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    chunks: Vec<String>,
}

impl Fragment {
    pub fn new() -> Self {
        Self { chunks: vec![] }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            chunks: vec![text.into()],
        }
    }

    pub fn push(&mut self, chunk: impl Into<String>) {
        self.chunks.push(chunk.into());
    }

    /// Appends `other` after the chunks already present.
    pub fn append(&mut self, other: Fragment) {
        self.chunks.extend(other.chunks);
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|c| c.is_empty())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.chunks {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

/// Committed fragments plus a scratch string.
///
/// The scratch buffer is shared by every step: [`TextBuffer::scratch`] clears it before handing
/// it out, [`TextBuffer::commit`] copies it into a new fragment. Nothing written to the scratch
/// buffer is visible until it is committed, so a step that fails half way leaves no trace.
#[derive(Debug, Default)]
pub struct TextBuffer {
    fragments: Vec<Fragment>,
    scratch: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scratch(&mut self) -> &mut String {
        self.scratch.clear();
        &mut self.scratch
    }

    /// Commits the scratch buffer as one fragment, keeping its allocation for the next step.
    pub fn commit(&mut self) {
        self.fragments.push(Fragment::from_text(self.scratch.as_str()));
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn flatten(&self) -> String {
        self.fragments.iter().map(|f| f.to_string()).collect()
    }

    pub fn write_to<W: Write>(&self, sink: &mut W) -> std::io::Result<()> {
        sink.write_all(self.flatten().as_bytes())?;
        sink.flush()
    }
}
