//! Document: in-memory text surface
//!
//! A flat list of text runs and tokens with a single caret. Besides the
//! `TextSurface` contract it offers the host-side editing operations a
//! contenteditable element would perform: typing, backspace, caret moves.

use unicode_segmentation::UnicodeSegmentation;

use super::{byte_index, Caret, Inline, Node, RunId, TextRun, TextSurface, Token};
use crate::error::SpliceError;

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    caret: Option<Caret>,
    next_run: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with the caret in its only run
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Single-run document with the caret at the end
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            caret: None,
            next_run: 0,
        };
        let run = doc.alloc_run(text.to_string());
        doc.caret = Some(Caret::new(run.id, run.len()));
        doc.nodes.push(Node::Text(run));
        doc
    }

    fn alloc_run(&mut self, text: String) -> TextRun {
        let id = RunId(self.next_run);
        self.next_run += 1;
        TextRun { id, text, revision: 0 }
    }

    fn position(&self, id: RunId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| matches!(node, Node::Text(run) if run.id == id))
    }

    fn run_mut(&mut self, index: usize) -> Option<&mut TextRun> {
        match self.nodes.get_mut(index) {
            Some(Node::Text(run)) => Some(run),
            _ => None,
        }
    }

    /// Ids of all text runs in document order
    pub fn run_ids(&self) -> Vec<RunId> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Text(run) => Some(run.id),
                Node::Token(_) => None,
            })
            .collect()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Token(token) => Some(token),
            Node::Text(_) => None,
        })
    }

    /// Text runs and token texts concatenated
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .map(|node| match node {
                Node::Text(run) => run.text.as_str(),
                Node::Token(token) => token.text.as_str(),
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Host editing
    // -------------------------------------------------------------------------

    /// Type `text` at the caret
    pub fn insert_text(&mut self, text: &str) -> Result<Caret, SpliceError> {
        let caret = self.caret.ok_or(SpliceError::UnknownRun)?;
        let index = self.position(caret.run).ok_or(SpliceError::UnknownRun)?;
        let run = self.run_mut(index).ok_or(SpliceError::UnknownRun)?;
        if caret.offset > run.len() {
            return Err(SpliceError::OutOfBounds);
        }

        let at = byte_index(&run.text, caret.offset);
        run.text.insert_str(at, text);
        run.revision += 1;

        let caret = Caret::new(caret.run, caret.offset + text.chars().count());
        self.caret = Some(caret);
        Ok(caret)
    }

    /// Backspace. Removes one grapheme, or a whole token together with its
    /// separator. Returns false at the start of the document.
    pub fn delete_backward(&mut self) -> Result<bool, SpliceError> {
        let caret = self.caret.ok_or(SpliceError::UnknownRun)?;
        let index = self.position(caret.run).ok_or(SpliceError::UnknownRun)?;

        if caret.offset == 0 {
            if index == 0 {
                return Ok(false);
            }
            let prev_end = match &self.nodes[index - 1] {
                Node::Token(_) => None,
                Node::Text(prev) => Some(Caret::new(prev.id, prev.len())),
            };
            return match prev_end {
                None => {
                    self.remove_token(index - 1);
                    Ok(true)
                }
                Some(end) => {
                    self.caret = Some(end);
                    self.delete_backward()
                }
            };
        }

        let run = self.run_mut(index).ok_or(SpliceError::UnknownRun)?;
        let end = byte_index(&run.text, caret.offset);
        let start = run.text[..end]
            .grapheme_indices(true)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        let start_offset = run.text[..start].chars().count();
        run.text.replace_range(start..end, "");
        run.revision += 1;
        self.caret = Some(Caret::new(caret.run, start_offset));

        let follows_token = index > 0 && matches!(self.nodes[index - 1], Node::Token(_));
        if start_offset == 0 && follows_token {
            self.remove_token(index - 1);
        }
        Ok(true)
    }

    /// Remove the token at `index` and join the runs around it
    fn remove_token(&mut self, index: usize) {
        self.nodes.remove(index);
        if index == 0 || index >= self.nodes.len() {
            return;
        }

        let (prev_id, prev_len) = match &self.nodes[index - 1] {
            Node::Text(prev) => (prev.id, prev.len()),
            Node::Token(_) => return,
        };
        let next = match &self.nodes[index] {
            Node::Text(next) => next.clone(),
            Node::Token(_) => return,
        };

        if let Some(prev) = self.run_mut(index - 1) {
            prev.text.push_str(&next.text);
            prev.revision += 1;
        }
        self.nodes.remove(index);

        if let Some(caret) = self.caret {
            if caret.run == next.id {
                self.caret = Some(Caret::new(prev_id, prev_len + caret.offset));
            }
        }
    }

    /// Put the caret at the end of the last run
    pub fn move_to_end(&mut self) {
        let last = self.nodes.iter().rev().find_map(|node| match node {
            Node::Text(run) => Some(Caret::new(run.id, run.len())),
            Node::Token(_) => None,
        });
        self.caret = last;
    }

    /// Drop focus (no caret)
    pub fn blur(&mut self) {
        self.caret = None;
    }
}

impl TextSurface for Document {
    fn caret(&self) -> Option<Caret> {
        self.caret
    }

    fn set_caret(&mut self, caret: Caret) -> Result<(), SpliceError> {
        let run = self.run(caret.run).ok_or(SpliceError::UnknownRun)?;
        if caret.offset > run.len() {
            return Err(SpliceError::OutOfBounds);
        }
        self.caret = Some(caret);
        Ok(())
    }

    fn run(&self, id: RunId) -> Option<&TextRun> {
        self.nodes.iter().find_map(|node| match node {
            Node::Text(run) if run.id == id => Some(run),
            _ => None,
        })
    }

    fn replace_range(
        &mut self,
        run: RunId,
        start: usize,
        end: usize,
        replacement: Vec<Inline>,
    ) -> Result<Caret, SpliceError> {
        let index = self.position(run).ok_or(SpliceError::UnknownRun)?;
        let (head, tail) = match &self.nodes[index] {
            Node::Text(current) => {
                if start > end || end > current.len() {
                    return Err(SpliceError::OutOfBounds);
                }
                let text = &current.text;
                (
                    text[..byte_index(text, start)].to_string(),
                    text[byte_index(text, end)..].to_string(),
                )
            }
            Node::Token(_) => return Err(SpliceError::UnknownRun),
        };

        let mut replacement = replacement.into_iter().peekable();
        let mut head = head;
        while let Some(Inline::Text(_)) = replacement.peek() {
            if let Some(Inline::Text(text)) = replacement.next() {
                head.push_str(&text);
            }
        }

        let mut caret = Caret::new(run, head.chars().count());
        let mut inserted = Vec::new();
        for inline in replacement {
            match inline {
                Inline::Token(token) => inserted.push(Node::Token(token)),
                Inline::Text(text) => {
                    let new_run = self.alloc_run(text);
                    caret = Caret::new(new_run.id, new_run.len());
                    inserted.push(Node::Text(new_run));
                }
            }
        }

        let ends_with_token = matches!(inserted.last(), Some(Node::Token(_)));
        if !tail.is_empty() || ends_with_token {
            let tail_run = self.alloc_run(tail);
            if ends_with_token {
                caret = Caret::new(tail_run.id, 0);
            }
            inserted.push(Node::Text(tail_run));
        }

        if let Some(current) = self.run_mut(index) {
            current.text = head;
            current.revision += 1;
        }
        self.nodes.splice(index + 1..index + 1, inserted);
        self.caret = Some(caret);
        Ok(caret)
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
