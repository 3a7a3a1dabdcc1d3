// src/rich_text/format.rs
//
// Editing operations on a RichDocument. Offsets are counted in chars within
// a block, never in bytes.
use crate::rich_text::model::{
    BlockType, InlineStyles, Mark, RichDocument, TextAlign, TextBlock, TextSpan, MAX_FONT_SIZE,
    MIN_FONT_SIZE,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn caret(position: Position) -> Self {
        Self::new(position, position)
    }

    // Selection inside a single block
    pub fn within(block: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(block, start), Position::new(block, end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn ordered(&self) -> (Position, Position) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// What the toolbar should highlight for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormatState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub block_type: BlockType,
    pub alignment: TextAlign,
    pub font_size: Option<u32>,
}

impl FormatState {
    pub fn in_blockquote(&self) -> bool {
        self.block_type == BlockType::Quote
    }
}

fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

// Ensure a span boundary at `offset` and return the index of the span starting there
fn split_spans_at(spans: &mut Vec<TextSpan>, offset: usize) -> usize {
    let mut consumed = 0;
    for index in 0..spans.len() {
        if offset == consumed {
            return index;
        }
        let len = spans[index].char_len();
        if offset < consumed + len {
            let split = byte_index(&spans[index].text, offset - consumed);
            let tail = spans[index].text.split_off(split);
            let styles = spans[index].styles.clone();
            spans.insert(index + 1, TextSpan { text: tail, styles });
            return index + 1;
        }
        consumed += len;
    }
    spans.len()
}

// Drop empty spans and merge neighbours that share styles
fn normalize(block: &mut TextBlock) {
    let mut merged: Vec<TextSpan> = Vec::with_capacity(block.content.len());
    for span in block.content.drain(..) {
        if span.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.styles == span.styles => last.text.push_str(&span.text),
            _ => merged.push(span),
        }
    }
    block.content = merged;
}

impl RichDocument {
    fn ensure_block(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(TextBlock::paragraph(""));
        }
    }

    pub fn clamp(&self, position: Position) -> Position {
        if self.blocks.is_empty() {
            return Position::default();
        }
        let block = position.block.min(self.blocks.len() - 1);
        let offset = position.offset.min(self.blocks[block].char_len());
        Position::new(block, offset)
    }

    fn clamp_selection(&self, selection: Selection) -> (Position, Position) {
        let (start, end) = selection.ordered();
        (self.clamp(start), self.clamp(end))
    }

    // Char range of `block_index` covered by the selection
    fn block_range(&self, block_index: usize, start: Position, end: Position) -> (usize, usize) {
        let from = if block_index == start.block { start.offset } else { 0 };
        let to = if block_index == end.block {
            end.offset
        } else {
            self.blocks[block_index].char_len()
        };
        (from, to)
    }

    // Visit every span fully inside the selection, splitting at the edges
    fn for_each_selected_span<F>(&mut self, selection: Selection, mut visit: F)
    where
        F: FnMut(&mut TextSpan),
    {
        if self.blocks.is_empty() || selection.is_collapsed() {
            return;
        }
        let (start, end) = self.clamp_selection(selection);
        for block_index in start.block..=end.block {
            let (from, to) = self.block_range(block_index, start, end);
            if from >= to {
                continue;
            }
            let block = &mut self.blocks[block_index];
            let first = split_spans_at(&mut block.content, from);
            let last = split_spans_at(&mut block.content, to);
            for span in &mut block.content[first..last] {
                visit(span);
            }
            normalize(block);
        }
    }

    fn selected_styles(&self, selection: Selection) -> Vec<InlineStyles> {
        let mut copy = self.clone();
        let mut styles = Vec::new();
        copy.for_each_selected_span(selection, |span| styles.push(span.styles.clone()));
        styles
    }

    /// Toggle a mark over the selection: removed if every selected character
    /// already carries it, applied everywhere otherwise.
    pub fn toggle_mark(&mut self, selection: Selection, mark: Mark) {
        let styles = self.selected_styles(selection);
        if styles.is_empty() {
            return;
        }
        let all_marked = styles.iter().all(|s| s.has_mark(mark));
        self.for_each_selected_span(selection, |span| span.styles.set_mark(mark, !all_marked));
    }

    pub fn set_font_size(&mut self, selection: Selection, size: u32) {
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.for_each_selected_span(selection, |span| span.styles.set_font_size(size));
    }

    pub fn set_color(&mut self, selection: Selection, color: Option<String>) {
        self.for_each_selected_span(selection, |span| span.styles.set_color(color.clone()));
    }

    pub fn set_alignment(&mut self, selection: Selection, alignment: TextAlign) {
        if self.blocks.is_empty() {
            return;
        }
        let (start, end) = self.clamp_selection(selection);
        for block in &mut self.blocks[start.block..=end.block] {
            block.styles.set_text_align(alignment);
        }
    }

    /// Switch every touched block to `block_type`, or back to a paragraph when
    /// they all have it already (blockquote and list buttons behave this way).
    pub fn toggle_block_type(&mut self, selection: Selection, block_type: BlockType) {
        if self.blocks.is_empty() {
            return;
        }
        let (start, end) = self.clamp_selection(selection);
        let touched = &mut self.blocks[start.block..=end.block];
        let all_set = touched.iter().all(|block| block.block_type == block_type);
        let target = if all_set {
            BlockType::Paragraph
        } else {
            block_type
        };
        for block in touched {
            block.block_type = target;
        }
    }

    /// Insert text at `position`; newlines start new blocks. Returns the caret
    /// position after the inserted text.
    pub fn insert_text(&mut self, position: Position, text: &str) -> Position {
        self.ensure_block();
        let mut caret = self.clamp(position);
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                caret = self.split_block(caret);
            }
            if line.is_empty() {
                continue;
            }
            let block = &mut self.blocks[caret.block];
            let inherited = inherited_styles(block, caret.offset);
            let at = split_spans_at(&mut block.content, caret.offset);
            block.content.insert(
                at,
                TextSpan {
                    text: line.to_string(),
                    styles: inherited,
                },
            );
            normalize(block);
            caret.offset += line.chars().count();
        }
        caret
    }

    /// Split the block at `position`; the tail moves to a new block after it.
    pub fn split_block(&mut self, position: Position) -> Position {
        self.ensure_block();
        let position = self.clamp(position);
        let block = &mut self.blocks[position.block];
        let at = split_spans_at(&mut block.content, position.offset);
        let tail: Vec<TextSpan> = block.content.drain(at..).collect();
        let block_type = if block.block_type.is_heading() {
            BlockType::Paragraph
        } else {
            block.block_type
        };
        let new_block = TextBlock {
            block_type,
            content: tail,
            styles: block.styles.clone(),
        };
        self.blocks.insert(position.block + 1, new_block);
        Position::new(position.block + 1, 0)
    }

    /// Remove the selected text, joining blocks when the range spans several.
    pub fn delete_range(&mut self, selection: Selection) -> Position {
        if self.blocks.is_empty() {
            return Position::default();
        }
        let (start, end) = self.clamp_selection(selection);
        if start == end {
            return start;
        }

        if start.block == end.block {
            let block = &mut self.blocks[start.block];
            let first = split_spans_at(&mut block.content, start.offset);
            let last = split_spans_at(&mut block.content, end.offset);
            block.content.drain(first..last);
            normalize(block);
            return start;
        }

        let tail = {
            let last_block = &mut self.blocks[end.block];
            let at = split_spans_at(&mut last_block.content, end.offset);
            last_block.content.split_off(at)
        };
        self.blocks.drain(start.block + 1..=end.block);
        let block = &mut self.blocks[start.block];
        let at = split_spans_at(&mut block.content, start.offset);
        block.content.truncate(at);
        block.content.extend(tail);
        normalize(block);
        start
    }

    /// Formatting state for the toolbar, read from the model.
    pub fn format_state(&self, selection: Selection) -> FormatState {
        if self.blocks.is_empty() {
            return FormatState::default();
        }
        let (start, _) = self.clamp_selection(selection);
        let anchor_block = &self.blocks[start.block];

        let styles = if selection.is_collapsed() {
            vec![inherited_styles(anchor_block, start.offset)]
        } else {
            self.selected_styles(selection)
        };
        let all = |mark: Mark| !styles.is_empty() && styles.iter().all(|s| s.has_mark(mark));
        let font_size = match styles.first().and_then(|s| s.font_size) {
            Some(size) if styles.iter().all(|s| s.font_size == Some(size)) => Some(size),
            _ => None,
        };

        FormatState {
            bold: all(Mark::Bold),
            italic: all(Mark::Italic),
            underline: all(Mark::Underline),
            block_type: anchor_block.block_type,
            alignment: anchor_block.styles.text_align.unwrap_or_default(),
            font_size,
        }
    }
}

// Styles a character typed at `offset` would get: those of the preceding character
fn inherited_styles(block: &TextBlock, offset: usize) -> InlineStyles {
    let mut consumed = 0;
    for span in &block.content {
        let len = span.char_len();
        if offset > consumed && offset <= consumed + len {
            return span.styles.clone();
        }
        consumed += len;
    }
    block
        .content
        .first()
        .map(|span| span.styles.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> RichDocument {
        RichDocument::new(lines.iter().map(|l| TextBlock::paragraph(l)).collect())
    }

    #[test]
    fn toggle_bold_splits_and_remerges() {
        let mut document = doc(&["hello world"]);
        document.toggle_mark(Selection::within(0, 6, 11), Mark::Bold);

        let spans = &document.blocks[0].content;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "hello ");
        assert_eq!(spans[1].text, "world");
        assert!(spans[1].styles.has_mark(Mark::Bold));

        document.toggle_mark(Selection::within(0, 6, 11), Mark::Bold);
        assert_eq!(document.blocks[0].content, vec![TextSpan::plain("hello world")]);
    }

    #[test]
    fn partially_bold_selection_becomes_fully_bold() {
        let mut document = doc(&["abcdef"]);
        document.toggle_mark(Selection::within(0, 0, 3), Mark::Bold);
        document.toggle_mark(Selection::within(0, 0, 6), Mark::Bold);

        assert_eq!(document.blocks[0].content.len(), 1);
        assert!(document.blocks[0].content[0].styles.has_mark(Mark::Bold));
    }

    #[test]
    fn collapsed_selection_does_not_format() {
        let mut document = doc(&["abc"]);
        document.toggle_mark(Selection::caret(Position::new(0, 1)), Mark::Italic);
        assert_eq!(document.blocks[0].content, vec![TextSpan::plain("abc")]);
    }

    #[test]
    fn multibyte_offsets_are_chars() {
        let mut document = doc(&["héllo"]);
        document.toggle_mark(Selection::within(0, 1, 2), Mark::Underline);
        let spans = &document.blocks[0].content;
        assert_eq!(spans[1].text, "é");
        assert!(spans[1].styles.has_mark(Mark::Underline));
    }

    #[test]
    fn blockquote_toggles_back_to_paragraph() {
        let mut document = doc(&["one", "two"]);
        let both = Selection::new(Position::new(0, 0), Position::new(1, 1));
        document.toggle_block_type(both, BlockType::Quote);
        assert!(document.blocks.iter().all(|b| b.block_type == BlockType::Quote));
        assert!(document.format_state(Selection::caret(Position::new(1, 0))).in_blockquote());

        document.toggle_block_type(both, BlockType::Quote);
        assert!(document.blocks.iter().all(|b| b.block_type == BlockType::Paragraph));
    }

    #[test]
    fn typed_text_inherits_previous_styles() {
        let mut document = doc(&["ab"]);
        document.toggle_mark(Selection::within(0, 0, 2), Mark::Bold);
        let caret = document.insert_text(Position::new(0, 2), "cd");

        assert_eq!(caret, Position::new(0, 4));
        assert_eq!(document.blocks[0].content.len(), 1);
        assert_eq!(document.blocks[0].content[0].text, "abcd");
        assert!(document.format_state(Selection::caret(caret)).bold);
    }

    #[test]
    fn newline_splits_block_and_heading_continues_as_paragraph() {
        let mut document = RichDocument::new(vec![TextBlock::new(BlockType::Heading1, "Title")]);
        let caret = document.insert_text(Position::new(0, 5), "\nbody");
        assert_eq!(document.blocks.len(), 2);
        assert_eq!(document.blocks[1].block_type, BlockType::Paragraph);
        assert_eq!(document.blocks[1].text(), "body");
        assert_eq!(caret, Position::new(1, 4));
    }

    #[test]
    fn insert_into_empty_document_creates_paragraph() {
        let mut document = RichDocument::default();
        document.insert_text(Position::default(), "first");
        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].text(), "first");
    }

    #[test]
    fn delete_across_blocks_joins_them() {
        let mut document = doc(&["hello", "big", "world"]);
        let caret = document.delete_range(Selection::new(Position::new(2, 2), Position::new(0, 3)));
        assert_eq!(caret, Position::new(0, 3));
        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].text(), "helrld");
    }

    #[test]
    fn format_state_reports_common_font_size_and_alignment() {
        let mut document = doc(&["abcdef"]);
        let all = Selection::within(0, 0, 6);
        document.set_font_size(all, 200);
        document.set_alignment(all, TextAlign::Center);

        let state = document.format_state(all);
        assert_eq!(state.font_size, Some(MAX_FONT_SIZE));
        assert_eq!(state.alignment, TextAlign::Center);

        document.set_font_size(Selection::within(0, 0, 2), 12);
        assert_eq!(document.format_state(all).font_size, None);
    }

    #[test]
    fn out_of_range_positions_are_clamped() {
        let mut document = doc(&["abc"]);
        document.toggle_mark(Selection::within(0, 1, 99), Mark::Bold);
        assert_eq!(document.blocks[0].content[1].text, "bc");
        assert_eq!(document.clamp(Position::new(7, 7)), Position::new(0, 3));
    }
}
