// src/rich_text/render.rs
use crate::rich_text::model::{BlockType, InlineStyles, Mark, RichDocument, TextBlock, TextSpan};
use serde_json::Value;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// One paragraph per '\n'. Empty lines and a trailing newline become empty
// paragraphs, and a '\r' before the '\n' stays in the text, so
// `to_plain_text` gives back the exact input.
pub fn from_plain_text(text: &str) -> RichDocument {
    RichDocument::new(text.split('\n').map(TextBlock::paragraph).collect())
}

pub fn to_plain_text(document: &RichDocument) -> String {
    document
        .blocks
        .iter()
        .map(TextBlock::text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn to_html(document: &RichDocument) -> String {
    let mut html = String::new();
    let mut in_list = false;

    for block in &document.blocks {
        let is_list_item = block.block_type == BlockType::ListItem;
        if is_list_item && !in_list {
            html.push_str("<ul>");
        } else if !is_list_item && in_list {
            html.push_str("</ul>");
        }
        in_list = is_list_item;

        let tag = block_tag(block.block_type);
        html.push('<');
        html.push_str(tag);
        if let Some(align) = block.styles.text_align {
            html.push_str(&format!(" style=\"text-align: {}\"", align.as_css()));
        }
        html.push('>');
        if block.block_type == BlockType::Code {
            html.push_str("<code>");
        }
        for span in &block.content {
            html.push_str(&span_html(span));
        }
        if block.block_type == BlockType::Code {
            html.push_str("</code>");
        }
        html.push_str("</");
        html.push_str(tag);
        html.push('>');
    }
    if in_list {
        html.push_str("</ul>");
    }
    html
}

fn block_tag(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Paragraph => "p",
        BlockType::Heading1 => "h1",
        BlockType::Heading2 => "h2",
        BlockType::Heading3 => "h3",
        BlockType::ListItem => "li",
        BlockType::Code => "pre",
        BlockType::Quote => "blockquote",
    }
}

fn span_html(span: &TextSpan) -> String {
    let styles = &span.styles;
    let mut html = escape_html(&span.text);

    let css = inline_css(styles);
    if !css.is_empty() {
        html = format!("<span style=\"{}\">{}</span>", escape_html(&css), html);
    }
    if styles.has_mark(Mark::Underline) {
        html = format!("<u>{}</u>", html);
    }
    if styles.has_mark(Mark::Italic) {
        html = format!("<em>{}</em>", html);
    }
    if styles.has_mark(Mark::Bold) {
        html = format!("<strong>{}</strong>", html);
    }
    html
}

fn inline_css(styles: &InlineStyles) -> String {
    let mut rules = Vec::new();
    match (styles.font_size, styles.extra.get("fontSize").and_then(Value::as_str)) {
        (Some(size), _) => rules.push(format!("font-size: {}px", size)),
        (None, Some(size)) => rules.push(format!("font-size: {}", size)),
        (None, None) => {}
    }
    if let Some(color) = &styles.color {
        rules.push(format!("color: {}", color));
    }
    if let Some(background) = &styles.background_color {
        rules.push(format!("background-color: {}", background));
    }
    rules.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::format::Selection;

    #[test]
    fn plain_text_round_trips_lines() {
        let document = from_plain_text("first\nsecond");
        assert_eq!(document.blocks.len(), 2);
        assert_eq!(to_plain_text(&document), "first\nsecond");
    }

    #[test]
    fn plain_text_conversion_is_lossless() {
        for text in ["a\n", "\n", "", "a\r\nb", "one\n\nthree\n"] {
            assert_eq!(to_plain_text(&from_plain_text(text)), text, "input {:?}", text);
        }
        assert_eq!(from_plain_text("a\n").blocks.len(), 2);
        assert_eq!(from_plain_text("a\r\nb").blocks[0].text(), "a\r");
    }

    #[test]
    fn untyped_font_size_is_rendered_verbatim() {
        let document: RichDocument = serde_json::from_value(serde_json::json!({
            "blocks": [{ "type": "paragraph", "content": [
                { "text": "x", "styles": { "fontSize": "16px", "fontWeight": 700 } }
            ]}]
        }))
        .unwrap();
        assert_eq!(
            to_html(&document),
            "<p><strong><span style=\"font-size: 16px\">x</span></strong></p>"
        );
    }

    #[test]
    fn html_escapes_and_marks_spans() {
        let mut document = from_plain_text("a <b> c");
        document.toggle_mark(Selection::within(0, 2, 5), Mark::Bold);
        assert_eq!(
            to_html(&document),
            "<p>a <strong>&lt;b&gt;</strong> c</p>"
        );
    }

    #[test]
    fn consecutive_list_items_share_one_list() {
        let mut document = from_plain_text("one\ntwo\nafter");
        document.blocks[0].block_type = BlockType::ListItem;
        document.blocks[1].block_type = BlockType::ListItem;
        assert_eq!(
            to_html(&document),
            "<ul><li>one</li><li>two</li></ul><p>after</p>"
        );
    }

    #[test]
    fn font_size_renders_as_inline_style() {
        let mut document = from_plain_text("big");
        document.set_font_size(Selection::within(0, 0, 3), 24);
        assert_eq!(
            to_html(&document),
            "<p><span style=\"font-size: 24px\">big</span></p>"
        );
    }
}
