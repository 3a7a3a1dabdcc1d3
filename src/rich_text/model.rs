// src/rich_text/model.rs
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::TryFrom;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
    static ref FONT_WEIGHT: Regex = Regex::new(r"^(normal|bold|lighter|bolder|[1-9]00)$").unwrap();
    static ref FONT_STYLE: Regex = Regex::new(r"^(normal|italic|oblique)$").unwrap();
}

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BlockType {
    #[default]
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "quote")]
    Quote,
}

impl BlockType {
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            BlockType::Heading1 | BlockType::Heading2 | BlockType::Heading3
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

// Moves `key` out of `extra` when its value has the typed shape; otherwise it stays there as-is
fn take_typed<T: DeserializeOwned>(extra: &mut Map<String, Value>, key: &str) -> Option<T> {
    let parsed = serde_json::from_value(extra.get(key)?.clone()).ok()?;
    extra.remove(key);
    Some(parsed)
}

/// Character-level styling. Keys mirror the CSS property names the editor
/// stores. Values the typed fields cannot hold (`"fontSize": "16px"`,
/// `"fontWeight": 700`) and unrecognised keys are carried through untouched
/// in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct InlineStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for InlineStyles {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            font_weight: take_typed(&mut extra, "fontWeight"),
            font_style: take_typed(&mut extra, "fontStyle"),
            text_decoration: take_typed(&mut extra, "textDecoration"),
            font_size: take_typed(&mut extra, "fontSize"),
            color: take_typed(&mut extra, "color"),
            background_color: take_typed(&mut extra, "backgroundColor"),
            extra,
        }
    }
}

impl InlineStyles {
    pub fn has_mark(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => match self.font_weight.as_deref() {
                Some("bold") | Some("bolder") => true,
                Some(weight) => weight.parse::<u32>().map_or(false, |w| w >= 600),
                // Numeric weight kept as stored
                None => self
                    .extra
                    .get("fontWeight")
                    .and_then(Value::as_u64)
                    .map_or(false, |w| w >= 600),
            },
            Mark::Italic => matches!(self.font_style.as_deref(), Some("italic") | Some("oblique")),
            Mark::Underline => self
                .text_decoration
                .as_deref()
                .map_or(false, |d| d.split_whitespace().any(|token| token == "underline")),
        }
    }

    pub fn set_mark(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => {
                self.extra.remove("fontWeight");
                self.font_weight = on.then(|| "bold".to_string());
            }
            Mark::Italic => {
                self.extra.remove("fontStyle");
                self.font_style = on.then(|| "italic".to_string());
            }
            Mark::Underline => {
                self.extra.remove("textDecoration");
                let mut tokens: Vec<String> = self
                    .text_decoration
                    .as_deref()
                    .unwrap_or_default()
                    .split_whitespace()
                    .filter(|token| *token != "underline" && *token != "none")
                    .map(str::to_string)
                    .collect();
                if on {
                    tokens.insert(0, "underline".to_string());
                }
                self.text_decoration = if tokens.is_empty() {
                    None
                } else {
                    Some(tokens.join(" "))
                };
            }
        }
    }

    // Typed setters drop any untyped value stored under the same key
    pub fn set_font_size(&mut self, size: u32) {
        self.extra.remove("fontSize");
        self.font_size = Some(size);
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.extra.remove("color");
        self.color = color;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    #[serde(default)]
    pub styles: InlineStyles,
}

impl TextSpan {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            styles: InlineStyles::default(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

// An alignment outside the four known ones (e.g. "start") is kept in `extra`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct BlockStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for BlockStyles {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            text_align: take_typed(&mut extra, "textAlign"),
            extra,
        }
    }
}

impl BlockStyles {
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.extra.remove("textAlign");
        self.text_align = Some(align);
    }
}

// Wire shape of a block; older documents use a bare `text` field
#[derive(Deserialize)]
struct RawTextBlock {
    #[serde(default, rename = "type")]
    block_type: Option<BlockType>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Option<Vec<TextSpan>>,
    #[serde(default)]
    styles: BlockStyles,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTextBlock")]
pub struct TextBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: Vec<TextSpan>,
    pub styles: BlockStyles,
}

impl TryFrom<RawTextBlock> for TextBlock {
    type Error = String;

    fn try_from(raw: RawTextBlock) -> Result<Self, Self::Error> {
        let content = match (raw.text, raw.content) {
            (Some(_), Some(_)) => {
                return Err(
                    "Cannot use both \"text\" and \"content\" fields in one block".to_string(),
                )
            }
            (Some(text), None) => vec![TextSpan::plain(&text)],
            (None, Some(content)) => content,
            (None, None) => {
                return Err("Each block must have either \"text\" or \"content\" field".to_string())
            }
        };

        Ok(Self {
            block_type: raw.block_type.unwrap_or_default(),
            content,
            styles: raw.styles,
        })
    }
}

impl TextBlock {
    pub fn new(block_type: BlockType, text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![TextSpan::plain(text)]
        };
        Self {
            block_type,
            content,
            styles: BlockStyles::default(),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::new(BlockType::Paragraph, text)
    }

    pub fn text(&self) -> String {
        self.content.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.content.iter().map(TextSpan::char_len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RichDocument {
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl RichDocument {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    pub fn char_len(&self) -> usize {
        self.blocks.iter().map(TextBlock::char_len).sum()
    }
}

/// Document-wide defaults applied under the per-block and per-span styles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentStyles {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.font_size {
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
                return Err(format!(
                    "fontSize must be between {} and {}",
                    MIN_FONT_SIZE, MAX_FONT_SIZE
                ));
            }
        }
        if let Some(weight) = &self.font_weight {
            if !FONT_WEIGHT.is_match(weight) {
                return Err(format!("Invalid fontWeight: {}", weight));
            }
        }
        if let Some(style) = &self.font_style {
            if !FONT_STYLE.is_match(style) {
                return Err(format!("Invalid fontStyle: {}", style));
            }
        }
        if let Some(height) = self.line_height {
            if !(0.5..=3.0).contains(&height) {
                return Err("lineHeight must be between 0.5 and 3.0".to_string());
            }
        }
        for (name, color) in [("color", &self.color), ("backgroundColor", &self.background_color)] {
            if let Some(color) = color {
                if !HEX_COLOR.is_match(color) {
                    return Err(format!("{} must be a #RRGGBB colour", name));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_text_block_becomes_single_span() {
        let block: TextBlock = serde_json::from_value(json!({"type": "quote", "text": "hi"})).unwrap();
        assert_eq!(block.block_type, BlockType::Quote);
        assert_eq!(block.content, vec![TextSpan::plain("hi")]);
    }

    #[test]
    fn block_with_text_and_content_is_rejected() {
        let result: Result<TextBlock, _> = serde_json::from_value(json!({
            "text": "a",
            "content": [{"text": "b"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn block_without_text_is_rejected() {
        let result: Result<TextBlock, _> = serde_json::from_value(json!({"type": "paragraph"}));
        assert!(result.is_err());
    }

    #[test]
    fn inline_styles_keep_unknown_keys() {
        let span: TextSpan = serde_json::from_value(json!({
            "text": "x",
            "styles": {"fontWeight": "700", "letterSpacing": "2px"}
        }))
        .unwrap();
        assert!(span.styles.has_mark(Mark::Bold));
        let back = serde_json::to_value(&span).unwrap();
        assert_eq!(back["styles"]["letterSpacing"], "2px");
    }

    #[test]
    fn untyped_style_values_survive_a_round_trip() {
        let block: TextBlock = serde_json::from_value(json!({
            "type": "paragraph",
            "content": [
                {"text": "a", "styles": {"fontWeight": 700}},
                {"text": "b", "styles": {"fontSize": "16px", "color": "#112233"}}
            ],
            "styles": {"textAlign": "start"}
        }))
        .unwrap();

        assert!(block.content[0].styles.has_mark(Mark::Bold));
        assert_eq!(block.content[1].styles.font_size, None);
        assert_eq!(block.content[1].styles.color.as_deref(), Some("#112233"));
        assert_eq!(block.styles.text_align, None);

        let back = serde_json::to_value(&block).unwrap();
        assert_eq!(back["content"][0]["styles"], json!({"fontWeight": 700}));
        assert_eq!(back["content"][1]["styles"], json!({"fontSize": "16px", "color": "#112233"}));
        assert_eq!(back["styles"], json!({"textAlign": "start"}));
    }

    #[test]
    fn typed_setters_replace_untyped_values() {
        let mut styles: InlineStyles = serde_json::from_value(json!({"fontSize": "16px"})).unwrap();
        styles.set_font_size(20);
        assert_eq!(serde_json::to_value(&styles).unwrap(), json!({"fontSize": 20}));

        let mut block_styles: BlockStyles = serde_json::from_value(json!({"textAlign": "start"})).unwrap();
        block_styles.set_text_align(TextAlign::Center);
        assert_eq!(serde_json::to_value(&block_styles).unwrap(), json!({"textAlign": "center"}));
    }

    #[test]
    fn underline_toggle_keeps_other_decorations() {
        let mut styles = InlineStyles {
            text_decoration: Some("line-through".to_string()),
            ..InlineStyles::default()
        };
        styles.set_mark(Mark::Underline, true);
        assert_eq!(styles.text_decoration.as_deref(), Some("underline line-through"));
        styles.set_mark(Mark::Underline, false);
        assert_eq!(styles.text_decoration.as_deref(), Some("line-through"));
    }

    #[test]
    fn document_styles_validation() {
        let styles: DocumentStyles = serde_json::from_value(json!({
            "fontSize": 14, "color": "#112233", "textAlign": "justify"
        }))
        .unwrap();
        assert!(styles.validate().is_ok());

        let bad = DocumentStyles {
            color: Some("red".to_string()),
            ..DocumentStyles::default()
        };
        assert!(bad.validate().is_err());

        let too_big = DocumentStyles {
            font_size: Some(100),
            ..DocumentStyles::default()
        };
        assert!(too_big.validate().is_err());
    }
}
