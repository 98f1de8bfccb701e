//! Entity highlighting
//!
//! Renders labelled character spans over a text as coloured inline HTML.
//! Input is either a token-annotated document, which is first converted to
//! character spans, or an already converted `{text, ents}` document. Span
//! order is a caller contract: unsorted input fails before anything is
//! rendered.

pub mod palette;

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

pub use palette::{get_colors, DEFAULT_COLOR, PRESET12, PRESETS30};

use crate::error::{GalleryError, Result};
use crate::surface::{escape_html, Surface};

/// Styling injected ahead of the entity markup.
pub const ENTITY_STYLE: &str = "<style>mark.entity { display: inline-block }</style>";

/// A labelled span in character offsets, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// Text with character-offset entity spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDoc {
    pub text: String,
    pub ents: Vec<EntitySpan>,
}

/// A token of an annotated document, as character offsets into its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub start: usize,
    pub end: usize,
}

/// An entity over tokens `[start_token, end_token)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntity {
    pub start_token: usize,
    pub end_token: usize,
    pub label: String,
}

/// Output of an NLP annotator: tokens plus token-level entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDoc {
    pub text: String,
    pub tokens: Vec<Token>,
    pub ents: Vec<TokenEntity>,
}

impl AnnotatedDoc {
    /// Tokenize on whitespace; entities are added with [`AnnotatedDoc::with_entity`].
    pub fn whitespace(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut tokens = Vec::new();
        let mut start = None;
        let mut count = 0;
        for (i, ch) in text.chars().enumerate() {
            match (ch.is_whitespace(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    tokens.push(Token { start: s, end: i });
                    start = None;
                }
                _ => {}
            }
            count = i + 1;
        }
        if let Some(s) = start {
            tokens.push(Token { start: s, end: count });
        }
        Self {
            text,
            tokens,
            ents: Vec::new(),
        }
    }

    pub fn with_entity(mut self, start_token: usize, end_token: usize, label: &str) -> Self {
        self.ents.push(TokenEntity {
            start_token,
            end_token,
            label: label.to_string(),
        });
        self
    }

    /// Convert token entities to character spans, preserving entity order.
    pub fn to_entity_doc(&self) -> Result<EntityDoc> {
        let len = self.text.chars().count();
        let ents = self
            .ents
            .iter()
            .map(|ent| {
                let invalid = || GalleryError::InvalidSpan {
                    start: ent.start_token,
                    end: ent.end_token,
                    len: self.tokens.len(),
                };
                if ent.start_token >= ent.end_token {
                    return Err(invalid());
                }
                let first = self.tokens.get(ent.start_token).ok_or_else(invalid)?;
                let last = self.tokens.get(ent.end_token - 1).ok_or_else(invalid)?;
                Ok(EntitySpan {
                    start: first.start,
                    end: last.end.min(len),
                    label: ent.label.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(EntityDoc {
            text: self.text.clone(),
            ents,
        })
    }
}

/// Either form of highlighter input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityInput {
    Annotated(AnnotatedDoc),
    PreParsed(EntityDoc),
}

impl EntityInput {
    pub fn into_doc(self) -> Result<EntityDoc> {
        match self {
            EntityInput::Annotated(doc) => doc.to_entity_doc(),
            EntityInput::PreParsed(doc) => Ok(doc),
        }
    }
}

impl From<EntityDoc> for EntityInput {
    fn from(doc: EntityDoc) -> Self {
        EntityInput::PreParsed(doc)
    }
}

impl From<AnnotatedDoc> for EntityInput {
    fn from(doc: AnnotatedDoc) -> Self {
        EntityInput::Annotated(doc)
    }
}

/// Caller-supplied colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Zipped positionally against the distinct labels.
    Ordered(Vec<String>),
    /// Used verbatim.
    Mapping(BTreeMap<String, String>),
}

impl ColorSpec {
    fn is_empty(&self) -> bool {
        match self {
            ColorSpec::Ordered(colors) => colors.is_empty(),
            ColorSpec::Mapping(colors) => colors.is_empty(),
        }
    }
}

/// Reject spans out of start order or outside the text.
///
/// Starts must strictly increase: two spans sharing a start overlap and
/// cannot both be rendered inline.
pub fn validate(doc: &EntityDoc) -> Result<()> {
    for (index, pair) in doc.ents.windows(2).enumerate() {
        if pair[0].start >= pair[1].start {
            return Err(GalleryError::UnsortedEntities {
                index: index + 1,
                previous: pair[0].start,
                current: pair[1].start,
            });
        }
    }

    let len = doc.text.chars().count();
    for ent in &doc.ents {
        if ent.start > ent.end || ent.end > len {
            return Err(GalleryError::InvalidSpan {
                start: ent.start,
                end: ent.end,
                len,
            });
        }
    }
    Ok(())
}

/// Distinct labels in first-seen order.
pub fn distinct_labels(doc: &EntityDoc) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for ent in &doc.ents {
        if !labels.contains(&ent.label) {
            labels.push(ent.label.clone());
        }
    }
    labels
}

/// Label to color. Missing or empty `spec` falls back to the palette.
pub fn resolve_colors(
    labels: &[String],
    spec: Option<&ColorSpec>,
) -> Result<HashMap<String, String>> {
    match spec.filter(|s| !s.is_empty()) {
        Some(ColorSpec::Mapping(map)) => Ok(map.clone().into_iter().collect()),
        Some(ColorSpec::Ordered(colors)) => Ok(labels
            .iter()
            .cloned()
            .zip(colors.iter().cloned())
            .collect()),
        None => Ok(labels
            .iter()
            .cloned()
            .zip(get_colors(labels.len())?.into_iter().map(String::from))
            .collect()),
    }
}

/// Inline markup for `doc`, highlighting only spans whose label is in `selected`.
///
/// `doc` is validated first. A span overlapping the previous highlighted
/// span is left unhighlighted.
pub fn render_entities(
    doc: &EntityDoc,
    selected: &[String],
    colors: &HashMap<String, String>,
) -> Result<String> {
    validate(doc)?;
    let bounds: Vec<usize> = doc
        .text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(doc.text.len()))
        .collect();

    let mut html =
        String::from(r#"<div class="entities" style="line-height: 2.5; direction: ltr">"#);
    let mut offset = 0;
    for ent in &doc.ents {
        if !selected.contains(&ent.label) || ent.start < offset {
            continue;
        }
        html.push_str(&escape_text(char_slice(&doc.text, &bounds, offset, ent.start)));
        let color = colors
            .get(&ent.label)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR);
        let _ = write!(
            html,
            r#"<mark class="entity" style="background: {}; padding: 0.45em 0.6em; margin: 0 0.25em; line-height: 1; border-radius: 0.35em;">{}<span style="font-size: 0.8em; font-weight: bold; line-height: 1; border-radius: 0.35em; vertical-align: middle; margin-left: 0.5rem">{}</span></mark>"#,
            escape_html(color),
            escape_text(char_slice(&doc.text, &bounds, ent.start, ent.end)),
            escape_html(&ent.label)
        );
        offset = ent.end;
    }
    html.push_str(&escape_text(char_slice(&doc.text, &bounds, offset, bounds.len() - 1)));
    html.push_str("</div>");
    Ok(html)
}

fn char_slice<'t>(text: &'t str, bounds: &[usize], start: usize, end: usize) -> &'t str {
    &text[bounds[start]..bounds[end]]
}

fn escape_text(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Flatten markup onto one line and wrap it in the scrolling container.
pub fn wrap_html(html: &str) -> String {
    format!(
        r#"<div style="overflow-x: auto; border: 1px solid #e6e9ef; border-radius: 0.25rem; padding: 1rem; margin-bottom: 2.5rem">{}</div>"#,
        html.replace('\n', " ")
    )
}

/// Renders entity documents onto a surface with a label filter control.
#[derive(Debug, Clone)]
pub struct EntityHighlighter {
    labels_key: String,
}

impl Default for EntityHighlighter {
    fn default() -> Self {
        Self {
            labels_key: "labels".to_string(),
        }
    }
}

impl EntityHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different selection key, for pages holding several highlighters.
    pub fn with_labels_key(mut self, key: impl Into<String>) -> Self {
        self.labels_key = key.into();
        self
    }

    /// Validate, then render `input` onto `surface`.
    ///
    /// All validation and color resolution happens before the first surface
    /// call, so a failing input leaves the surface untouched.
    pub fn highlight(
        &self,
        surface: &mut dyn Surface,
        input: impl Into<EntityInput>,
        title: Option<&str>,
        colors: Option<&ColorSpec>,
    ) -> Result<EntityDoc> {
        let doc = input.into().into_doc()?;
        validate(&doc)?;
        let labels = distinct_labels(&doc);
        let colors = resolve_colors(&labels, colors)?;

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            surface.header(title);
        }
        let selected = surface.multiselect(&self.labels_key, "Entity labels", &labels, &labels);

        let markup = render_entities(&doc, &selected, &colors)?;
        surface.raw_html(format!("{}{}", ENTITY_STYLE, wrap_html(&markup)));
        Ok(doc)
    }
}
