//! Rendering surface
//!
//! Renderers talk to a `Surface`: sidebar selection controls plus a
//! sequence of body blocks. `Page` is the HTML implementation served by the
//! gallery; tests inspect its recorded blocks directly.

pub mod page;

pub use page::{escape_html, Control, Page};

use crate::frame::StyledFrame;

/// A unit of page body content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Header(String),
    Subheader(String),
    /// A paragraph, `- ` bullet or `N. ` numbered line.
    Markdown(String),
    Table(StyledFrame),
    /// Side-by-side panes.
    Columns(Vec<Vec<Block>>),
    /// Raw HTML, emitted without escaping.
    Html(String),
}

/// Host rendering surface.
pub trait Surface {
    fn sidebar_title(&mut self, text: &str);

    /// Single choice among `options`; `None` only when `options` is empty.
    fn select(&mut self, key: &str, label: &str, options: &[String]) -> Option<String>;

    /// Subset of `options`, seeded with `default`.
    fn multiselect(
        &mut self,
        key: &str,
        label: &str,
        options: &[String],
        default: &[String],
    ) -> Vec<String>;

    fn push(&mut self, block: Block);

    fn title(&mut self, text: &str) {
        self.push(Block::Title(text.to_string()));
    }

    fn header(&mut self, text: &str) {
        self.push(Block::Header(text.to_string()));
    }

    fn subheader(&mut self, text: &str) {
        self.push(Block::Subheader(text.to_string()));
    }

    fn markdown(&mut self, text: &str) {
        self.push(Block::Markdown(text.to_string()));
    }

    fn table(&mut self, frame: StyledFrame) {
        self.push(Block::Table(frame));
    }

    fn columns(&mut self, panes: Vec<Vec<Block>>) {
        self.push(Block::Columns(panes));
    }

    fn raw_html(&mut self, html: String) {
        self.push(Block::Html(html));
    }
}
