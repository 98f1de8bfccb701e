//! CrossWOZ gallery
//!
//! Loads the CrossWOZ dialogue splits and database tables from a data
//! directory and renders them as browsable pages: task description, goal
//! table, and per-turn state/dialog-act tables with turn-over-turn
//! highlighting. A standalone entity highlighter renders labelled spans as
//! coloured inline HTML.
//!
//! ```text
//! DatasetBrowser ──► DatasetStore ──► frame builders ──► DialogRenderer
//!        │                                                    │
//!        └──────────────────► Surface (Page) ◄────────────────┘
//!
//! EntityHighlighter ──► Surface (standalone)
//! ```

pub mod browser;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod highlight;
pub mod render;
pub mod surface;

#[cfg(feature = "server")]
pub mod server;

pub use browser::{DatasetBrowser, Target};
pub use config::GalleryConfig;
pub use dataset::{DatasetStore, Domain, Split};
pub use error::{GalleryError, Result};
pub use highlight::{get_colors, ColorSpec, EntityDoc, EntityHighlighter, EntityInput, EntitySpan};
pub use render::DialogRenderer;
pub use surface::{Block, Page, Surface};
