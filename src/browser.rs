//! Dataset browser
//!
//! Top-level navigation: pick one of the dataset files, then either a
//! dialogue example (filtered by type) or the whole database table.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::{DatasetStore, Domain, Split};
use crate::error::{GalleryError, Result};
use crate::frame::{database_frame, StyledFrame};
use crate::render::DialogRenderer;
use crate::surface::Surface;

/// Sidebar selection keys.
pub const KEY_FILE: &str = "file";
pub const KEY_TYPES: &str = "types";
pub const KEY_EXAMPLE: &str = "example";

/// A selectable dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    DialogueSplit(Split),
    DatabaseTable(Domain),
}

impl Target {
    /// Splits first, then database tables.
    pub fn all() -> Vec<Target> {
        Split::ALL
            .into_iter()
            .map(Target::DialogueSplit)
            .chain(Domain::ALL.into_iter().map(Target::DatabaseTable))
            .collect()
    }

    /// Path relative to the data directory.
    pub fn file_name(&self) -> String {
        match self {
            Target::DialogueSplit(split) => split.file_name(),
            Target::DatabaseTable(domain) => format!("database/{}", domain.file_name()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::DialogueSplit(_) => "dialogue",
            Target::DatabaseTable(_) => "database",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl FromStr for Target {
    type Err = GalleryError;

    /// `database/<domain>_db.json` routes to a table keyed by the file stem's
    /// leading token; `<split>.json` routes to a dialogue split.
    fn from_str(name: &str) -> Result<Self> {
        let unknown = || GalleryError::UnknownTarget(name.to_string());
        let path = Path::new(name);
        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(unknown)?;

        let target = match path.parent().and_then(|p| p.to_str()) {
            Some("database") => {
                let key = stem.split('_').next().unwrap_or(stem);
                Target::DatabaseTable(key.parse().map_err(|_| unknown())?)
            }
            Some("") | None => Target::DialogueSplit(stem.parse().map_err(|_| unknown())?),
            Some(_) => return Err(unknown()),
        };

        // Only the exact listed files are selectable.
        if target.file_name() == name {
            Ok(target)
        } else {
            Err(unknown())
        }
    }
}

/// Summary of one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrowseOutcome {
    Dialogue {
        example_id: Option<String>,
        matching: usize,
        turns: usize,
    },
    Database {
        rows: usize,
    },
}

pub struct DatasetBrowser {
    store: Arc<DatasetStore>,
    renderer: DialogRenderer,
    title: String,
}

impl DatasetBrowser {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self {
            store,
            renderer: DialogRenderer::new(),
            title: "CrossWOZ Dataset Viewer".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// One full render pass driven by the surface's selections.
    pub fn visualize(&self, surface: &mut dyn Surface) -> Result<BrowseOutcome> {
        surface.sidebar_title(&self.title);

        let files: Vec<String> = Target::all().iter().map(Target::file_name).collect();
        let file = surface
            .select(KEY_FILE, "Select file", &files)
            .ok_or_else(|| GalleryError::UnknownTarget(String::new()))?;
        let target: Target = file.parse()?;
        debug!("Rendering {}", target);

        match target {
            Target::DialogueSplit(split) => self.visualize_dataset(surface, split),
            Target::DatabaseTable(domain) => self.visualize_database(surface, domain),
        }
    }

    pub fn visualize_dataset(
        &self,
        surface: &mut dyn Surface,
        split: Split,
    ) -> Result<BrowseOutcome> {
        let dialogue = self.store.read_dataset(split)?;

        let all_types: Vec<String> = dialogue.types().into_iter().map(String::from).collect();
        let types = surface.multiselect(KEY_TYPES, "Select types", &all_types, &all_types);

        let ids: Vec<String> = dialogue
            .ids_with_types(&types)
            .into_iter()
            .map(String::from)
            .collect();
        let label = format!("Select example ({} total)", ids.len());
        let Some(example_id) = surface.select(KEY_EXAMPLE, &label, &ids) else {
            surface.markdown("No examples match the selected types.");
            return Ok(BrowseOutcome::Dialogue {
                example_id: None,
                matching: 0,
                turns: 0,
            });
        };

        let example = dialogue
            .get(&example_id)
            .ok_or_else(|| GalleryError::ExampleNotFound(example_id.clone()))?;
        let turns = self.renderer.render_example(surface, example);
        info!("{} example {}: {} turns", split, example_id, turns);

        Ok(BrowseOutcome::Dialogue {
            example_id: Some(example_id),
            matching: ids.len(),
            turns,
        })
    }

    pub fn visualize_database(
        &self,
        surface: &mut dyn Surface,
        domain: Domain,
    ) -> Result<BrowseOutcome> {
        let target = Target::DatabaseTable(domain);
        surface.header(&target.file_name());

        let table = self.store.read_database(domain)?;
        let frame = database_frame(table.records());
        let rows = frame.len();
        surface.table(StyledFrame::plain(frame));
        info!("{}: {} rows", target, rows);

        Ok(BrowseOutcome::Database { rows })
    }

    /// Example ids of a split, optionally restricted to `types`.
    pub fn example_ids(&self, split: Split, types: Option<&[String]>) -> Result<Vec<String>> {
        let dialogue = self.store.read_dataset(split)?;
        let ids = match types {
            Some(types) => dialogue.ids_with_types(types),
            None => dialogue.iter().map(|(id, _)| id).collect(),
        };
        Ok(ids.into_iter().map(String::from).collect())
    }
}
