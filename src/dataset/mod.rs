//! CrossWOZ dataset access
//!
//! File layout under the data directory:
//!
//! ```text
//! <data_dir>/{train,val,test}.json
//! <data_dir>/database/{attraction,hotel,metro,restaurant,taxi}_db.json
//! ```

pub mod models;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use models::{
    DatabaseEntry, DatabaseTable, DialogAct, Dialogue, Example, Message, StateRow, Turn,
};
pub use store::{DatasetStore, JsonCache};

use crate::error::GalleryError;

/// Dialogue split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Split::ALL
            .into_iter()
            .find(|split| split.as_str() == s)
            .ok_or_else(|| GalleryError::UnknownTarget(s.to_string()))
    }
}

/// Database domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Attraction,
    Hotel,
    Metro,
    Restaurant,
    Taxi,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Attraction,
        Domain::Hotel,
        Domain::Metro,
        Domain::Restaurant,
        Domain::Taxi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Attraction => "attraction",
            Domain::Hotel => "hotel",
            Domain::Metro => "metro",
            Domain::Restaurant => "restaurant",
            Domain::Taxi => "taxi",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_db.json", self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| GalleryError::UnknownTarget(s.to_string()))
    }
}
