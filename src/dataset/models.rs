//! CrossWOZ record types
//!
//! Rows are stored in the files as positional JSON arrays; the structs
//! below deserialize from those arrays field by field.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A tracked belief-state slot: `[id, domain, slot, value, selected]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRow {
    pub id: Value,
    pub domain: String,
    pub slot: String,
    pub value: Value,
    pub selected: Value,
}

/// An annotated semantic action: `[intent, domain, slot, value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogAct {
    pub intent: String,
    pub domain: String,
    pub slot: String,
    pub value: Value,
}

/// One utterance. User messages carry `user_state`, system messages carry
/// `sys_state`; the other field is left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub dialog_act: Vec<DialogAct>,
    #[serde(default)]
    pub user_state: Vec<StateRow>,
    #[serde(default)]
    pub sys_state: Map<String, Value>,
}

/// A single dialogue example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "task description", default)]
    pub task_description: Vec<String>,
    #[serde(default)]
    pub goal: Vec<StateRow>,
    #[serde(default)]
    pub final_goal: Vec<StateRow>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A user/system message pair.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub index: usize,
    pub user: &'a Message,
    pub system: &'a Message,
}

impl Example {
    /// Messages consumed two at a time; a trailing unpaired message is not a turn.
    pub fn turns(&self) -> impl Iterator<Item = Turn<'_>> {
        self.messages
            .chunks_exact(2)
            .enumerate()
            .map(|(index, pair)| Turn {
                index,
                user: &pair[0],
                system: &pair[1],
            })
    }

    pub fn turn_count(&self) -> usize {
        self.messages.len() / 2
    }
}

/// A dialogue split: example id to example, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dialogue {
    examples: Vec<(String, Example)>,
    positions: HashMap<String, usize>,
}

impl Dialogue {
    pub fn from_examples(examples: Vec<(String, Example)>) -> Self {
        let mut dialogue = Self::default();
        for (id, example) in examples {
            dialogue.insert(id, example);
        }
        dialogue
    }

    fn insert(&mut self, id: String, example: Example) {
        // A repeated id replaces the earlier example, as a JSON object would.
        if let Some(&pos) = self.positions.get(&id) {
            self.examples[pos].1 = example;
        } else {
            self.positions.insert(id.clone(), self.examples.len());
            self.examples.push((id, example));
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Example> {
        self.positions.get(id).map(|&pos| &self.examples[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Example)> {
        self.examples.iter().map(|(id, ex)| (id.as_str(), ex))
    }

    /// Distinct example types, sorted.
    pub fn types(&self) -> BTreeSet<&str> {
        self.examples.iter().map(|(_, ex)| ex.kind.as_str()).collect()
    }

    /// Ids of examples whose type is in `types`, in file order.
    pub fn ids_with_types<S: AsRef<str>>(&self, types: &[S]) -> Vec<&str> {
        self.examples
            .iter()
            .filter(|(_, ex)| types.iter().any(|t| t.as_ref() == ex.kind))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

impl<'de> Deserialize<'de> for Dialogue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DialogueVisitor;

        impl<'de> Visitor<'de> for DialogueVisitor {
            type Value = Dialogue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of example id to example")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Dialogue, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut dialogue = Dialogue::default();
                while let Some((id, example)) = map.next_entry::<String, Example>()? {
                    dialogue.insert(id, example);
                }
                Ok(dialogue)
            }
        }

        deserializer.deserialize_map(DialogueVisitor)
    }
}

/// One database row: `[key, record]`. Only the record is displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseEntry(pub Value, pub Map<String, Value>);

/// All rows of one domain's database file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseTable {
    pub entries: Vec<DatabaseEntry>,
}

impl DatabaseTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.entries.iter().map(|entry| &entry.1)
    }
}
