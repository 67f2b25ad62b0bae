//! Map metadata supplied by the host: display names and the description tag
//! embedded in each map's notes field.
//!
//! A map opts into a banner with `<vividXPMD:Some text>` (or the alias
//! `<MapDescription:Some text>`) anywhere in its notes. Notes are scanned the way the host engine extracts note metadata:
//! `<key:value>` yields a string value and a bare `<key>` yields a flag.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::seen_maps::MapId;

/// Notes tags holding the banner text, in lookup order.
pub const DESCRIPTION_TAGS: [&str; 2] = ["vividXPMD", "MapDescription"];

/// Value of one notes tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Flag,
    Text(String),
}

/// Extract every `<key>` / `<key:value>` tag from a notes field. Later tags
/// with the same key win.
pub fn parse_note_meta(notes: &str) -> BTreeMap<String, MetaValue> {
    let mut meta = BTreeMap::new();
    let mut rest = notes;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(['<', '>']) else {
            break;
        };
        if after.as_bytes()[close] == b'<' {
            // Unclosed tag: restart scanning at the inner '<'.
            rest = &after[close..];
            continue;
        }
        let body = &after[..close];
        match body.split_once(':') {
            Some((key, value)) if !key.is_empty() => {
                meta.insert(key.to_string(), MetaValue::Text(value.to_string()));
            }
            None if !body.is_empty() => {
                meta.insert(body.to_string(), MetaValue::Flag);
            }
            _ => {}
        }
        rest = &after[close + 1..];
    }
    meta
}

/// Host-side description of one map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapDescriptor {
    pub id: MapId,
    pub display_name: String,
    pub description: Option<String>,
}

impl MapDescriptor {
    /// Build a descriptor, pulling the description out of the notes field.
    pub fn from_notes(id: MapId, display_name: impl Into<String>, notes: &str) -> Self {
        let mut meta = parse_note_meta(notes);
        let description = DESCRIPTION_TAGS
            .iter()
            .find_map(|tag| match meta.remove(*tag) {
                Some(MetaValue::Text(text)) => Some(text),
                _ => None,
            });
        Self {
            id,
            display_name: display_name.into(),
            description,
        }
    }

    /// The description, if present and not blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// All map descriptors known to the host, keyed by id.
#[derive(Resource, Debug, Default)]
pub struct MapCatalog {
    maps: HashMap<MapId, MapDescriptor>,
}

impl MapCatalog {
    pub fn insert(&mut self, descriptor: MapDescriptor) {
        self.maps.insert(descriptor.id, descriptor);
    }

    pub fn get(&self, id: MapId) -> Option<&MapDescriptor> {
        self.maps.get(&id)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
