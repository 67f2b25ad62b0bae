//! Seen-map registry.
//!
//! Remembers which maps the player has already entered so the description
//! banner can be skipped on repeat visits. Owned by the session and persisted
//! through the `Saveable` registry.

use bevy::prelude::*;
use serde::Deserialize;

use crate::Saveable;

/// Identifier of a map in the host's map data. Valid ids are positive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(transparent)]
pub struct MapId(pub u32);

impl std::fmt::Display for MapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of visited maps.
///
/// Stored as a list because sessions visit few maps; each id appears at most
/// once. Order carries no meaning.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct SeenMapRegistry {
    ids: Vec<MapId>,
}

impl SeenMapRegistry {
    pub fn has_been_seen(&self, id: MapId) -> bool {
        self.ids.contains(&id)
    }

    /// Record `id` as seen. No-op if it already is.
    pub fn mark_seen(&mut self, id: MapId) {
        if !self.has_been_seen(id) {
            self.ids.push(id);
        }
    }

    /// Forget `id`. No-op if it was never seen.
    pub fn mark_unseen(&mut self, id: MapId) {
        self.ids.retain(|&seen| seen != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = MapId> + '_ {
        self.ids.iter().copied()
    }
}

// =============================================================================
// Saveable implementation
// =============================================================================

impl Saveable for SeenMapRegistry {
    const SAVE_KEY: &'static str = "seen_maps";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        let mut loaded: Self = crate::decode_or_warn(Self::SAVE_KEY, bytes);
        // Older or hand-edited saves may carry duplicates.
        let mut unique = Self::default();
        for id in loaded.ids.drain(..) {
            unique.mark_seen(id);
        }
        unique
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct SeenMapsPlugin;

impl Plugin for SeenMapsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SeenMapRegistry>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<SeenMapRegistry>();
    }
}

// =============================================================================
// Unit tests
// =============================================================================
