use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod banner;
pub mod commands;
pub mod config;
pub mod host;
pub mod map_meta;
pub mod seen_maps;
pub mod style;

#[cfg(test)]
pub mod test_harness;

pub use host::{GameMap, SceneState, SessionRestoredEvent, TransferPlayerEvent};
pub use seen_maps::{MapId, SeenMapRegistry};

// ---------------------------------------------------------------------------
// Saveable trait + registry
// ---------------------------------------------------------------------------

/// Trait for session resources that ride along in the save file.
///
/// A feature plugin calls `SaveableRegistry::register::<T>()` in its
/// `build()`; the save system never needs to know the concrete type.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Key of this resource in the save file's extension map. Must stay stable
    /// across versions.
    const SAVE_KEY: &'static str;

    /// Serialize this resource. `None` skips it (e.g. when at its default).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Rebuild the resource from bytes written by `save_to_bytes`.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode bytes via `bitcode::decode`, logging a warning and returning `Default` on failure.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    bitcode::decode(bytes).unwrap_or_else(|e| {
        warn!(
            "Saveable {}: could not decode {} bytes, using default: {}",
            key,
            bytes.len(),
            e
        );
        T::default()
    })
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// Type-erased save/load/reset hooks for one registered resource.
pub struct SaveableEntry {
    pub key: &'static str,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

/// Every resource that persists with the session, collected at plugin build time.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register `T`. A second registration under the same key is ignored.
    pub fn register<T: Saveable>(&mut self) {
        if self.contains(T::SAVE_KEY) {
            warn!(
                "SaveableRegistry: '{}' registered twice, keeping the first",
                T::SAVE_KEY
            );
            return;
        }
        self.entries.push(SaveableEntry {
            key: T::SAVE_KEY,
            save_fn: Box::new(|world: &World| world.get_resource::<T>()?.save_to_bytes()),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                world.insert_resource(T::load_from_bytes(bytes));
            }),
            reset_fn: Box::new(|world: &mut World| world.insert_resource(T::default())),
        });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Collect every registered resource into a key -> bytes map.
    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .iter()
            .filter_map(|entry| Some((entry.key.to_string(), (entry.save_fn)(world)?)))
            .collect()
    }

    /// Restore resources present in `extensions`. A registered resource whose
    /// key is absent is reset to its default so no state leaks across saves.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            match extensions.get(entry.key) {
                Some(bytes) => (entry.load_fn)(world, bytes),
                None => (entry.reset_fn)(world),
            }
        }
    }

    /// Reset all registered resources to their defaults (new game).
    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

// ---------------------------------------------------------------------------
// Save/load state
// ---------------------------------------------------------------------------

/// Save/load progress. Lives here so both the save crate and the host systems
/// can gate on it without a dependency cycle.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaveLoadState {
    #[default]
    Idle,
    Saving,
    Loading,
    NewGame,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Ordering of the per-frame work inside `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptionSet {
    /// Script commands and typed seen-map commands.
    Commands,
    /// Transfer requests from the host.
    Scene,
    /// Banner fade/countdown tick.
    Banner,
}

/// Registers the map-description feature: configuration, registry, host scene
/// lifecycle, commands and the banner tick.
///
/// The configuration is passed in explicitly; use
/// `GamePlugin::default()` for the built-in defaults.
#[derive(Default)]
pub struct GamePlugin {
    pub config: config::DescriptionConfig,
}

impl GamePlugin {
    pub fn new(config: config::DescriptionConfig) -> Self {
        Self { config }
    }
}

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        let style = style::StyleResolver::resolve(&self.config);
        info!(
            "Map descriptions: {:?} fill, {} frames, {} lines, hide-if-seen {}",
            style.fill.mode(),
            style.display_frames,
            style.height_lines,
            if style.hide_if_seen { "on" } else { "off" }
        );

        app.insert_resource(style)
            .init_state::<SaveLoadState>()
            .configure_sets(
                Update,
                (
                    DescriptionSet::Commands,
                    DescriptionSet::Scene,
                    DescriptionSet::Banner,
                )
                    .chain(),
            );

        app.add_plugins((
            host::HostScenePlugin,
            seen_maps::SeenMapsPlugin,
            commands::SeenMapCommandsPlugin,
            banner::BannerPlugin,
        ));
    }
}
