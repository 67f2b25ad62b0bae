//! # TestSession: headless integration test harness
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins`, `StatesPlugin` and
//! `GamePlugin` so scene transfers, commands and the banner tick can be driven
//! frame by frame without a window.

use bevy::app::App;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::banner::BannerController;
use crate::commands::{ScriptCommandEvent, SeenMapCommand};
use crate::config::DescriptionConfig;
use crate::host::{GameMap, SceneState, TransferPlayerEvent};
use crate::map_meta::{MapCatalog, MapDescriptor};
use crate::seen_maps::{MapId, SeenMapRegistry};
use crate::GamePlugin;

/// Upper bound on frames a transfer may take before the harness gives up.
const MAX_TRANSFER_FRAMES: u32 = 10;

pub struct TestSession {
    app: App,
}

impl TestSession {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Session with the default configuration and no maps.
    pub fn new() -> Self {
        Self::with_config(DescriptionConfig::default())
    }

    /// Session with explicit configuration parameters.
    pub fn with_params(pairs: &[(&str, &str)]) -> Self {
        Self::with_config(DescriptionConfig::from_pairs(pairs.iter().copied()))
    }

    pub fn with_config(config: DescriptionConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.add_plugins(GamePlugin::new(config));
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Add a map with the given notes field.
    pub fn with_map(mut self, id: u32, name: &str, notes: &str) -> Self {
        self.app
            .world_mut()
            .resource_mut::<MapCatalog>()
            .insert(MapDescriptor::from_notes(MapId(id), name, notes));
        self
    }

    /// Pre-mark a map as seen.
    pub fn with_seen(mut self, id: u32) -> Self {
        self.app
            .world_mut()
            .resource_mut::<SeenMapRegistry>()
            .mark_seen(MapId(id));
        self
    }

    pub fn with_name_display(mut self, enabled: bool) -> Self {
        self.set_name_display(enabled);
        self
    }

    // -----------------------------------------------------------------------
    // Drivers
    // -----------------------------------------------------------------------

    /// Run `n` frames.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Request a transfer and run frames until the new map scene is live.
    /// Returns the number of frames it took.
    pub fn transfer_to(&mut self, id: u32) -> u32 {
        self.app.world_mut().send_event(TransferPlayerEvent {
            map_id: MapId(id),
        });
        // The request is read this frame; the scene leaves Map on the next.
        self.app.update();
        for frame in 1..=MAX_TRANSFER_FRAMES {
            self.app.update();
            if self.scene_state() == SceneState::Map && self.game_map().map_id() == MapId(id) {
                return frame + 1;
            }
        }
        panic!("transfer to map {id} did not complete in {MAX_TRANSFER_FRAMES} frames");
    }

    /// Queue a typed command and run one frame.
    pub fn send_command(&mut self, command: SeenMapCommand) {
        self.app.world_mut().send_event(command);
        self.app.update();
    }

    /// Queue a script command line and run one frame.
    pub fn send_script(&mut self, line: &str) {
        self.app
            .world_mut()
            .send_event(ScriptCommandEvent(line.to_string()));
        self.app.update();
    }

    pub fn set_name_display(&mut self, enabled: bool) {
        let mut game_map = self.app.world_mut().resource_mut::<GameMap>();
        if enabled {
            game_map.enable_name_display();
        } else {
            game_map.disable_name_display();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn scene_state(&self) -> SceneState {
        *self.app.world().resource::<State<SceneState>>().get()
    }

    pub fn game_map(&self) -> &GameMap {
        self.resource::<GameMap>()
    }

    pub fn seen_maps(&self) -> &SeenMapRegistry {
        self.resource::<SeenMapRegistry>()
    }

    pub fn has_been_seen(&self, id: u32) -> bool {
        self.seen_maps().has_been_seen(MapId(id))
    }

    /// The current scene's banner, if a map scene is live.
    pub fn banner(&self) -> Option<&BannerController> {
        self.app.world().get_resource::<BannerController>()
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
