//! Host scene lifecycle.
//!
//! The map scene is rebuilt on every transfer: a `TransferPlayerEvent` moves
//! the scene state `Map -> Transfer -> Map`, which tears down the previous
//! scene's banner on exit and builds a fresh one on entry. Scene start opens
//! the banner only when the entry was a transfer, then records the map as seen.
//! A `SessionRestoredEvent` (successful load or new game) rebuilds the live
//! scene's banner closed.

use bevy::prelude::*;

use crate::banner::BannerController;
use crate::map_meta::MapCatalog;
use crate::seen_maps::{MapId, SeenMapRegistry};
use crate::style::DescriptionStyle;
use crate::{DescriptionSet, Saveable};

// =============================================================================
// Scene state
// =============================================================================

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneState {
    /// Before the first map is entered.
    #[default]
    Boot,
    /// The map scene is live and owns a banner.
    Map,
    /// Between two map scenes while the player is being moved.
    Transfer,
}

// =============================================================================
// Map state
// =============================================================================

/// Per-session map state: where the player is and whether map names are shown.
#[derive(Resource, Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct GameMap {
    map_id: MapId,
    name_display: bool,
}

impl Default for GameMap {
    fn default() -> Self {
        Self {
            map_id: MapId::default(),
            name_display: true,
        }
    }
}

impl GameMap {
    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    /// Move to `map_id`. Name display settings carry over.
    pub fn setup(&mut self, map_id: MapId) {
        self.map_id = map_id;
    }

    pub fn is_name_display_enabled(&self) -> bool {
        self.name_display
    }

    pub fn enable_name_display(&mut self) {
        self.name_display = true;
    }

    pub fn disable_name_display(&mut self) {
        self.name_display = false;
    }
}

impl Saveable for GameMap {
    const SAVE_KEY: &'static str = "game_map";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

// =============================================================================
// Transfers
// =============================================================================

/// Request to move the player to another map.
#[derive(Event, Debug, Clone, Copy)]
pub struct TransferPlayerEvent {
    pub map_id: MapId,
}

/// Sent once session resources have been replaced by a load or a new game.
/// A failed load does not send it.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SessionRestoredEvent;

/// Transfer bookkeeping between the request and the next scene start.
#[derive(Resource, Debug, Default)]
pub struct PendingTransfer {
    target: Option<MapId>,
    transferring: bool,
}

/// Latches the last transfer request of the frame and leaves the map scene.
fn handle_transfer_requests(
    mut events: EventReader<TransferPlayerEvent>,
    mut pending: ResMut<PendingTransfer>,
    mut next_state: ResMut<NextState<SceneState>>,
) {
    let Some(request) = events.read().last() else {
        return;
    };
    debug!("Transfer requested to map {}", request.map_id);
    pending.target = Some(request.map_id);
    next_state.set(SceneState::Transfer);
}

/// Moves the player and re-enters the map scene.
fn perform_transfer(
    mut pending: ResMut<PendingTransfer>,
    mut game_map: ResMut<GameMap>,
    mut next_state: ResMut<NextState<SceneState>>,
) {
    if let Some(map_id) = pending.target.take() {
        game_map.setup(map_id);
        pending.transferring = true;
    }
    next_state.set(SceneState::Map);
}

// =============================================================================
// Scene start / end
// =============================================================================

/// Builds this scene's banner. On a transfer, opens it when the visibility
/// policy allows, then records the map as seen.
fn start_map_scene(
    mut commands: Commands,
    style: Res<DescriptionStyle>,
    game_map: Res<GameMap>,
    catalog: Res<MapCatalog>,
    mut registry: ResMut<SeenMapRegistry>,
    mut pending: ResMut<PendingTransfer>,
) {
    let map_id = game_map.map_id();
    let mut banner = BannerController::new(&style);
    banner.refresh(catalog.get(map_id));

    let transfer = std::mem::take(&mut pending.transferring);
    if transfer {
        if banner.should_open(game_map.is_name_display_enabled(), &registry, map_id) {
            banner.open(catalog.get(map_id));
            info!(
                "Map {} banner opened ({})",
                map_id,
                if banner.content().text.is_some() {
                    "with description"
                } else {
                    "no description"
                }
            );
        } else {
            debug!("Map {} banner suppressed", map_id);
        }
        registry.mark_seen(map_id);
    }

    commands.insert_resource(banner);
}

/// Rebuild the banner for the restored map without treating it as a transfer.
fn rebuild_scene_after_restore(
    mut events: EventReader<SessionRestoredEvent>,
    mut commands: Commands,
    style: Res<DescriptionStyle>,
    game_map: Res<GameMap>,
    catalog: Res<MapCatalog>,
) {
    if events.read().last().is_none() {
        return;
    }
    let mut banner = BannerController::new(&style);
    banner.refresh(catalog.get(game_map.map_id()));
    debug!("Map {} banner rebuilt after restore", game_map.map_id());
    commands.insert_resource(banner);
}

fn end_map_scene(mut commands: Commands) {
    commands.remove_resource::<BannerController>();
}

// =============================================================================
// Plugin
// =============================================================================

pub struct HostScenePlugin;

impl Plugin for HostScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SceneState>()
            .init_resource::<GameMap>()
            .init_resource::<MapCatalog>()
            .init_resource::<PendingTransfer>()
            .add_event::<TransferPlayerEvent>()
            .add_event::<SessionRestoredEvent>()
            .add_systems(
                Update,
                handle_transfer_requests.in_set(DescriptionSet::Scene),
            )
            .add_systems(OnEnter(SceneState::Transfer), perform_transfer)
            .add_systems(OnEnter(SceneState::Map), start_map_scene)
            .add_systems(OnExit(SceneState::Map), end_map_scene)
            .add_systems(
                Update,
                rebuild_scene_after_restore
                    .in_set(DescriptionSet::Scene)
                    .run_if(in_state(SceneState::Map)),
            );

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<GameMap>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_map_defaults_to_name_display_on() {
        let map = GameMap::default();
        assert!(map.is_name_display_enabled());
        assert_eq!(map.map_id(), MapId(0));
    }

    #[test]
    fn test_setup_keeps_name_display() {
        let mut map = GameMap::default();
        map.disable_name_display();
        map.setup(MapId(3));
        assert_eq!(map.map_id(), MapId(3));
        assert!(!map.is_name_display_enabled());
        map.enable_name_display();
        assert!(map.is_name_display_enabled());
    }

    #[test]
    fn test_game_map_saveable_roundtrip() {
        let mut map = GameMap::default();
        map.setup(MapId(12));
        map.disable_name_display();
        let loaded = GameMap::load_from_bytes(&map.save_to_bytes().unwrap());
        assert_eq!(loaded, map);
    }
}
