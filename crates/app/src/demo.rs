//! Small playable host: three maps, keyboard transfers and save slots.
//!
//! | key      | action                              |
//! |----------|-------------------------------------|
//! | 1, 2, 3  | transfer to that map                |
//! | N        | toggle map name display             |
//! | U        | mark the current map unseen         |
//! | C        | clear every seen map                |
//! | F2       | new game                            |
//! | F5 / F9  | save / load                         |

use bevy::prelude::*;

use game::commands::ScriptCommandEvent;
use game::map_meta::{MapCatalog, MapDescriptor};
use game::{GameMap, MapId, SeenMapRegistry, TransferPlayerEvent};
use save::{LoadGameEvent, NewGameEvent, SaveGameEvent, SaveOutcomeEvent};

const DEMO_MAPS: [(u32, &str, &str); 3] = [
    (
        1,
        "Harbor Town",
        "<vividXPMD:Gulls circle over the fishing boats.>",
    ),
    (
        2,
        "Old Road",
        "<Encounters>\n<MapDescription:Dust and wind. Nobody has travelled this way in years.>",
    ),
    (3, "Cellar", "A map without a description."),
];

const TRANSFER_KEYS: [(KeyCode, u32); 3] = [
    (KeyCode::Digit1, 1),
    (KeyCode::Digit2, 2),
    (KeyCode::Digit3, 3),
];

pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_demo_maps, spawn_camera))
            .add_systems(
                Update,
                (
                    transfer_keys,
                    session_keys,
                    save_keys,
                    restart_after_new_game,
                    update_window_title,
                ),
            );
    }
}

fn setup_demo_maps(
    mut catalog: ResMut<MapCatalog>,
    mut transfers: EventWriter<TransferPlayerEvent>,
) {
    for (id, name, notes) in DEMO_MAPS {
        catalog.insert(MapDescriptor::from_notes(MapId(id), name, notes));
    }
    info!("Demo: {} maps loaded", catalog.len());
    transfers.send(TransferPlayerEvent {
        map_id: MapId(DEMO_MAPS[0].0),
    });
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn transfer_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut transfers: EventWriter<TransferPlayerEvent>,
) {
    for (key, id) in TRANSFER_KEYS {
        if keys.just_pressed(key) {
            transfers.send(TransferPlayerEvent { map_id: MapId(id) });
        }
    }
}

fn session_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut game_map: ResMut<GameMap>,
    mut scripts: EventWriter<ScriptCommandEvent>,
) {
    if keys.just_pressed(KeyCode::KeyN) {
        if game_map.is_name_display_enabled() {
            game_map.disable_name_display();
        } else {
            game_map.enable_name_display();
        }
        info!(
            "Demo: name display {}",
            if game_map.is_name_display_enabled() {
                "on"
            } else {
                "off"
            }
        );
    }
    if keys.just_pressed(KeyCode::KeyU) {
        scripts.send(ScriptCommandEvent(format!(
            "MapDescription markUnseen {}",
            game_map.map_id()
        )));
    }
    if keys.just_pressed(KeyCode::KeyC) {
        scripts.send(ScriptCommandEvent("MapDescription clearSeen".to_string()));
    }
}

fn save_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut save: EventWriter<SaveGameEvent>,
    mut load: EventWriter<LoadGameEvent>,
    mut new_game: EventWriter<NewGameEvent>,
) {
    if keys.just_pressed(KeyCode::F5) {
        save.send(SaveGameEvent);
    }
    if keys.just_pressed(KeyCode::F9) {
        load.send(LoadGameEvent);
    }
    if keys.just_pressed(KeyCode::F2) {
        new_game.send(NewGameEvent);
    }
}

/// A new game starts on the first demo map.
fn restart_after_new_game(
    mut outcomes: EventReader<SaveOutcomeEvent>,
    mut transfers: EventWriter<TransferPlayerEvent>,
) {
    for outcome in outcomes.read() {
        if *outcome == SaveOutcomeEvent::NewGame {
            transfers.send(TransferPlayerEvent {
                map_id: MapId(DEMO_MAPS[0].0),
            });
        }
    }
}

fn update_window_title(
    game_map: Res<GameMap>,
    catalog: Res<MapCatalog>,
    seen: Res<SeenMapRegistry>,
    mut windows: Query<&mut Window>,
) {
    if !game_map.is_changed() && !seen.is_changed() {
        return;
    }
    let name = catalog
        .get(game_map.map_id())
        .map(|map| map.display_name.as_str())
        .unwrap_or("-");
    let title = format!(
        "Map Descriptions | {} | seen {}/{}",
        name,
        seen.len(),
        catalog.len()
    );
    for mut window in &mut windows {
        window.title.clone_from(&title);
    }
}
