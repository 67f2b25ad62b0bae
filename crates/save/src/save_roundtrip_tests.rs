//! End-to-end save/load/new-game tests through the full plugin stack.

use std::path::PathBuf;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use game::banner::{BannerController, BannerPhase};
use game::map_meta::{MapCatalog, MapDescriptor};
use game::{
    GameMap, GamePlugin, MapId, SaveLoadState, SceneState, SeenMapRegistry, TransferPlayerEvent,
};

use crate::{
    LoadGameEvent, NewGameEvent, SaveGameEvent, SaveOutcomeEvent, SavePlugin, SaveSettings,
};

const MAX_FRAMES: u32 = 12;

/// Frames from a request to the state machine being back at `Idle`.
const SETTLE_FRAMES: u32 = 3;

#[derive(Resource, Default)]
struct Outcomes(Vec<SaveOutcomeEvent>);

fn collect_outcomes(mut events: EventReader<SaveOutcomeEvent>, mut outcomes: ResMut<Outcomes>) {
    outcomes.0.extend(events.read().cloned());
}

fn save_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("map_descriptions_save_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.bin"));
    let _ = std::fs::remove_file(&path);
    path
}

fn test_app(path: PathBuf) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(StatesPlugin)
        .add_plugins(GamePlugin::default())
        .add_plugins(SavePlugin)
        .insert_resource(SaveSettings { path })
        .init_resource::<Outcomes>()
        .add_systems(Last, collect_outcomes);
    {
        let mut catalog = app.world_mut().resource_mut::<MapCatalog>();
        catalog.insert(MapDescriptor::from_notes(
            MapId(5),
            "Harbor",
            "<MapDescription:Welcome>",
        ));
        catalog.insert(MapDescriptor::from_notes(
            MapId(6),
            "Old Road",
            "<MapDescription:Dust and wind.>",
        ));
    }
    app.update();
    app
}

fn transfer(app: &mut App, id: u32) {
    app.world_mut().send_event(TransferPlayerEvent { map_id: MapId(id) });
    for _ in 0..MAX_FRAMES {
        app.update();
        let in_map = *app.world().resource::<State<SceneState>>().get() == SceneState::Map;
        if in_map && app.world().resource::<GameMap>().map_id() == MapId(id) {
            return;
        }
    }
    panic!("transfer to {id} did not finish");
}

fn save_load_state(app: &App) -> SaveLoadState {
    *app.world().resource::<State<SaveLoadState>>().get()
}

/// Run frames until the save/load state machine is back at rest, then
/// return every outcome reported along the way.
fn settle(app: &mut App) -> Vec<SaveOutcomeEvent> {
    for _ in 0..SETTLE_FRAMES {
        app.update();
    }
    assert_eq!(save_load_state(app), SaveLoadState::Idle);
    std::mem::take(&mut app.world_mut().resource_mut::<Outcomes>().0)
}

fn seen(app: &App, id: u32) -> bool {
    app.world()
        .resource::<SeenMapRegistry>()
        .has_been_seen(MapId(id))
}

#[test]
fn test_save_then_load_restores_session() {
    let path = save_path("restore");
    let mut app = test_app(path.clone());
    transfer(&mut app, 5);
    transfer(&mut app, 6);

    app.world_mut().send_event(SaveGameEvent);
    let outcomes = settle(&mut app);
    assert!(
        matches!(outcomes.as_slice(), [SaveOutcomeEvent::Saved { bytes, .. }] if *bytes > 0),
        "got {outcomes:?}"
    );
    assert!(path.exists());

    app.world_mut().resource_mut::<SeenMapRegistry>().clear();
    transfer(&mut app, 5);
    assert!(!seen(&app, 6));

    app.world_mut().send_event(LoadGameEvent);
    let outcomes = settle(&mut app);
    assert_eq!(outcomes, vec![SaveOutcomeEvent::Loaded { path: path.clone() }]);

    assert!(seen(&app, 5));
    assert!(seen(&app, 6));
    assert_eq!(app.world().resource::<GameMap>().map_id(), MapId(6));

    let banner = app.world().resource::<BannerController>();
    assert_eq!(banner.content().text.as_deref(), Some("Dust and wind."));
    assert_eq!(
        banner.phase(),
        BannerPhase::Closed,
        "a restored scene is not a transfer"
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_new_game_clears_seen_maps() {
    let mut app = test_app(save_path("new_game"));
    transfer(&mut app, 5);
    assert!(seen(&app, 5));

    app.world_mut().send_event(NewGameEvent);
    let outcomes = settle(&mut app);
    assert_eq!(outcomes, vec![SaveOutcomeEvent::NewGame]);
    assert!(app.world().resource::<SeenMapRegistry>().is_empty());
    assert_eq!(app.world().resource::<GameMap>().map_id(), MapId(0));
}

#[test]
fn test_load_without_file_reports_failure() {
    let mut app = test_app(save_path("missing"));
    transfer(&mut app, 5);

    app.world_mut().send_event(LoadGameEvent);
    let outcomes = settle(&mut app);
    assert!(
        matches!(outcomes.as_slice(), [SaveOutcomeEvent::Failed(_)]),
        "got {outcomes:?}"
    );
    assert!(seen(&app, 5), "failed load leaves the session alone");
}

#[test]
fn test_load_corrupt_file_leaves_session_alone() {
    let path = save_path("corrupt");
    std::fs::write(&path, b"MDSV\x01\x00\x00\x00garbage-garbage-garbage").unwrap();
    let mut app = test_app(path.clone());
    transfer(&mut app, 6);
    for _ in 0..5 {
        app.update();
    }
    let before = app.world().resource::<BannerController>().opacity();
    assert!(before > 0);

    app.world_mut().send_event(LoadGameEvent);
    let outcomes = settle(&mut app);
    assert!(
        matches!(outcomes.as_slice(), [SaveOutcomeEvent::Failed(msg)] if msg.starts_with("Load failed")),
        "got {outcomes:?}"
    );
    assert!(seen(&app, 6));
    assert_eq!(app.world().resource::<GameMap>().map_id(), MapId(6));

    let banner = app.world().resource::<BannerController>();
    assert_eq!(
        banner.phase(),
        BannerPhase::Visible,
        "a failed load keeps the live banner"
    );
    assert!(banner.opacity() >= before);
    assert_eq!(banner.content().text.as_deref(), Some("Dust and wind."));
    let _ = std::fs::remove_file(&path);
}
