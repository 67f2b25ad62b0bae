use std::path::PathBuf;

use bevy::prelude::*;
use game::{SaveLoadState, SaveableRegistry};

use crate::save_error::SaveError;

pub const DEFAULT_SAVE_PATH: &str = "map_descriptions_save.bin";

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Where the session is written to and read from.
#[derive(Resource, Debug, Clone)]
pub struct SaveSettings {
    pub path: PathBuf,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SAVE_PATH),
        }
    }
}

/// Raw bytes read from disk, waiting for the exclusive load system.
#[derive(Resource, Default)]
pub(crate) struct PendingLoadBytes(pub(crate) Option<Vec<u8>>);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event)]
pub struct SaveGameEvent;

#[derive(Event)]
pub struct LoadGameEvent;

#[derive(Event)]
pub struct NewGameEvent;

/// Result of a save, load or new game, sent once the work is done.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SaveOutcomeEvent {
    Saved { path: PathBuf, bytes: usize },
    Loaded { path: PathBuf },
    NewGame,
    Failed(String),
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveGameEvent>()
            .add_event::<LoadGameEvent>()
            .add_event::<NewGameEvent>()
            .add_event::<SaveOutcomeEvent>()
            .init_resource::<SaveableRegistry>()
            .init_resource::<SaveSettings>()
            .init_resource::<PendingLoadBytes>();

        // Only start new work from Idle so one operation finishes before the next.
        app.add_systems(
            Update,
            (detect_save_event, detect_load_event, detect_new_game_event)
                .chain()
                .run_if(in_state(SaveLoadState::Idle)),
        );

        app.add_systems(
            OnEnter(SaveLoadState::Saving),
            crate::exclusive::exclusive_save,
        );
        app.add_systems(
            OnEnter(SaveLoadState::Loading),
            crate::exclusive::exclusive_load,
        );
        app.add_systems(
            OnEnter(SaveLoadState::NewGame),
            crate::exclusive::exclusive_new_game,
        );
    }
}

// ---------------------------------------------------------------------------
// Event detection systems
// ---------------------------------------------------------------------------

fn detect_save_event(
    mut events: EventReader<SaveGameEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        events.read().for_each(drop);
        next_state.set(SaveLoadState::Saving);
    }
}

/// Reads the save file up front so the exclusive system only decodes.
fn detect_load_event(
    mut events: EventReader<LoadGameEvent>,
    settings: Res<SaveSettings>,
    mut pending: ResMut<PendingLoadBytes>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
    mut outcomes: EventWriter<SaveOutcomeEvent>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);

    match std::fs::read(&settings.path) {
        Ok(bytes) => {
            pending.0 = Some(bytes);
            next_state.set(SaveLoadState::Loading);
        }
        Err(e) => {
            let msg = format!(
                "Load failed ({}): {}",
                settings.path.display(),
                SaveError::from(e)
            );
            error!("{msg}");
            outcomes.send(SaveOutcomeEvent::Failed(msg));
        }
    }
}

fn detect_new_game_event(
    mut events: EventReader<NewGameEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        events.read().for_each(drop);
        next_state.set(SaveLoadState::NewGame);
    }
}
