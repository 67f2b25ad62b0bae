//! Exclusive save, load and new-game systems.
//!
//! Each runs once on entering its `SaveLoadState`, does all of its work with
//! exclusive world access, reports a `SaveOutcomeEvent`, and always returns
//! the state to `Idle` whether or not the work succeeded. Only a successful
//! load or new game sends `SessionRestoredEvent`.

use bevy::prelude::*;
use game::{SaveLoadState, SaveableRegistry, SessionRestoredEvent};

use crate::atomic_write::atomic_write;
use crate::save_codec::{decode_save, encode_save, SaveData};
use crate::save_error::SaveError;
use crate::save_plugin::{PendingLoadBytes, SaveOutcomeEvent, SaveSettings};

fn finish(world: &mut World, outcome: SaveOutcomeEvent) {
    world.send_event(outcome);
    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}

/// Temporarily takes the registry out of the world so its hooks can borrow
/// the world mutably.
fn with_registry<R>(
    world: &mut World,
    f: impl FnOnce(&SaveableRegistry, &mut World) -> R,
) -> Result<R, SaveError> {
    let registry = world
        .remove_resource::<SaveableRegistry>()
        .ok_or(SaveError::MissingResource("SaveableRegistry"))?;
    let result = f(&registry, world);
    world.insert_resource(registry);
    Ok(result)
}

// =============================================================================
// Save
// =============================================================================

pub(crate) fn exclusive_save(world: &mut World) {
    let outcome = match exclusive_save_inner(world) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Save failed: {e}");
            SaveOutcomeEvent::Failed(format!("Save failed: {e}"))
        }
    };
    finish(world, outcome);
}

fn exclusive_save_inner(world: &mut World) -> Result<SaveOutcomeEvent, SaveError> {
    let extensions = with_registry(world, |registry, world| registry.save_all(world))?;
    let keys = extensions.len();
    let bytes = encode_save(&SaveData::new(extensions))?;

    let path = world.resource::<SaveSettings>().path.clone();
    atomic_write(&path, &bytes)?;

    info!(
        "Saved {} bytes ({} sections) to {}",
        bytes.len(),
        keys,
        path.display()
    );
    Ok(SaveOutcomeEvent::Saved {
        path,
        bytes: bytes.len(),
    })
}

// =============================================================================
// Load
// =============================================================================

pub(crate) fn exclusive_load(world: &mut World) {
    let outcome = match exclusive_load_inner(world) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Load failed: {e}");
            SaveOutcomeEvent::Failed(format!("Load failed: {e}"))
        }
    };
    finish(world, outcome);
}

fn exclusive_load_inner(world: &mut World) -> Result<SaveOutcomeEvent, SaveError> {
    let bytes = world
        .resource_mut::<PendingLoadBytes>()
        .0
        .take()
        .ok_or(SaveError::NoData)?;

    // Decode fully before touching the world so a bad file changes nothing.
    let save = decode_save(&bytes)?;
    if save.version != crate::save_codec::FORMAT_VERSION {
        warn!(
            "Loading save data version {} with format version {}",
            save.version,
            crate::save_codec::FORMAT_VERSION
        );
    }
    with_registry(world, |registry, world| {
        registry.load_all(world, &save.extensions)
    })?;
    world.send_event(SessionRestoredEvent);

    let path = world.resource::<SaveSettings>().path.clone();
    info!(
        "Loaded {} sections from {}",
        save.extensions.len(),
        path.display()
    );
    Ok(SaveOutcomeEvent::Loaded { path })
}

// =============================================================================
// New game
// =============================================================================

pub(crate) fn exclusive_new_game(world: &mut World) {
    let outcome = match with_registry(world, |registry, world| registry.reset_all(world)) {
        Ok(()) => {
            world.send_event(SessionRestoredEvent);
            info!("New game: session state reset");
            SaveOutcomeEvent::NewGame
        }
        Err(e) => {
            error!("New game failed: {e}");
            SaveOutcomeEvent::Failed(format!("New game failed: {e}"))
        }
    };
    finish(world, outcome);
}
