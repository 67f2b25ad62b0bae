//! Seen-map commands issued from game scripts.
//!
//! Scripts either send a typed `SeenMapCommand` or a text command line such as
//! `MapDescription markSeen 5`. Both are applied to the `SeenMapRegistry`
//! before the frame's scene work, independent of transfers.

use bevy::prelude::*;
use serde::Deserialize;
use std::fmt;

use crate::seen_maps::{MapId, SeenMapRegistry};
use crate::DescriptionSet;

/// Leading word of a script command line addressed to this feature.
pub const COMMAND_PREFIX: &str = "MapDescription";

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SeenMapCommand {
    MarkSeen { map_id: MapId },
    MarkUnseen { map_id: MapId },
    ClearAll,
}

impl SeenMapCommand {
    pub fn apply(self, registry: &mut SeenMapRegistry) {
        match self {
            SeenMapCommand::MarkSeen { map_id } => registry.mark_seen(map_id),
            SeenMapCommand::MarkUnseen { map_id } => registry.mark_unseen(map_id),
            SeenMapCommand::ClearAll => registry.clear(),
        }
    }
}

/// A raw command line from a game script.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ScriptCommandEvent(pub String);

// =============================================================================
// Parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    /// The line is empty or addressed to another feature.
    NotForThisFeature,
    /// The subcommand is not one of markSeen / markUnseen / clearSeen.
    UnknownCommand(String),
    /// The subcommand needs a map id and none was given.
    MissingMapId,
    /// The map id is not a positive integer.
    InvalidMapId(String),
    /// Extra words after a complete command.
    TrailingArguments(String),
    /// The JSON form did not decode to a command.
    InvalidJson(String),
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandParseError::NotForThisFeature => {
                write!(f, "not a {COMMAND_PREFIX} command")
            }
            CommandParseError::UnknownCommand(cmd) => write!(f, "unknown command '{cmd}'"),
            CommandParseError::MissingMapId => write!(f, "missing map id"),
            CommandParseError::InvalidMapId(raw) => {
                write!(f, "'{raw}' is not a valid map id")
            }
            CommandParseError::TrailingArguments(rest) => {
                write!(f, "unexpected arguments '{rest}'")
            }
            CommandParseError::InvalidJson(msg) => write!(f, "invalid JSON command: {msg}"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse `MapDescription <command> [mapId]`. Subcommands are case-insensitive:
/// `markSeen <id>`, `markUnseen <id>`, `clearSeen`. The command may instead be
/// a JSON-encoded `SeenMapCommand`, e.g.
/// `MapDescription {"MarkSeen":{"map_id":5}}`.
pub fn parse_command_line(line: &str) -> Result<SeenMapCommand, CommandParseError> {
    let line = line.trim();
    let (prefix, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    if prefix.is_empty() || !prefix.eq_ignore_ascii_case(COMMAND_PREFIX) {
        return Err(CommandParseError::NotForThisFeature);
    }
    let rest = rest.trim_start();
    if rest.starts_with(['{', '"']) {
        return parse_json_command(rest);
    }

    let mut words = rest.split_whitespace();
    let Some(name) = words.next() else {
        return Err(CommandParseError::UnknownCommand(String::new()));
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "markseen" => SeenMapCommand::MarkSeen {
            map_id: parse_map_id(words.next())?,
        },
        "markunseen" => SeenMapCommand::MarkUnseen {
            map_id: parse_map_id(words.next())?,
        },
        "clearseen" => SeenMapCommand::ClearAll,
        _ => return Err(CommandParseError::UnknownCommand(name.to_string())),
    };

    let rest: Vec<&str> = words.collect();
    if !rest.is_empty() {
        return Err(CommandParseError::TrailingArguments(rest.join(" ")));
    }
    Ok(command)
}

fn parse_json_command(json: &str) -> Result<SeenMapCommand, CommandParseError> {
    let command: SeenMapCommand =
        serde_json::from_str(json).map_err(|e| CommandParseError::InvalidJson(e.to_string()))?;
    match command {
        SeenMapCommand::MarkSeen { map_id } | SeenMapCommand::MarkUnseen { map_id }
            if map_id.0 == 0 =>
        {
            Err(CommandParseError::InvalidMapId(map_id.to_string()))
        }
        _ => Ok(command),
    }
}

fn parse_map_id(word: Option<&str>) -> Result<MapId, CommandParseError> {
    let raw = word.ok_or(CommandParseError::MissingMapId)?;
    match raw.parse::<u32>() {
        Ok(id) if id > 0 => Ok(MapId(id)),
        _ => Err(CommandParseError::InvalidMapId(raw.to_string())),
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Turns script lines into typed commands. Lines for other features are
/// ignored quietly; malformed lines for this one are logged.
fn parse_script_commands(
    mut lines: EventReader<ScriptCommandEvent>,
    mut commands: EventWriter<SeenMapCommand>,
) {
    for ScriptCommandEvent(line) in lines.read() {
        match parse_command_line(line) {
            Ok(command) => {
                commands.send(command);
            }
            Err(CommandParseError::NotForThisFeature) => {}
            Err(e) => warn!("Script command '{line}': {e}"),
        }
    }
}

fn apply_seen_map_commands(
    mut commands: EventReader<SeenMapCommand>,
    mut registry: ResMut<SeenMapRegistry>,
) {
    for command in commands.read() {
        command.apply(&mut registry);
        debug!("Applied {command:?}; {} maps seen", registry.len());
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct SeenMapCommandsPlugin;

impl Plugin for SeenMapCommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SeenMapCommand>()
            .add_event::<ScriptCommandEvent>()
            .add_systems(
                Update,
                (parse_script_commands, apply_seen_map_commands)
                    .chain()
                    .in_set(DescriptionSet::Commands),
            );
    }
}

// =============================================================================
// Unit tests
// =============================================================================
