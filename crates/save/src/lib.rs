mod atomic_write;
mod exclusive;
pub mod save_codec;
pub mod save_error;
mod save_plugin;

#[cfg(test)]
mod save_roundtrip_tests;

pub use save_error::SaveError;
pub use save_plugin::{
    LoadGameEvent, NewGameEvent, SaveGameEvent, SaveOutcomeEvent, SavePlugin, SaveSettings,
    DEFAULT_SAVE_PATH,
};
