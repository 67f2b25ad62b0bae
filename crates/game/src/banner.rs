//! Map description banner: countdown and fade state.
//!
//! One `BannerController` exists per map-scene instance. The scene start
//! system (see `host`) opens it on transfer; afterwards it ticks once per
//! frame. Opacity rises by `FADE_STEP` while the countdown runs and name
//! display is enabled, and falls by the same step otherwise, so the fade
//! length does not depend on how long the banner holds.

use bevy::prelude::*;

use crate::config::FADE_STEP;
use crate::host::GameMap;
use crate::map_meta::MapDescriptor;
use crate::seen_maps::{MapId, SeenMapRegistry};
use crate::style::DescriptionStyle;
use crate::{DescriptionSet, SaveLoadState};

// =============================================================================
// State
// =============================================================================

/// Raw banner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerState {
    /// Window visibility as set by the host. Hidden banners still tick.
    pub visible: bool,
    /// Frames left before the fade-out starts.
    pub remaining_frames: u32,
    /// Contents opacity, 0 (transparent) to 255 (opaque).
    pub opacity: u8,
}

impl Default for BannerState {
    fn default() -> Self {
        Self {
            visible: true,
            remaining_frames: 0,
            opacity: 0,
        }
    }
}

/// Derived lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerPhase {
    /// Countdown expired and fully faded out.
    Closed,
    /// Countdown running; fading in or holding.
    Visible,
    /// Countdown expired; fading out.
    Closing,
}

/// What the banner shows, captured at the last refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerContent {
    pub map_id: Option<MapId>,
    /// Description text; `None` means nothing is painted.
    pub text: Option<String>,
}

// =============================================================================
// Controller
// =============================================================================

/// The banner for the current map scene.
#[derive(Resource, Debug, Clone)]
pub struct BannerController {
    state: BannerState,
    content: BannerContent,
    display_frames: u32,
    hide_if_seen: bool,
    refresh_count: u32,
}

impl BannerController {
    pub fn new(style: &DescriptionStyle) -> Self {
        Self {
            state: BannerState::default(),
            content: BannerContent::default(),
            display_frames: style.display_frames,
            hide_if_seen: style.hide_if_seen,
            refresh_count: 0,
        }
    }

    pub fn state(&self) -> BannerState {
        self.state
    }

    pub fn opacity(&self) -> u8 {
        self.state.opacity
    }

    pub fn remaining_frames(&self) -> u32 {
        self.state.remaining_frames
    }

    pub fn content(&self) -> &BannerContent {
        &self.content
    }

    /// Number of content refreshes since the banner was created.
    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state.visible = visible;
    }

    pub fn phase(&self) -> BannerPhase {
        match (self.state.remaining_frames, self.state.opacity) {
            (0, 0) => BannerPhase::Closed,
            (0, _) => BannerPhase::Closing,
            _ => BannerPhase::Visible,
        }
    }

    /// Whether the banner should open for `map_id`.
    pub fn should_open(
        &self,
        display_enabled: bool,
        registry: &SeenMapRegistry,
        map_id: MapId,
    ) -> bool {
        if !self.hide_if_seen {
            return display_enabled;
        }
        display_enabled && !registry.has_been_seen(map_id)
    }

    /// Restart the countdown and re-read the content from `descriptor`.
    /// Calling this while already open restarts the hold.
    pub fn open(&mut self, descriptor: Option<&MapDescriptor>) {
        self.refresh(descriptor);
        self.state.remaining_frames = self.display_frames;
    }

    /// End the hold; the fade-out starts on the next tick.
    pub fn close(&mut self) {
        self.state.remaining_frames = 0;
    }

    /// Re-read the content without touching the countdown.
    pub fn refresh(&mut self, descriptor: Option<&MapDescriptor>) {
        self.content = BannerContent {
            map_id: descriptor.map(|d| d.id),
            text: descriptor
                .and_then(MapDescriptor::description_text)
                .map(str::to_string),
        };
        self.refresh_count += 1;
    }

    /// One frame of countdown and fade.
    pub fn advance(&mut self, display_enabled: bool) {
        if self.state.remaining_frames > 0 && display_enabled {
            self.state.opacity = self.state.opacity.saturating_add(FADE_STEP);
            self.state.remaining_frames -= 1;
        } else {
            self.state.opacity = self.state.opacity.saturating_sub(FADE_STEP);
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Hide the window while a save, load or new game is in progress. The
/// countdown keeps running underneath.
pub fn sync_banner_visibility(
    save_state: Res<State<SaveLoadState>>,
    mut banner: ResMut<BannerController>,
) {
    let visible = *save_state.get() == SaveLoadState::Idle;
    if banner.state().visible != visible {
        banner.set_visible(visible);
    }
}

/// Per-frame tick of the current scene's banner.
pub fn advance_banner(mut banner: ResMut<BannerController>, game_map: Res<GameMap>) {
    banner.advance(game_map.is_name_display_enabled());
}

// =============================================================================
// Plugin
// =============================================================================

pub struct BannerPlugin;

impl Plugin for BannerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (sync_banner_visibility, advance_banner)
                .chain()
                .in_set(DescriptionSet::Banner)
                .run_if(resource_exists::<BannerController>),
        );
    }
}

// =============================================================================
// Unit tests
// =============================================================================
