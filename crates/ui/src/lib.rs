use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use game::DescriptionSet;

pub mod banner_window;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }
        app.add_systems(
            Update,
            banner_window::map_description_banner_ui.after(DescriptionSet::Banner),
        );
    }
}
