use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::WinitSettings;

use game::config::DescriptionConfig;

mod demo;

const CONFIG_PATH: &str = "map_descriptions.json";

fn main() {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Map Descriptions".to_string(),
                    resolution: (816.0, 624.0).into(),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,game=debug,save=debug,ui=info".to_string(),
                ..default()
            }),
    )
    // The banner fades per frame, so keep updating while unfocused.
    .insert_resource(WinitSettings::game());

    // Loaded after LogPlugin is built so config warnings are visible.
    let config = DescriptionConfig::load_or_default(CONFIG_PATH);
    app.add_plugins((
        game::GamePlugin::new(config),
        ui::UiPlugin,
        save::SavePlugin,
        demo::DemoPlugin,
    ));

    app.run();
}
