use anyhow::Result;

use scene_viewer::{config::ViewerConfig, window};

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = ViewerConfig::from_env()?;
    log::info!("Starting with {:?}", config);

    pollster::block_on(window::run(config))?;

    Ok(())
}
