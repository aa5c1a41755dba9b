use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let config = kiln::AppConfig::from_env();
    log::info!(
        "Starting {} ({}x{}, assets in {})",
        config.title,
        config.width,
        config.height,
        config.asset_root.display()
    );

    kiln::KilnApp::new(config)?.run()
}
