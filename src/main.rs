mod playback;
mod remote;
mod render;
mod settings;
mod system;
mod window;

use crate::system::config::AppConfig;
use crate::system::init::SdlToolkit;
use crate::system::{bootstrap, cli, platform};

// Build-time version information
const BUILD_DATE: &str = env!("BUILD_DATE");
const GIT_HASH: &str = env!("GIT_HASH");

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Avogadro {} starting ({}, built {})", env!("CARGO_PKG_VERSION"), GIT_HASH, BUILD_DATE);

    let config = AppConfig::from_env();
    log::debug!(
        "Features: test-playback={}, rpc={}",
        config.features.test_playback,
        config.features.remote_listener
    );

    let args = cli::lossy_args(std::env::args_os().skip(1));
    let platform = platform::native();
    let mut toolkit = SdlToolkit::new();

    let code = bootstrap::run(&mut toolkit, platform.as_ref(), &config, &args);

    // process::exit skips destructors, shut SDL down first
    drop(toolkit);
    std::process::exit(code);
}
