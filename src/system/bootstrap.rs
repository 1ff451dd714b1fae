//! Startup sequence: platform tweaks, identity, OpenGL check, render
//! defaults, argument classification, main window, remote listener and
//! finally the event loop.
//!
//! Everything the sequence touches goes through [`Toolkit`], so the order
//! and the early exits can be exercised without a display.

use crate::render::{RenderCapability, RenderDefaults};
use crate::system::cli::{self, ParsedArguments};
use crate::system::config::AppConfig;
use crate::system::identity::ProcessIdentity;
use crate::system::platform::{PlatformAdjustments, PlatformAttributes};
use crate::system::{EXIT_FAILURE, EXIT_NO_RENDERING};

pub const NO_OPENGL_MESSAGE: &str = "This system does not support OpenGL!";

pub trait MainWindow {
    fn play_test(&mut self, test_file: Option<&str>, exit_after_playback: bool);

    fn show(&mut self);
}

pub trait RemoteListener {
    fn start(&mut self) -> Result<(), String>;
}

impl RemoteListener for crate::remote::RpcListener {
    fn start(&mut self) -> Result<(), String> {
        crate::remote::RpcListener::start(self).map_err(|e| e.to_string())
    }
}

/// Process-wide services the startup sequence needs from the windowing toolkit
pub trait Toolkit {
    type Window: MainWindow;
    type Listener: RemoteListener;

    fn apply_platform_attributes(&mut self, attributes: &PlatformAttributes);

    fn register_identity(&mut self, identity: &ProcessIdentity);

    fn probe_capability(&mut self) -> RenderCapability;

    fn configure_defaults(&mut self, defaults: &RenderDefaults);

    /// Modal notice shown before the process gives up
    fn show_notice(&mut self, title: &str, message: &str);

    fn create_main_window(&mut self, config: &AppConfig, args: &ParsedArguments) -> Result<Self::Window, String>;

    fn create_remote_listener(&mut self, config: &AppConfig) -> Self::Listener;

    /// Block until the application quits and return its exit code
    fn exec(&mut self, window: &mut Self::Window, listener: Option<&mut Self::Listener>) -> i32;
}

/// Run the whole startup sequence and return the process exit code
pub fn run<T, S>(toolkit: &mut T, platform: &dyn PlatformAdjustments, config: &AppConfig, args: &[S]) -> i32
where
    T: Toolkit,
    S: AsRef<str>,
{
    let mut attributes = PlatformAttributes::default();
    platform.apply_platform_adjustments(&mut attributes);
    log::debug!("Platform '{}' attributes: {:?}", platform.name(), attributes);
    toolkit.apply_platform_attributes(&attributes);

    toolkit.register_identity(&config.identity);

    let capability = toolkit.probe_capability();
    if !capability.is_valid {
        log::error!("{}", NO_OPENGL_MESSAGE);
        toolkit.show_notice(&config.identity.application_name, NO_OPENGL_MESSAGE);
        return EXIT_NO_RENDERING;
    }

    toolkit.configure_defaults(&config.render_defaults);

    let parsed = match cli::classify(args, &config.features) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("{}", e);
            return e.exit_code();
        }
    };

    let mut window = match toolkit.create_main_window(config, &parsed) {
        Ok(window) => window,
        Err(e) => {
            log::error!("Failed to create main window: {}", e);
            return EXIT_FAILURE;
        }
    };
    if config.features.test_playback {
        window.play_test(parsed.test_file.as_deref(), parsed.test_exit_after_playback);
    }
    window.show();

    // Lives until exec returns
    let mut listener = if config.features.remote_listener {
        let mut listener = toolkit.create_remote_listener(config);
        match listener.start() {
            Ok(()) => Some(listener),
            Err(e) => {
                log::warn!("Remote control unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    toolkit.exec(&mut window, listener.as_mut())
}
