//! SDL-backed toolkit for the startup sequence and the event loop.
//!
//! SDL itself is initialised lazily on the first step that needs video, so
//! hints derived from the platform attributes and the process identity are
//! in place before `SDL_Init` reads them.

use crate::remote::RpcListener;
use crate::render::{self, RenderCapability, RenderDefaults, SdlOffscreen};
use crate::system::bootstrap::Toolkit;
use crate::system::cli::ParsedArguments;
use crate::system::config::AppConfig;
use crate::system::identity::ProcessIdentity;
use crate::system::platform::PlatformAttributes;
use crate::system::EXIT_SUCCESS;
use crate::window::AppWindow;
use sdl3::event::Event;
use sdl3::messagebox::{show_simple_message_box, MessageBoxFlag};
use sdl3::{EventPump, Sdl, VideoSubsystem};
use std::time::Duration;

/// Idle time between event-loop iterations when nothing is pending
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Default)]
pub struct SdlToolkit {
    sdl: Option<Sdl>,
    video: Option<VideoSubsystem>,
}

impl SdlToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    fn video(&mut self) -> Result<VideoSubsystem, String> {
        if let Some(video) = &self.video {
            return Ok(video.clone());
        }
        let sdl = match self.sdl.take() {
            Some(sdl) => sdl,
            None => sdl3::init().map_err(|e| e.to_string())?,
        };
        let video = sdl.video().map_err(|e| e.to_string())?;
        self.sdl = Some(sdl);
        self.video = Some(video.clone());
        Ok(video)
    }

    fn event_pump(&mut self) -> Result<EventPump, String> {
        self.video()?;
        match &self.sdl {
            Some(sdl) => sdl.event_pump().map_err(|e| e.to_string()),
            None => Err("SDL is not initialized".to_string()),
        }
    }
}

impl Toolkit for SdlToolkit {
    type Window = AppWindow;
    type Listener = RpcListener;

    fn apply_platform_attributes(&mut self, attributes: &PlatformAttributes) {
        if attributes.prefer_desktop_gl {
            sdl3::hint::set("SDL_OPENGL_ES_DRIVER", "0");
        }
    }

    fn register_identity(&mut self, identity: &ProcessIdentity) {
        let app_id = identity.app_id();
        sdl3::hint::set("SDL_APP_NAME", &identity.application_name);
        sdl3::hint::set("SDL_APP_ID", &app_id);
        sdl3::hint::set("SDL_VIDEO_X11_WMCLASS", &identity.application_name.to_lowercase());
        sdl3::hint::set("SDL_VIDEO_WAYLAND_WMCLASS", &app_id);
        log::debug!("Registered identity {} ({})", app_id, identity.organization_name);
    }

    fn probe_capability(&mut self) -> RenderCapability {
        match self.video() {
            Ok(video) => render::probe(&mut SdlOffscreen::new(&video)),
            Err(e) => {
                log::warn!("Failed to initialize SDL video: {}", e);
                RenderCapability { is_valid: false }
            }
        }
    }

    fn configure_defaults(&mut self, defaults: &RenderDefaults) {
        match self.video() {
            Ok(video) => defaults.apply(&video),
            Err(e) => log::warn!("Cannot configure OpenGL defaults: {}", e),
        }
    }

    fn show_notice(&mut self, title: &str, message: &str) {
        if let Err(e) = show_simple_message_box(MessageBoxFlag::INFORMATION, title, message, None::<&sdl3::video::Window>) {
            log::warn!("Failed to show message box: {}", e);
        }
    }

    fn create_main_window(&mut self, config: &AppConfig, args: &ParsedArguments) -> Result<AppWindow, String> {
        let video = self.video()?;
        AppWindow::new(&video, &config.identity, &args.file_names, args.disable_settings)
    }

    fn create_remote_listener(&mut self, config: &AppConfig) -> RpcListener {
        RpcListener::new(config.rpc.clone())
    }

    fn exec(&mut self, window: &mut AppWindow, mut listener: Option<&mut RpcListener>) -> i32 {
        let mut event_pump = match self.event_pump() {
            Ok(pump) => pump,
            Err(e) => {
                log::error!("Failed to create event pump: {}", e);
                return crate::system::EXIT_FAILURE;
            }
        };

        #[cfg(not(target_os = "windows"))]
        let signal_rx = match setup_signal_handlers() {
            Ok(rx) => Some(rx),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };

        if let Some(addr) = listener.as_deref().and_then(|l| l.local_addr()) {
            log::debug!("Serving remote commands on {} during the event loop", addr);
        }

        let code = 'running: loop {
            #[cfg(not(target_os = "windows"))]
            if let Some(sig) = signal_rx.as_ref().and_then(|rx| rx.try_recv().ok()) {
                log::info!("Termination signal {} received, exiting", sig);
                break 'running EXIT_SUCCESS;
            }

            for event in event_pump.poll_iter() {
                if let Event::Quit { .. } = event {
                    break 'running EXIT_SUCCESS;
                }
            }

            if let Some(server) = listener.as_deref_mut() {
                if let Err(e) = server.handle_connections(&mut *window) {
                    log::warn!("Remote control error: {}", e);
                }
            }

            if let Some(code) = window.quit_requested() {
                break 'running code;
            }

            window.present();
            std::thread::sleep(FRAME_INTERVAL);
        };

        window.close();
        log::info!("Event loop finished with exit code {}", code);
        code
    }
}

/// Forward SIGTERM/SIGINT/SIGHUP to the event loop
#[cfg(not(target_os = "windows"))]
fn setup_signal_handlers() -> Result<std::sync::mpsc::Receiver<i32>, String> {
    use signal_hook::consts::signal::*;
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP]).map_err(|e| format!("Failed to register signal handlers: {}", e))?;

    let (signal_tx, signal_rx) = std::sync::mpsc::channel::<i32>();
    std::thread::spawn(move || {
        for sig in signals.forever() {
            let _ = signal_tx.send(sig);
        }
    });

    Ok(signal_rx)
}
