//! Main application window.
//!
//! [`Session`] holds everything that is not an SDL handle (open documents,
//! settings, pending quit) so it can be driven by remote commands and tests
//! without a display. [`AppWindow`] wraps it with the real OpenGL window.

use crate::playback;
use crate::remote::RemoteTarget;
use crate::settings::{self, Settings};
use crate::system::bootstrap::MainWindow;
use crate::system::identity::ProcessIdentity;
use sdl3::video::{GLContext, Window};
use sdl3::VideoSubsystem;
use std::path::Path;

pub struct Session {
    identity: ProcessIdentity,
    documents: Vec<String>,
    /// None when settings are disabled for this run
    settings: Option<Settings>,
    quit_code: Option<i32>,
}

impl Session {
    pub fn new(identity: ProcessIdentity, settings: Option<Settings>) -> Self {
        Self {
            identity,
            documents: Vec::new(),
            settings,
            quit_code: None,
        }
    }

    /// Load persisted settings unless `disable_settings`; unreadable settings fall back to defaults
    pub fn with_persisted_settings(identity: ProcessIdentity, disable_settings: bool) -> Self {
        let settings = if disable_settings {
            log::info!("Settings disabled for this session");
            None
        } else {
            Some(settings::load_settings(&identity).unwrap_or_else(|e| {
                log::warn!("Failed to load settings, using defaults: {}", e);
                Settings::default()
            }))
        };
        Self::new(identity, settings)
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn quit_requested(&self) -> Option<i32> {
        self.quit_code
    }

    /// Window title for the most recently opened document
    pub fn title(&self) -> String {
        match self.documents.last().and_then(|d| Path::new(d).file_name()) {
            Some(name) => format!("{} - {}", name.to_string_lossy(), self.identity.application_name),
            None => self.identity.application_name.clone(),
        }
    }

    /// Open each file in order, logging and skipping the ones that fail
    pub fn open_all(&mut self, file_names: &[String]) {
        for file_name in file_names {
            if let Err(e) = self.open_file(file_name) {
                log::warn!("{}", e);
            }
        }
    }

    pub fn record_window_size(&mut self, width: u32, height: u32) {
        if let Some(settings) = self.settings.as_mut() {
            settings.window.width = width;
            settings.window.height = height;
        }
    }

    /// Write settings back to disk; a no-op when settings are disabled
    pub fn save(&self) {
        if let Some(settings) = self.settings.as_ref() {
            match settings::save_settings(&self.identity, settings) {
                Ok(()) => log::debug!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            }
        }
    }
}

impl RemoteTarget for Session {
    fn application_name(&self) -> String {
        self.identity.application_name.clone()
    }

    fn open_file(&mut self, path: &str) -> Result<(), String> {
        if !Path::new(path).is_file() {
            return Err(format!("Cannot open '{}': file not found", path));
        }
        log::info!("Opened {}", path);
        self.documents.push(path.to_string());
        if let Some(settings) = self.settings.as_mut() {
            settings.add_recent_file(path);
        }
        Ok(())
    }

    fn open_files(&self) -> Vec<String> {
        self.documents().to_vec()
    }

    fn request_quit(&mut self, code: i32) {
        log::info!("Quit requested with code {}", code);
        self.quit_code = Some(code);
    }
}

pub struct AppWindow {
    session: Session,
    // Context must drop before the window it was created for
    _gl_context: GLContext,
    window: Window,
}

impl AppWindow {
    /// Build the (still hidden) main window and open `file_names` in order
    pub fn new(video: &VideoSubsystem, identity: &ProcessIdentity, file_names: &[String], disable_settings: bool) -> Result<Self, String> {
        let mut session = Session::with_persisted_settings(identity.clone(), disable_settings);
        let geometry = session.settings().map(|s| s.window.clamped()).unwrap_or_default();

        let window = video
            .window(&identity.application_name, geometry.width, geometry.height)
            .position_centered()
            .resizable()
            .high_pixel_density()
            .opengl()
            .hidden()
            .build()
            .map_err(|e| e.to_string())?;

        let gl_context = window.gl_create_context().map_err(|e| e.to_string())?;
        window.gl_make_current(&gl_context).map_err(|e| e.to_string())?;

        session.open_all(file_names);

        let mut app_window = Self {
            session,
            _gl_context: gl_context,
            window,
        };
        app_window.refresh_title();
        Ok(app_window)
    }

    pub fn quit_requested(&self) -> Option<i32> {
        self.session.quit_requested()
    }

    pub fn present(&self) {
        self.window.gl_swap_window();
    }

    /// Store the current size and persist settings
    pub fn close(&mut self) {
        let (width, height) = self.window.size();
        self.session.record_window_size(width, height);
        self.session.save();
    }

    fn refresh_title(&mut self) {
        let title = self.session.title();
        if let Err(e) = self.window.set_title(&title) {
            log::warn!("Failed to set window title: {}", e);
        }
    }
}

impl MainWindow for AppWindow {
    fn play_test(&mut self, test_file: Option<&str>, exit_after_playback: bool) {
        playback::play_test(self, test_file, exit_after_playback);
    }

    fn show(&mut self) {
        self.window.show();
    }
}

impl RemoteTarget for AppWindow {
    fn application_name(&self) -> String {
        self.session.application_name()
    }

    fn open_file(&mut self, path: &str) -> Result<(), String> {
        self.session.open_file(path)?;
        self.refresh_title();
        Ok(())
    }

    fn open_files(&self) -> Vec<String> {
        self.session.open_files()
    }

    fn request_quit(&mut self, code: i32) {
        self.session.request_quit(code);
    }
}
