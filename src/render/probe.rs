//! Hardware-accelerated rendering check.
//!
//! A throwaway surface and context are created, the context is made current
//! and both are dropped again before the function returns. Release happens
//! through `Drop`, context first, so no path can leak either handle.

use sdl3::video::{GLContext, Window};
use sdl3::VideoSubsystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCapability {
    pub is_valid: bool,
}

/// Source of the transient surface/context pair used by [`probe`]
pub trait ProbeBackend {
    type Surface;
    type Context;

    fn create_surface(&mut self) -> Result<Self::Surface, String>;

    fn create_context(&mut self, surface: &Self::Surface) -> Result<Self::Context, String>;

    /// Make `context` current against `surface`, returning whether it worked
    fn make_current(&mut self, surface: &Self::Surface, context: &Self::Context) -> bool;
}

pub fn probe<B: ProbeBackend>(backend: &mut B) -> RenderCapability {
    let surface = match backend.create_surface() {
        Ok(surface) => surface,
        Err(e) => {
            log::warn!("Failed to create offscreen surface: {}", e);
            return RenderCapability { is_valid: false };
        }
    };

    let context = match backend.create_context(&surface) {
        Ok(context) => context,
        Err(e) => {
            log::warn!("Failed to create OpenGL context: {}", e);
            return RenderCapability { is_valid: false };
        }
    };

    let is_valid = backend.make_current(&surface, &context);
    drop(context);
    drop(surface);

    log::debug!("OpenGL capability probe: valid={}", is_valid);
    RenderCapability { is_valid }
}

/// Probe backend using a hidden 1x1 OpenGL window as the offscreen surface.
///
/// Must run before any GL attribute is changed so the probe context is
/// created with the driver defaults.
pub struct SdlOffscreen<'a> {
    video: &'a VideoSubsystem,
}

impl<'a> SdlOffscreen<'a> {
    pub fn new(video: &'a VideoSubsystem) -> Self {
        Self { video }
    }
}

impl ProbeBackend for SdlOffscreen<'_> {
    type Surface = Window;
    type Context = GLContext;

    fn create_surface(&mut self) -> Result<Window, String> {
        self.video
            .window("Avogadro OpenGL probe", 1, 1)
            .hidden()
            .opengl()
            .build()
            .map_err(|e| e.to_string())
    }

    fn create_context(&mut self, surface: &Window) -> Result<GLContext, String> {
        surface.gl_create_context().map_err(|e| e.to_string())
    }

    fn make_current(&mut self, surface: &Window, context: &GLContext) -> bool {
        match surface.gl_make_current(context) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to make OpenGL context current: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct Tracked {
        name: &'static str,
        log: Log,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    struct FakeBackend {
        log: Log,
        surface_ok: bool,
        context_ok: bool,
        current_ok: bool,
    }

    impl FakeBackend {
        fn new(surface_ok: bool, context_ok: bool, current_ok: bool) -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                surface_ok,
                context_ok,
                current_ok,
            }
        }

        fn released(&self) -> Vec<&'static str> {
            self.log.borrow().clone()
        }
    }

    impl ProbeBackend for FakeBackend {
        type Surface = Tracked;
        type Context = Tracked;

        fn create_surface(&mut self) -> Result<Tracked, String> {
            if !self.surface_ok {
                return Err("no display".to_string());
            }
            Ok(Tracked {
                name: "surface",
                log: Rc::clone(&self.log),
            })
        }

        fn create_context(&mut self, _surface: &Tracked) -> Result<Tracked, String> {
            if !self.context_ok {
                return Err("no GL".to_string());
            }
            Ok(Tracked {
                name: "context",
                log: Rc::clone(&self.log),
            })
        }

        fn make_current(&mut self, _surface: &Tracked, _context: &Tracked) -> bool {
            self.current_ok
        }
    }

    #[test]
    fn test_probe_valid_releases_both_once() {
        let mut backend = FakeBackend::new(true, true, true);
        assert!(probe(&mut backend).is_valid);
        assert_eq!(backend.released(), vec!["context", "surface"]);
    }

    #[test]
    fn test_probe_make_current_failure_releases_both_once() {
        let mut backend = FakeBackend::new(true, true, false);
        assert!(!probe(&mut backend).is_valid);
        assert_eq!(backend.released(), vec!["context", "surface"]);
    }

    #[test]
    fn test_probe_context_failure_releases_surface() {
        let mut backend = FakeBackend::new(true, false, true);
        assert!(!probe(&mut backend).is_valid);
        assert_eq!(backend.released(), vec!["surface"]);
    }

    #[test]
    fn test_probe_surface_failure_releases_nothing() {
        let mut backend = FakeBackend::new(false, true, true);
        assert!(!probe(&mut backend).is_valid);
        assert!(backend.released().is_empty());
    }
}
