//! Platform-specific adjustments applied before anything else at startup.
//!
//! The variant is picked at build time by [`native`]; every other platform
//! gets the no-op default.

/// Process-wide attributes a platform may tweak before the toolkit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformAttributes {
    /// Draw icons next to menu entries
    pub show_icons_in_menus: bool,
    /// Keep menu entries the native menu bar already provides
    pub native_menu_entries: bool,
    /// Force the desktop OpenGL driver instead of OpenGL ES
    pub prefer_desktop_gl: bool,
}

impl Default for PlatformAttributes {
    fn default() -> Self {
        Self {
            show_icons_in_menus: true,
            native_menu_entries: true,
            prefer_desktop_gl: false,
        }
    }
}

pub trait PlatformAdjustments {
    fn name(&self) -> &'static str;

    fn apply_platform_adjustments(&self, _attributes: &mut PlatformAttributes) {}
}

pub struct GenericPlatform;

impl PlatformAdjustments for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }
}

/// Native macOS applications have no icons in menus and own the app menu
pub struct MacPlatform;

impl PlatformAdjustments for MacPlatform {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn apply_platform_adjustments(&self, attributes: &mut PlatformAttributes) {
        attributes.native_menu_entries = false;
        attributes.show_icons_in_menus = false;
    }
}

/// Windows drivers often default to ANGLE/GLES; rendering needs desktop GL
pub struct WindowsPlatform;

impl PlatformAdjustments for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn apply_platform_adjustments(&self, attributes: &mut PlatformAttributes) {
        attributes.prefer_desktop_gl = true;
    }
}

/// Adjustments for the platform this binary was built for
pub fn native() -> Box<dyn PlatformAdjustments> {
    #[cfg(target_os = "macos")]
    return Box::new(MacPlatform);

    #[cfg(target_os = "windows")]
    return Box::new(WindowsPlatform);

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    return Box::new(GenericPlatform);
}
