//! Default attributes for every OpenGL context created after startup.

use sdl3::VideoSubsystem;

pub const DEFAULT_SAMPLE_COUNT: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderDefaults {
    /// Multisample anti-aliasing samples, 0 disables MSAA
    pub sample_count: u8,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

impl RenderDefaults {
    /// (multisample buffers, multisample samples) as SDL expects them
    pub fn multisample_attributes(&self) -> (u8, u8) {
        if self.sample_count == 0 {
            (0, 0)
        } else {
            (1, self.sample_count)
        }
    }

    /// Apply to SDL's GL attributes. Only contexts created afterwards see them.
    pub fn apply(&self, video: &VideoSubsystem) {
        let (buffers, samples) = self.multisample_attributes();
        let gl_attr = video.gl_attr();
        gl_attr.set_multisample_buffers(buffers);
        gl_attr.set_multisample_samples(samples);
        log::info!("Default OpenGL format: {} samples", samples);
    }
}
