//! Text measurement used to size node boxes.

/// Measures rendered text in canvas pixels.
///
/// The host toolkit supplies the real implementation; the core only needs
/// the width and height a string would occupy in the node font.
pub trait TextMeasurer {
    /// Return the size of the rendered text as `(width, height)`.
    fn measure(&self, text: &str) -> (f32, f32);
}

/// Fixed-advance approximation, good enough for headless use and tests.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str) -> (f32, f32) {
        (text.chars().count() as f32 * self.char_width, self.line_height)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str) -> (f32, f32) {
        (**self).measure(text)
    }
}
