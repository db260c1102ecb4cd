use crate::{layers::style::FontSpec, rendering::commands::DrawCommand};

/// Supplies text extents so text can be placed by its anchor
pub trait TextMeasurer {
    /// Width and height in pixels of `text` drawn in `font`
    fn measure(&self, text: &str, font: &FontSpec) -> (f64, f64);
}

/// Monospace approximation: every glyph is `char_width` of the font size
/// wide and one and a half font sizes tall. Good enough for headless use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMeasurer {
    pub char_width: f64,
}

impl Default for FixedWidthMeasurer {
    fn default() -> Self {
        Self { char_width: 0.6 }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> (f64, f64) {
        let size = font.size as f64;
        (
            text.chars().count() as f64 * size * self.char_width,
            size * 1.5,
        )
    }
}

/// Ordered draw commands for one frame
#[derive(Debug, Clone)]
pub struct RenderContext<T> {
    commands: Vec<DrawCommand<T>>,
    frame: u64,
}

impl<T> RenderContext<T> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            frame: 0,
        }
    }

    /// Drops the previous frame's commands
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.frame += 1;
    }

    pub fn push(&mut self, command: DrawCommand<T>) {
        self.commands.push(command);
    }

    /// Commands back to front
    pub fn commands(&self) -> &[DrawCommand<T>] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand<T>> {
        std::mem::take(&mut self.commands)
    }

    /// Number of frames begun so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl<T> Default for RenderContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::Point, layers::style::Colour};

    #[test]
    fn test_fixed_width_measure() {
        let measurer = FixedWidthMeasurer { char_width: 0.5 };
        assert_eq!(measurer.measure("abcd", &FontSpec::new("Mono", 10)), (20.0, 15.0));
    }

    #[test]
    fn test_frames_reset_commands() {
        let mut context: RenderContext<u32> = RenderContext::new();
        context.begin_frame();
        context.push(DrawCommand::Tile {
            tile: 7,
            origin: Point::new(0.0, 0.0),
        });
        context.push(DrawCommand::Circle {
            center: Point::new(1.0, 1.0),
            radius: 2.0,
            colour: Colour::RED,
        });
        assert_eq!(context.commands().len(), 2);
        assert!(context.commands()[0].is_tile());

        context.begin_frame();
        assert!(context.commands().is_empty());
        assert_eq!(context.frame(), 2);
    }
}
