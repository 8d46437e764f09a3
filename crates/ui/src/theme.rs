use owo_colors::{OwoColorize, Rgb};

/// Iceberg palette for terminal status output
///
/// Based on iceberg.vim color scheme (https://github.com/cocopon/iceberg.vim)
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary accent: blue
    pub const BLUE: Rgb = Rgb(132, 160, 198);

    /// Secondary accent: cyan
    pub const CYAN: Rgb = Rgb(137, 184, 194);

    /// Success: green
    pub const GREEN: Rgb = Rgb(180, 190, 130);

    /// Warnings: yellow
    pub const YELLOW: Rgb = Rgb(226, 164, 120);

    /// Errors: red
    pub const RED: Rgb = Rgb(226, 120, 120);

    /// Muted text: dimmed foreground
    pub const MUTED: Rgb = Rgb(107, 112, 137);

    pub const SUCCESS_GLYPH: &str = "✔";
    pub const FAILURE_GLYPH: &str = "✘";

    pub fn success(text: &str) -> String {
        text.color(Self::GREEN).bold().to_string()
    }

    pub fn failure(text: &str) -> String {
        text.color(Self::RED).bold().to_string()
    }

    pub fn warning(text: &str) -> String {
        text.color(Self::YELLOW).bold().to_string()
    }

    pub fn info(text: &str) -> String {
        text.color(Self::BLUE).bold().to_string()
    }

    pub fn accent(text: &str) -> String {
        text.color(Self::CYAN).to_string()
    }

    pub fn muted(text: &str) -> String {
        text.color(Self::MUTED).to_string()
    }
}
