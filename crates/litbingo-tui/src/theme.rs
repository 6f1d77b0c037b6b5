use crossterm::style::Color;

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Default text color
    pub fg: Color,
    /// Grid border color
    pub border: Color,
    /// Row/column category labels
    pub label: Color,
    /// Locked-correct cell color
    pub correct: Color,
    /// Locked-incorrect cell color (hardcore)
    pub incorrect: Color,
    /// Selected cell background
    pub selected_bg: Color,
    /// Timer/info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
    /// Popup message / highlight color
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            label: Color::Rgb { r: 180, g: 190, b: 220 },
            correct: Color::Rgb { r: 90, g: 255, b: 130 },
            incorrect: Color::Rgb { r: 255, g: 90, b: 90 },
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
            accent: Color::Rgb { r: 120, g: 200, b: 255 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 180, g: 180, b: 195 },
            label: Color::Rgb { r: 60, g: 70, b: 110 },
            correct: Color::Rgb { r: 40, g: 160, b: 60 },
            incorrect: Color::Rgb { r: 220, g: 50, b: 50 },
            selected_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
            accent: Color::Rgb { r: 30, g: 100, b: 200 },
        }
    }
}
