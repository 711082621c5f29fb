use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub error: Color,
}

impl Theme {
    pub fn for_mode(dark: bool) -> Self {
        if dark { Self::dark() } else { Self::light() }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(8, 12, 16),
            surface: Color::Rgb(20, 26, 32),
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(80, 160, 160),
            border: Color::Rgb(60, 70, 80),
            border_focused: Color::Rgb(80, 160, 160),
            positive: Color::Rgb(90, 180, 110),
            error: Color::Rgb(200, 80, 80),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(246, 246, 242),
            surface: Color::Rgb(255, 255, 255),
            text: Color::Rgb(30, 34, 40),
            dim: Color::Rgb(110, 110, 110),
            accent: Color::Rgb(20, 110, 120),
            border: Color::Rgb(190, 190, 185),
            border_focused: Color::Rgb(20, 110, 120),
            positive: Color::Rgb(30, 130, 60),
            error: Color::Rgb(180, 40, 40),
        }
    }
}
