#[cfg(feature = "ui")]
use eframe::egui;

/// Font size the scale factor of 1.0 corresponds to
#[cfg(feature = "ui")]
pub const BASE_FONT_SIZE: f32 = 14.0;

/// UI theme configuration
#[cfg(feature = "ui")]
#[derive(Debug, Clone)]
pub struct Theme {
    pub is_dark: bool,
    pub font_size: f32,
    accent_color: egui::Color32,
}

#[cfg(feature = "ui")]
impl Theme {
    // Wildberries brand purple
    const ACCENT: egui::Color32 = egui::Color32::from_rgb(203, 17, 171);

    /// Create dark theme
    pub fn dark(font_size: f32) -> Self {
        Self {
            is_dark: true,
            font_size,
            accent_color: Self::ACCENT,
        }
    }

    /// Create light theme
    pub fn light(font_size: f32) -> Self {
        Self {
            is_dark: false,
            font_size,
            accent_color: Self::ACCENT,
        }
    }

    /// Resolve a theme from its configuration name
    pub fn from_config(name: &str, font_size: f32) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Self::light(font_size)
        } else {
            Self::dark(font_size)
        }
    }

    pub fn name(&self) -> &'static str {
        if self.is_dark {
            "dark"
        } else {
            "light"
        }
    }

    /// Apply theme to context
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals = if self.is_dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        style.visuals.selection.bg_fill = self.accent_color;
        style.visuals.hyperlink_color = self.accent_color;
        style.visuals.widgets.active.bg_fill = self.accent_color.linear_multiply(0.6);

        // Rescale from the default sizes every frame, never from the
        // previous frame's sizes
        style.text_styles = egui::Style::default().text_styles;
        let scale = self.font_size / BASE_FONT_SIZE;
        if (scale - 1.0).abs() > 0.01 {
            for font_id in style.text_styles.values_mut() {
                font_id.size = (font_id.size * scale).round();
            }
        }

        ctx.set_style(style);
    }

    /// Check if theme is dark
    pub fn is_dark(&self) -> bool {
        self.is_dark
    }
}

#[cfg(all(test, feature = "ui"))]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_config_name() {
        assert!(Theme::from_config("dark", 14.0).is_dark());
        assert!(!Theme::from_config("light", 14.0).is_dark());
        assert!(!Theme::from_config("LIGHT", 14.0).is_dark());
        // Unknown names fall back to dark
        assert!(Theme::from_config("solarized", 14.0).is_dark());
    }

    #[test]
    fn test_theme_name_round_trip() {
        assert_eq!(Theme::dark(14.0).name(), "dark");
        assert_eq!(Theme::light(14.0).name(), "light");
    }
}
