// Theme model as shipped in the dashboard's theme JSON files

use serde::{Deserialize, Deserializer, Serialize};

/// Treat `null` and empty strings as an absent colour
fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// A complete theme file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub terminal: ThemeTerminal,
}

impl Theme {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The accent colour as `#rrggbb`
    pub fn accent_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            self.colors.r, self.colors.g, self.colors.b
        )
    }
}

/// Accent colour and the optional ANSI palette overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    #[serde(default = "default_r")]
    pub r: u8,
    #[serde(default = "default_g")]
    pub g: u8,
    #[serde(default = "default_b")]
    pub b: u8,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub black: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub red: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub green: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub yellow: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub blue: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub magenta: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub cyan: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub white: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_black: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_red: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_green: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_yellow: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_blue: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_magenta: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_cyan: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub bright_white: Option<String>,
}

// tron blue
fn default_r() -> u8 {
    170
}

fn default_g() -> u8 {
    207
}

fn default_b() -> u8 {
    209
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            r: default_r(),
            g: default_g(),
            b: default_b(),
            black: None,
            red: None,
            green: None,
            yellow: None,
            blue: None,
            magenta: None,
            cyan: None,
            white: None,
            bright_black: None,
            bright_red: None,
            bright_green: None,
            bright_yellow: None,
            bright_blue: None,
            bright_magenta: None,
            bright_cyan: None,
            bright_white: None,
        }
    }
}

/// Terminal section of a theme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTerminal {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<u16>,
    #[serde(default)]
    pub cursor_style: Option<String>,
    #[serde(default)]
    pub cursor_blink: bool,
    #[serde(default)]
    pub line_height: Option<f32>,
    #[serde(default)]
    pub letter_spacing: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub foreground: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub background: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub cursor: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub cursor_accent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub selection: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_theme_file() {
        let json = r##"{
            "colors": { "r": 0, "g": 255, "b": 0, "red": "#ff0000", "brightCyan": "" },
            "terminal": {
                "fontFamily": "Fira Mono",
                "fontSize": 14,
                "cursorStyle": "block",
                "cursorBlink": true,
                "foreground": "#00ff00",
                "background": null
            }
        }"##;

        let theme = Theme::from_json(json).unwrap();
        assert_eq!(theme.accent_hex(), "#00ff00");
        assert_eq!(theme.colors.red.as_deref(), Some("#ff0000"));
        assert_eq!(theme.colors.bright_cyan, None);
        assert_eq!(theme.terminal.font_size, Some(14));
        assert_eq!(theme.terminal.background, None);
        assert!(theme.terminal.cursor_blink);
    }

    #[test]
    fn test_defaults() {
        let theme = Theme::from_json("{}").unwrap();
        assert_eq!(theme.accent_hex(), "#aacfd1");
        assert_eq!(Theme::default().accent_hex(), "#aacfd1");
    }
}
