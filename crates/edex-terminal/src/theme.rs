use edex_types::Theme;

use super::DEFAULT_SCROLLBACK_LINES;

/// Font size used when neither the theme nor the settings give one
pub const DEFAULT_FONT_SIZE: u16 = 15;

/// How far a missing palette entry is pulled toward the theme accent
const ACCENT_MIX_RATIO: f32 = 0.3;

/// xterm's stock palette, in ANSI order
const BASE_PALETTE: [&str; 16] = [
    "#2e3436", "#cc0000", "#4e9a06", "#c4a000", "#3465a4", "#75507b", "#06989a", "#d3d7cf",
    "#555753", "#ef2929", "#8ae234", "#fce94f", "#729fcf", "#ad7fa8", "#34e2e2", "#eeeeec",
];

/// Cursor shape of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

impl std::str::FromStr for CursorStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "underline" => Ok(Self::Underline),
            "bar" | "line" => Ok(Self::Bar),
            _ => Err(format!(
                "Invalid cursor style: '{}'. Valid options: 'block', 'underline', 'bar'",
                s
            )),
        }
    }
}

impl std::fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Underline => write!(f, "underline"),
            Self::Bar => write!(f, "bar"),
        }
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Blend `base` toward `target` by `ratio` (0.0 = base, 1.0 = target).
///
/// Both colours are `#rrggbb`; if either fails to parse the base is returned
/// unchanged.
pub fn mix_colors(base: &str, target: &str, ratio: f32) -> String {
    let (Some(from), Some(to)) = (parse_hex(base), parse_hex(target)) else {
        return base.to_string();
    };
    let ratio = ratio.clamp(0.0, 1.0);
    let blend = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * ratio).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        blend(from.0, to.0),
        blend(from.1, to.1),
        blend(from.2, to.2)
    )
}

/// Colours a surface renders with
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub foreground: String,
    pub background: String,
    pub cursor: String,
    pub cursor_accent: String,
    pub selection: String,
    /// black, red, green, yellow, blue, magenta, cyan, white, then the bright variants
    pub ansi: [String; 16],
}

impl Palette {
    pub fn from_theme(theme: &Theme) -> Self {
        let accent = theme.accent_hex();
        let c = &theme.colors;
        let overrides = [
            &c.black,
            &c.red,
            &c.green,
            &c.yellow,
            &c.blue,
            &c.magenta,
            &c.cyan,
            &c.white,
            &c.bright_black,
            &c.bright_red,
            &c.bright_green,
            &c.bright_yellow,
            &c.bright_blue,
            &c.bright_magenta,
            &c.bright_cyan,
            &c.bright_white,
        ];

        let ansi = std::array::from_fn(|i| {
            overrides[i]
                .clone()
                .unwrap_or_else(|| mix_colors(BASE_PALETTE[i], &accent, ACCENT_MIX_RATIO))
        });

        let t = &theme.terminal;
        Self {
            foreground: t.foreground.clone().unwrap_or_else(|| accent.clone()),
            background: t.background.clone().unwrap_or_else(|| "#000000".to_string()),
            cursor: t.cursor.clone().unwrap_or_else(|| accent.clone()),
            cursor_accent: t.cursor_accent.clone().unwrap_or_else(|| "#000000".to_string()),
            selection: t.selection.clone().unwrap_or_else(|| accent.clone()),
            ansi,
        }
    }
}

/// Pixel size of one character cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
}

/// Everything a surface needs from the theme and settings
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub cursor_style: CursorStyle,
    pub cursor_blink: bool,
    pub font_family: String,
    pub font_size: u16,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub scrollback: usize,
    pub palette: Palette,
}

impl SurfaceConfig {
    /// Derive a surface configuration from a theme; `fallback_font_size` is
    /// the user's terminal font size setting, used when the theme has none.
    pub fn from_theme(theme: &Theme, fallback_font_size: u16) -> Self {
        let t = &theme.terminal;
        let cursor_style = match t.cursor_style.as_deref().map(str::parse::<CursorStyle>) {
            Some(Ok(style)) => style,
            Some(Err(e)) => {
                log::warn!("{}; using block cursor", e);
                CursorStyle::Block
            }
            None => CursorStyle::Block,
        };

        Self {
            cursor_style,
            cursor_blink: t.cursor_blink,
            font_family: t.font_family.clone().unwrap_or_else(|| "monospace".to_string()),
            font_size: t.font_size.unwrap_or(fallback_font_size).max(1),
            line_height: t.line_height.filter(|h| *h > 0.0).unwrap_or(1.0),
            letter_spacing: t.letter_spacing.unwrap_or(0.0),
            scrollback: DEFAULT_SCROLLBACK_LINES,
            palette: Palette::from_theme(theme),
        }
    }

    /// Cell size the fit computation divides the container by
    pub fn cell_metrics(&self) -> CellMetrics {
        let font = self.font_size as f32;
        CellMetrics {
            width: (font * 0.6 + self.letter_spacing).max(1.0),
            height: (font * 1.2 * self.line_height).max(1.0),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::from_theme(&Theme::default(), DEFAULT_FONT_SIZE)
    }
}
