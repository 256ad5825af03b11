//! Terminal colour support for summary tables
//!
//! ANSI output with terminal capability detection. Observed metric values are
//! painted by verdict: green when favorable, red when unfavorable.

use super::summary::Verdict;
use std::fmt;

/// Terminal color capability mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// True color (24-bit RGB)
    TrueColor,
    /// 256 color palette
    Color256,
    /// 16 color palette
    Color16,
    /// No color
    #[default]
    Mono,
}

impl ColorMode {
    /// Detect terminal color capability from environment
    pub fn detect() -> Self {
        Self::detect_with_env(
            std::env::var("COLORTERM").ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
            std::env::var("NO_COLOR").ok().as_deref(),
        )
    }

    /// Detect with explicit environment values
    pub fn detect_with_env(
        colorterm: Option<&str>,
        term: Option<&str>,
        no_color: Option<&str>,
    ) -> Self {
        if no_color.is_some() {
            return Self::Mono;
        }

        if let Some(ct) = colorterm {
            if ct.contains("truecolor") || ct.contains("24bit") {
                return Self::TrueColor;
            }
        }

        if let Some(term) = term {
            if term.contains("256color") || term.contains("kitty") || term.contains("alacritty") {
                return Self::Color256;
            }
            if term.contains("xterm") || term.contains("screen") || term.contains("tmux") {
                return Self::Color16;
            }
            if term == "dumb" || term.is_empty() {
                return Self::Mono;
            }
        }

        Self::Color16
    }
}

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Nearest entry of the 6x6x6 color cube (indices 16-231)
    pub fn to_256(self) -> u8 {
        let r6 = (u16::from(self.r) * 5 / 255) as u8;
        let g6 = (u16::from(self.g) * 5 / 255) as u8;
        let b6 = (u16::from(self.b) * 5 / 255) as u8;
        16 + 36 * r6 + 6 * g6 + b6
    }

    /// Approximate ANSI 16-color index
    pub fn to_16(self) -> u8 {
        let bright = self.r.max(self.g).max(self.b) > 180;
        let base = match (self.r > 85, self.g > 85, self.b > 85) {
            (true, true, true) => 7,
            (true, true, false) => 3,
            (true, false, true) => 5,
            (false, true, true) => 6,
            (true, false, false) => 1,
            (false, true, false) => 2,
            (false, false, true) => 4,
            (false, false, false) => 0,
        };
        if bright {
            base + 8
        } else {
            base
        }
    }
}

/// Text with an optional foreground color
pub struct Styled<'a> {
    text: &'a str,
    fg: Option<Rgb>,
    bold: bool,
    mode: ColorMode,
}

impl<'a> Styled<'a> {
    pub fn new(text: &'a str, mode: ColorMode) -> Self {
        Self { text, fg: None, bold: false, mode }
    }

    pub fn maybe_fg(mut self, color: Option<Rgb>) -> Self {
        self.fg = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl fmt::Display for Styled<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == ColorMode::Mono {
            return write!(f, "{}", self.text);
        }

        let mut has_style = false;
        if self.bold {
            write!(f, "\x1b[1m")?;
            has_style = true;
        }

        if let Some(rgb) = self.fg {
            match self.mode {
                ColorMode::TrueColor => write!(f, "\x1b[38;2;{};{};{}m", rgb.r, rgb.g, rgb.b)?,
                ColorMode::Color256 => write!(f, "\x1b[38;5;{}m", rgb.to_256())?,
                ColorMode::Color16 => {
                    let code = rgb.to_16();
                    if code >= 8 {
                        write!(f, "\x1b[9{}m", code - 8)?;
                    } else {
                        write!(f, "\x1b[3{code}m")?;
                    }
                }
                ColorMode::Mono => {}
            }
            has_style = true;
        }

        write!(f, "{}", self.text)?;

        if has_style {
            write!(f, "\x1b[0m")?;
        }
        Ok(())
    }
}

/// Semantic palette for regression summaries
#[derive(Debug, Clone)]
pub struct SummaryPalette {
    pub mode: ColorMode,
}

impl Default for SummaryPalette {
    fn default() -> Self {
        Self { mode: ColorMode::detect() }
    }
}

impl SummaryPalette {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    /// Palette that never emits escape codes
    pub fn plain() -> Self {
        Self { mode: ColorMode::Mono }
    }

    pub fn style<'a>(&self, text: &'a str) -> Styled<'a> {
        Styled::new(text, self.mode)
    }

    /// Favorable change (green)
    pub const FAVORABLE: Rgb = Rgb::new(76, 200, 80);

    /// Unfavorable change (red)
    pub const UNFAVORABLE: Rgb = Rgb::new(244, 67, 54);

    /// Color of an observed value; `None` leaves it plain
    pub fn verdict_color(verdict: Verdict) -> Option<Rgb> {
        match verdict {
            Verdict::Favorable => Some(Self::FAVORABLE),
            Verdict::Unfavorable => Some(Self::UNFAVORABLE),
            Verdict::Neutral => None,
        }
    }

    /// Paint `text` for a verdict
    pub fn paint(&self, text: &str, verdict: Verdict) -> String {
        self.style(text).maybe_fg(Self::verdict_color(verdict)).to_string()
    }
}
