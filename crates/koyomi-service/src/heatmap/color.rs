//! Occupancy ratio to display color mapping.

/// An RGB color in the 0-255 channel domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blends this color over a background at the given alpha.
    ///
    /// Linear per RGB channel in the 0-255 domain, not gamma-corrected;
    /// a known simplification of the display pipeline.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the blended channel stays within [0, 255] for alpha in [0, 1]"
    )]
    pub fn blend_over(self, background: Self, alpha: f32) -> Self {
        let channel = |fg: u8, bg: u8| {
            ((1.0 - alpha) * f32::from(bg) + alpha * f32::from(fg)).round() as u8
        };
        Self {
            r: channel(self.r, background.r),
            g: channel(self.g, background.g),
            b: channel(self.b, background.b),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Seven-step palette for the discrete display mode: the empty bucket and
/// five increasing bands up to full agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange(pub [Color; 7]);

impl ColorRange {
    #[must_use]
    pub const fn new(colors: [Color; 7]) -> Self {
        Self(colors)
    }

    #[must_use]
    pub const fn color_at(&self, index: usize) -> Color {
        self.0[index]
    }

    /// The discrete bucket policy: palette entry for an occupancy ratio.
    #[must_use]
    pub fn color_for(&self, occupants: usize, total: usize) -> Color {
        self.0[bucket_index(occupants, total)]
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self([
            Color::rgb(0xee, 0xee, 0xee),
            Color::rgb(0xe8, 0xf5, 0xe9),
            Color::rgb(0xc8, 0xe6, 0xc9),
            Color::rgb(0x81, 0xc7, 0x84),
            Color::rgb(0x4c, 0xaf, 0x50),
            Color::rgb(0x2e, 0x7d, 0x32),
            Color::rgb(0x1b, 0x5e, 0x20),
        ])
    }
}

/// Maps an occupancy ratio onto the seven palette buckets.
///
/// Boundaries sit at `r == 0`, `r < 0.2`, `r < 0.4`, `r < 0.6`,
/// `r < 0.8`, `r < 1` and `r == 1`. A zero respondent total is the empty
/// bucket, never a division.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "participant counts are small human-scale numbers"
)]
pub fn bucket_index(occupants: usize, total: usize) -> usize {
    if total == 0 || occupants == 0 {
        return 0;
    }
    let ratio = occupants as f64 / total as f64;
    if ratio < 0.2 {
        1
    } else if ratio < 0.4 {
        2
    } else if ratio < 0.6 {
        3
    } else if ratio < 0.8 {
        4
    } else if ratio < 1.0 {
        5
    } else {
        6
    }
}

/// How occupancy translates to a display color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorPolicy {
    /// Index into the seven-step palette.
    Discrete,
    /// Blend the foreground over the background at an alpha stepped in
    /// 0.2 increments by the same ratio boundaries as the palette.
    Blend {
        foreground: Color,
        empty: Color,
        background: Color,
    },
}

/// ## Summary
/// Maps a slot's occupancy to its display color under the given policy.
///
/// In blend mode the empty bucket returns the empty color verbatim and
/// full agreement returns the foreground verbatim, so neither endpoint
/// picks up blending artifacts.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "bucket indices never exceed 6"
)]
pub fn color_for(
    occupants: usize,
    total: usize,
    policy: ColorPolicy,
    palette: &ColorRange,
) -> Color {
    match policy {
        ColorPolicy::Discrete => palette.color_for(occupants, total),
        ColorPolicy::Blend {
            foreground,
            empty,
            background,
        } => match bucket_index(occupants, total) {
            0 => empty,
            6 => foreground,
            index => foreground.blend_over(background, 0.2 * index as f32),
        },
    }
}
