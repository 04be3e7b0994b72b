// src/config/mod.rs
//! Render styles, quality tiers, and quality-derived tuning tables.

use serde::{Deserialize, Serialize};

/// Frames between periodic pooled-resource cleanup passes.
pub const CLEANUP_EVERY_FRAMES: u64 = 90;

/// Minimum visible bar width in pixels used when clamping spacing.
pub const MIN_BAR_WIDTH: f32 = 1.0;

/// Identifies a visual style; stable key for caching and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Classic vertical bars with peak caps.
    Bars,
    /// Spokes radiating from the canvas center.
    Radial,
    /// Catmull-Rom interpolated waveform band.
    Wave,
    /// LED-matrix grid of cells.
    Matrix,
    /// Rotating 3D ring of orbs.
    Orbit,
    /// Decaying-trail bars composited through an offscreen buffer.
    Afterglow,
    /// Scrolling glyph ticker showing per-band levels.
    Marquee,
}

impl RenderStyle {
    /// All known styles, in registration order.
    pub const ALL: [RenderStyle; 7] = [
        RenderStyle::Bars,
        RenderStyle::Radial,
        RenderStyle::Wave,
        RenderStyle::Matrix,
        RenderStyle::Orbit,
        RenderStyle::Afterglow,
        RenderStyle::Marquee,
    ];

    /// Stable lowercase name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            RenderStyle::Bars => "bars",
            RenderStyle::Radial => "radial",
            RenderStyle::Wave => "wave",
            RenderStyle::Matrix => "matrix",
            RenderStyle::Orbit => "orbit",
            RenderStyle::Afterglow => "afterglow",
            RenderStyle::Marquee => "marquee",
        }
    }

    /// Parses a style from its lowercase name.
    pub fn from_name(name: &str) -> Option<RenderStyle> {
        RenderStyle::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Global and per-renderer quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl RenderQuality {
    /// Parses a quality tier from its lowercase name.
    pub fn from_name(name: &str) -> Option<RenderQuality> {
        match name {
            "low" => Some(RenderQuality::Low),
            "medium" => Some(RenderQuality::Medium),
            "high" => Some(RenderQuality::High),
            _ => None,
        }
    }
}

/// Quality-derived tuning shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Ceiling on the effective bar count.
    pub max_bars: usize,
    /// Whether paths are drawn anti-aliased.
    pub anti_alias: bool,
    /// Whether optional effects (glow, gradients, particles) run.
    pub advanced_effects: bool,
    /// Temporal smoothing factor in the normal (full-window) context.
    pub smoothing_base: f32,
    /// Smoothing factor when overlay mode is active; larger for a
    /// faster response in the lighter overlay context.
    pub smoothing_overlay: f32,
}

impl QualitySettings {
    const LOW: QualitySettings = QualitySettings {
        max_bars: 64,
        anti_alias: false,
        advanced_effects: false,
        smoothing_base: 0.35,
        smoothing_overlay: 0.50,
    };

    const MEDIUM: QualitySettings = QualitySettings {
        max_bars: 128,
        anti_alias: true,
        advanced_effects: true,
        smoothing_base: 0.25,
        smoothing_overlay: 0.40,
    };

    const HIGH: QualitySettings = QualitySettings {
        max_bars: 256,
        anti_alias: true,
        advanced_effects: true,
        smoothing_base: 0.20,
        smoothing_overlay: 0.35,
    };

    /// Tuning for the given quality tier.
    pub fn for_quality(quality: RenderQuality) -> &'static QualitySettings {
        match quality {
            RenderQuality::Low => &Self::LOW,
            RenderQuality::Medium => &Self::MEDIUM,
            RenderQuality::High => &Self::HIGH,
        }
    }
}

/// Per-tier settings table used by concrete effects.
///
/// Lookup falls back requested tier -> Medium -> first available, so an
/// effect with a partial table still resolves without erroring.
#[derive(Debug, Clone)]
pub struct TierTable<S> {
    pub low: Option<S>,
    pub medium: Option<S>,
    pub high: Option<S>,
}

impl<S> TierTable<S> {
    /// Builds a table with all three tiers populated.
    pub const fn full(low: S, medium: S, high: S) -> Self {
        Self {
            low: Some(low),
            medium: Some(medium),
            high: Some(high),
        }
    }

    /// Resolves settings for a tier, falling back to Medium and then to
    /// the first populated slot. Returns `None` only for an empty table.
    pub fn resolve(&self, quality: RenderQuality) -> Option<&S> {
        let direct = match quality {
            RenderQuality::Low => self.low.as_ref(),
            RenderQuality::Medium => self.medium.as_ref(),
            RenderQuality::High => self.high.as_ref(),
        };
        direct
            .or(self.medium.as_ref())
            .or(self.low.as_ref())
            .or(self.high.as_ref())
    }
}
