// src/factory/configurator.rs
//! Change-gated application of overlay/quality state to renderers.

use tracing::debug;

use crate::config::RenderQuality;
use crate::render::SpectrumRenderer;

/// Desired configuration; `None` fields leave the current value alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesiredConfig {
    pub overlay_active: Option<bool>,
    pub quality: Option<RenderQuality>,
}

impl DesiredConfig {
    pub fn quality(quality: RenderQuality) -> Self {
        Self {
            overlay_active: None,
            quality: Some(quality),
        }
    }

    pub fn overlay(overlay_active: bool) -> Self {
        Self {
            overlay_active: Some(overlay_active),
            quality: None,
        }
    }
}

/// Applies `desired` to `renderer` only if it differs from what the
/// renderer already has. Returns whether a configure call was issued.
///
/// Skipping the no-change case matters: a configure call resets the
/// renderer's smoothing state, which reads as a visual hitch.
pub fn apply(renderer: &mut dyn SpectrumRenderer, desired: DesiredConfig) -> bool {
    let current = renderer.applied_config();
    let overlay = desired.overlay_active.unwrap_or(current.overlay_active);
    let quality = desired.quality.unwrap_or(current.quality);

    if overlay == current.overlay_active && quality == current.quality {
        return false;
    }
    debug!(
        style = %renderer.style(),
        overlay,
        ?quality,
        "applying renderer configuration"
    );
    renderer.configure(overlay, quality);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EffectRenderer;
    use crate::render::bars::BarsEffect;

    #[test]
    fn unchanged_config_is_not_reapplied() {
        let mut renderer = EffectRenderer::new(BarsEffect::new());
        assert!(apply(&mut renderer, DesiredConfig::quality(RenderQuality::High)));
        assert!(!apply(&mut renderer, DesiredConfig::quality(RenderQuality::High)));
        assert_eq!(renderer.applied_count(), 1);
    }

    #[test]
    fn none_fields_keep_current_values() {
        let mut renderer = EffectRenderer::new(BarsEffect::new());
        apply(&mut renderer, DesiredConfig::overlay(true));
        let before = renderer.applied_config();

        // Quality-only update must not disturb the overlay flag.
        apply(&mut renderer, DesiredConfig::quality(RenderQuality::Low));
        let after = renderer.applied_config();
        assert_eq!(after.overlay_active, before.overlay_active);
        assert_eq!(after.quality, RenderQuality::Low);
    }
}
