// src/factory/mod.rs
//! Renderer factory: one cached instance per style, created on demand,
//! configured centrally.

pub mod cache;
pub mod configurator;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{RenderQuality, RenderStyle};
use crate::error::{EngineError, Result};
use crate::render::bars::BarsEffect;
use crate::render::bitmap::AfterglowEffect;
use crate::render::circular::RadialEffect;
use crate::render::font::MarqueeEffect;
use crate::render::grid::MatrixEffect;
use crate::render::rotating::OrbitEffect;
use crate::render::waveform::WaveEffect;
use crate::render::{EffectRenderer, SpectrumRenderer};

pub use cache::{RendererCache, SharedRenderer};
pub use configurator::DesiredConfig;

/// Cooperative cancellation handle for an in-flight creation.
///
/// Creation that observes the flag before committing to the cache fails
/// with [`EngineError::Cancelled`] and leaves no trace behind.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

type BuildFn = fn() -> Box<dyn SpectrumRenderer>;

/// Whether a global quality change is currently fanning out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropagationState {
    Idle,
    Propagating,
}

struct FactoryInner {
    cache: RendererCache,
    registry: HashMap<RenderStyle, BuildFn>,
    global_quality: RenderQuality,
    overlay_alpha: f32,
    state: PropagationState,
    disposed: bool,
}

/// Central owner of all renderer instances.
///
/// Thread safety is coarse: one lock guards creation, configuration
/// fan-out, and disposal. Render calls take the per-renderer lock only.
pub struct RendererFactory {
    inner: Mutex<FactoryInner>,
}

impl RendererFactory {
    /// Factory with every built-in style registered.
    pub fn new() -> Self {
        let mut registry: HashMap<RenderStyle, BuildFn> = HashMap::new();
        registry.insert(RenderStyle::Bars, || EffectRenderer::boxed(BarsEffect::new()));
        registry.insert(RenderStyle::Radial, || {
            EffectRenderer::boxed(RadialEffect::new())
        });
        registry.insert(RenderStyle::Wave, || EffectRenderer::boxed(WaveEffect::new()));
        registry.insert(RenderStyle::Matrix, || {
            EffectRenderer::boxed(MatrixEffect::new())
        });
        registry.insert(RenderStyle::Orbit, || {
            EffectRenderer::boxed(OrbitEffect::new())
        });
        registry.insert(RenderStyle::Afterglow, || {
            EffectRenderer::boxed(AfterglowEffect::new())
        });
        registry.insert(RenderStyle::Marquee, || {
            EffectRenderer::boxed(MarqueeEffect::new())
        });
        Self::with_registry(registry)
    }

    /// Factory with a custom registry; used by tests and embedders that
    /// bring their own styles.
    pub fn with_registry(registry: HashMap<RenderStyle, BuildFn>) -> Self {
        Self {
            inner: Mutex::new(FactoryInner {
                cache: RendererCache::new(),
                registry,
                global_quality: RenderQuality::default(),
                overlay_alpha: 0.7,
                state: PropagationState::Idle,
                disposed: false,
            }),
        }
    }

    /// Returns the renderer for `style`, building and caching it on the
    /// first request.
    ///
    /// A cached renderer is reconfigured in place when `overlay_active`
    /// or `quality` differ from what it already applied. `quality`
    /// defaults to the factory's global tier.
    pub fn create_renderer(
        &self,
        style: RenderStyle,
        overlay_active: bool,
        quality: Option<RenderQuality>,
        cancel: &CancelFlag,
    ) -> Result<SharedRenderer> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(EngineError::Disposed("renderer factory"));
        }
        let quality = quality.unwrap_or(inner.global_quality);

        if let Some(shared) = inner.cache.get(style) {
            let desired = DesiredConfig {
                overlay_active: Some(overlay_active),
                quality: Some(quality),
            };
            configurator::apply(shared.lock().as_mut(), desired);
            return Ok(shared);
        }

        // Unknown styles never enter the cache; a later registration can
        // still succeed.
        let build = *inner
            .registry
            .get(&style)
            .ok_or(EngineError::UnknownStyle(style))?;

        let mut renderer = build();
        renderer.initialize();
        renderer.configure(overlay_active, quality);
        renderer.set_overlay_alpha(inner.overlay_alpha);

        // Last cancellation check before the instance becomes visible.
        if cancel.is_cancelled() {
            debug!(%style, "renderer creation cancelled before commit");
            return Err(EngineError::Cancelled(style));
        }

        info!(%style, ?quality, overlay_active, "created renderer");
        Ok(inner.cache.insert(style, renderer))
    }

    /// Current global quality tier.
    pub fn global_quality(&self) -> RenderQuality {
        self.inner.lock().global_quality
    }

    /// Changes the global tier and fans it out to every cached renderer.
    /// Returns how many renderers actually reconfigured; an unchanged
    /// tier is a no-op.
    pub fn set_global_quality(&self, quality: RenderQuality) -> Result<usize> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(EngineError::Disposed("renderer factory"));
        }
        if inner.global_quality == quality {
            return Ok(0);
        }
        if inner.state == PropagationState::Propagating {
            warn!(?quality, "quality change ignored: propagation in progress");
            return Ok(0);
        }

        inner.state = PropagationState::Propagating;
        inner.global_quality = quality;
        let mut applied = 0;
        inner.cache.for_each(|renderer| {
            if configurator::apply(renderer, DesiredConfig::quality(quality)) {
                applied += 1;
            }
        });
        inner.state = PropagationState::Idle;
        info!(?quality, applied, "global quality propagated");
        Ok(applied)
    }

    /// Applies partial configuration to every cached renderer. `None`
    /// fields leave each renderer's current value in place.
    pub fn configure_all(
        &self,
        overlay_active: Option<bool>,
        quality: Option<RenderQuality>,
    ) -> Result<usize> {
        let inner = self.inner.lock();
        if inner.disposed {
            return Err(EngineError::Disposed("renderer factory"));
        }
        let desired = DesiredConfig {
            overlay_active,
            quality,
        };
        let mut applied = 0;
        inner.cache.for_each(|renderer| {
            if configurator::apply(renderer, desired) {
                applied += 1;
            }
        });
        Ok(applied)
    }

    /// Sets the alpha used for overlay compositing on all renderers,
    /// current and future.
    pub fn set_overlay_transparency(&self, alpha: f32) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return Err(EngineError::Disposed("renderer factory"));
        }
        let alpha = alpha.clamp(0.0, 1.0);
        inner.overlay_alpha = alpha;
        inner.cache.for_each(|renderer| {
            renderer.set_overlay_alpha(alpha);
        });
        Ok(())
    }

    /// Number of live renderer instances.
    pub fn cached_count(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// Drops every cached renderer and rejects further use. Idempotent.
    pub fn dispose(&self) {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        let dropped = inner.cache.len();
        inner.cache.clear();
        info!(dropped, "renderer factory disposed");
    }
}

impl Default for RendererFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_style_returns_singleton() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        let a = factory
            .create_renderer(RenderStyle::Bars, false, None, &cancel)
            .unwrap();
        let b = factory
            .create_renderer(RenderStyle::Bars, false, None, &cancel)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.cached_count(), 1);
    }

    #[test]
    fn unknown_style_errors_without_caching() {
        let factory = RendererFactory::with_registry(HashMap::new());
        let cancel = CancelFlag::new();
        let err = factory
            .create_renderer(RenderStyle::Wave, false, None, &cancel)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownStyle(RenderStyle::Wave)));
        assert_eq!(factory.cached_count(), 0);
    }

    #[test]
    fn cancelled_creation_leaves_no_instance() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = factory
            .create_renderer(RenderStyle::Radial, false, None, &cancel)
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled(RenderStyle::Radial)));
        assert_eq!(factory.cached_count(), 0);

        // A fresh attempt with a live flag succeeds.
        let cancel = CancelFlag::new();
        factory
            .create_renderer(RenderStyle::Radial, false, None, &cancel)
            .unwrap();
        assert_eq!(factory.cached_count(), 1);
    }

    #[test]
    fn quality_fans_out_exactly_once() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        let bars = factory
            .create_renderer(RenderStyle::Bars, false, None, &cancel)
            .unwrap();
        factory
            .create_renderer(RenderStyle::Wave, false, None, &cancel)
            .unwrap();

        assert_eq!(factory.set_global_quality(RenderQuality::High).unwrap(), 2);
        // Unchanged tier is a no-op for everyone.
        assert_eq!(factory.set_global_quality(RenderQuality::High).unwrap(), 0);
        // Creation at the default tier applied nothing; the fan-out is
        // the first real application.
        assert_eq!(bars.lock().applied_count(), 1);
        assert_eq!(
            bars.lock().applied_config().quality,
            RenderQuality::High
        );
    }

    #[test]
    fn new_renderers_pick_up_global_quality() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        factory.set_global_quality(RenderQuality::Low).unwrap();
        let wave = factory
            .create_renderer(RenderStyle::Wave, false, None, &cancel)
            .unwrap();
        assert_eq!(wave.lock().applied_config().quality, RenderQuality::Low);
    }

    #[test]
    fn explicit_quality_overrides_global() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        let orbit = factory
            .create_renderer(RenderStyle::Orbit, false, Some(RenderQuality::High), &cancel)
            .unwrap();
        assert_eq!(orbit.lock().applied_config().quality, RenderQuality::High);
    }

    #[test]
    fn dispose_rejects_further_use() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        factory
            .create_renderer(RenderStyle::Bars, false, None, &cancel)
            .unwrap();
        factory.dispose();
        factory.dispose();
        assert!(matches!(
            factory.create_renderer(RenderStyle::Bars, false, None, &cancel),
            Err(EngineError::Disposed(_))
        ));
        assert!(matches!(
            factory.set_global_quality(RenderQuality::Low),
            Err(EngineError::Disposed(_))
        ));
    }

    #[test]
    fn overlay_transparency_reaches_cached_renderers() {
        let factory = RendererFactory::new();
        let cancel = CancelFlag::new();
        let bars = factory
            .create_renderer(RenderStyle::Bars, true, None, &cancel)
            .unwrap();
        factory.set_overlay_transparency(0.25).unwrap();
        assert!((bars.lock().applied_config().overlay_alpha - 0.25).abs() < 1e-6);
    }
}
