use am_ascii::compositor::CaptureOutcome;
use am_ascii::AsciiCompositor;
use am_core::color::parse_hex;
use am_core::config::EffectConfig;
use am_core::CoreError;
use am_raster::font::resolve_font;
use am_raster::text::TextRaster;
use am_scene::SceneRenderer;
use glam::Vec2;

/// Callback invoked once, when the effect first becomes operational.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// The scene and compositor built for one concrete surface size. Dropped
/// and rebuilt whenever a config change invalidates the texture or the
/// quad geometry.
struct Instance {
    scene: SceneRenderer,
    compositor: AsciiCompositor,
}

/// Owns the full effect lifecycle: font and raster setup, deferred scene
/// construction, pointer state, config swaps, and idempotent teardown.
///
/// Construction rasterizes the text but builds no scene; the scene appears
/// on the first `set_surface` with a usable size. Frame pacing lives in the
/// caller — `tick` takes elapsed time so the loop (and the tests) control
/// the clock.
pub struct Orchestrator {
    config: EffectConfig,
    raster: TextRaster,
    instance: Option<Instance>,
    pointer_px: Option<Vec2>,
    surface: (f32, f32),
    running: bool,
    disposed: bool,
    on_ready: Option<ReadyCallback>,
}

impl Orchestrator {
    /// Resolve a font, rasterize the configured text, and return an
    /// orchestrator waiting for a surface.
    ///
    /// # Errors
    /// `FontUnavailable` if neither the configured font path nor any
    /// platform default can be loaded.
    pub fn new(config: EffectConfig, on_ready: Option<ReadyCallback>) -> Result<Self, CoreError> {
        let font = resolve_font(config.font_path.as_deref())?;
        let mut raster = TextRaster::new(font);
        let color = parse_hex(&config.text_color).unwrap_or((255, 255, 255));
        raster.configure(&config.text, config.text_font_size, color);
        raster.paint();

        Ok(Self {
            config,
            raster,
            instance: None,
            pointer_px: None,
            surface: (0.0, 0.0),
            running: false,
            disposed: false,
            on_ready,
        })
    }

    /// Attach or resize the effect surface (in pixels).
    ///
    /// A zero-sized surface means "not ready yet": the call is remembered
    /// but nothing is built or torn down. The first usable size constructs
    /// the scene and fires the ready callback; later sizes take the cheap
    /// resize path.
    ///
    /// # Errors
    /// `ContextUnavailable` if the render target cannot be created.
    pub fn set_surface(&mut self, width: f32, height: f32) -> Result<(), CoreError> {
        if self.disposed {
            return Ok(());
        }
        self.surface = (width, height);
        if width < 1.0 || height < 1.0 {
            log::debug!("surface {width}×{height} not usable yet");
            return Ok(());
        }

        if let Some(inst) = self.instance.as_mut() {
            inst.scene.resize(width as u32, height as u32);
            inst.compositor.set_size(width, height);
            return Ok(());
        }

        let mut scene = SceneRenderer::new(
            self.config.plane_base_height,
            self.raster.aspect(),
            width as u32,
            height as u32,
            self.config.enable_waves,
        )?;
        scene.upload_texture(&self.raster.surface().pixels);

        let mut compositor =
            AsciiCompositor::new(self.config.ascii_font_size, &self.config.ramp, self.config.invert);
        compositor.set_size(width, height);

        self.instance = Some(Instance { scene, compositor });
        log::info!("effect surface attached at {width}×{height}");
        if let Some(ready) = self.on_ready.take() {
            ready();
        }
        Ok(())
    }

    /// Begin producing frames. Safe to call repeatedly.
    pub fn start(&mut self) {
        if !self.disposed {
            self.running = true;
        }
    }

    /// Pause frame production. State (rotation, hue, validity) is kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Record a pointer position in surface pixels. Last value wins; the
    /// render loop consumes whatever is current at frame time.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if !self.disposed {
            self.pointer_px = Some(Vec2::new(x, y));
        }
    }

    /// Advance one frame. Returns true when the glyph grid was rebuilt.
    ///
    /// No-op while stopped, disposed, or without a surface. A pointer that
    /// has never moved counts as resting at the surface center.
    pub fn tick(&mut self, elapsed_secs: f32) -> bool {
        if self.disposed || !self.running {
            return false;
        }
        let Some(inst) = self.instance.as_mut() else {
            return false;
        };
        let pointer = self
            .pointer_px
            .unwrap_or_else(|| Vec2::new(self.surface.0 / 2.0, self.surface.1 / 2.0));
        inst.compositor.capture_frame(&mut inst.scene, elapsed_secs, pointer)
            == CaptureOutcome::Updated
    }

    /// Swap in a new configuration.
    ///
    /// Texture- and geometry-affecting changes (text, font size, color,
    /// plane height) rebuild the scene from scratch, which restarts the
    /// warm-up gating. Everything else is applied in place.
    ///
    /// # Errors
    /// `ContextUnavailable` if the rebuilt render target cannot be created.
    pub fn apply_config(&mut self, new: EffectConfig) -> Result<(), CoreError> {
        if self.disposed {
            return Ok(());
        }
        let rebuild = self.config.needs_rebuild(&new);
        self.config = new;

        if rebuild {
            let color = parse_hex(&self.config.text_color).unwrap_or((255, 255, 255));
            self.raster
                .configure(&self.config.text, self.config.text_font_size, color);
            self.raster.paint();
            self.instance = None;
            let (w, h) = self.surface;
            self.set_surface(w, h)?;
        } else if let Some(inst) = self.instance.as_mut() {
            inst.scene.set_waves(self.config.enable_waves);
            inst.compositor.set_invert(self.config.invert);
            inst.compositor.set_ramp(&self.config.ramp);
            inst.compositor.set_font_size(self.config.ascii_font_size);
        }
        Ok(())
    }

    /// Tear down the effect. Idempotent; every later call on this
    /// orchestrator is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.running = false;
        self.instance = None;
        log::info!("effect disposed");
    }

    /// The active compositor, if a surface is attached.
    #[must_use]
    pub fn compositor(&self) -> Option<&AsciiCompositor> {
        self.instance.as_ref().map(|i| &i.compositor)
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// True while producing frames.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True after `dispose`.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_ascii::Stage;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // All tests need a platform font; skip quietly on bare systems.
    fn try_orchestrator(counter: &Arc<AtomicUsize>) -> Option<Orchestrator> {
        if resolve_font(None).is_err() {
            return None;
        }
        let counter = Arc::clone(counter);
        let ready: ReadyCallback = Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        Orchestrator::new(EffectConfig::default(), Some(ready)).ok()
    }

    #[test]
    fn ready_fires_once_on_first_usable_surface() {
        let fired = Arc::new(AtomicUsize::new(0));
        let Some(mut orch) = try_orchestrator(&fired) else {
            return;
        };
        orch.set_surface(0.0, 480.0).expect("zero size is deferred");
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(orch.compositor().is_none());

        orch.set_surface(320.0, 200.0).expect("surface");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(orch.compositor().is_some());

        // Resizes and rebuilds never re-fire.
        orch.set_surface(640.0, 400.0).expect("resize");
        let mut config = orch.config().clone();
        config.text = "Other".into();
        orch.apply_config(config).expect("rebuild");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tick_is_gated_on_start_and_surface() {
        let fired = Arc::new(AtomicUsize::new(0));
        let Some(mut orch) = try_orchestrator(&fired) else {
            return;
        };
        assert!(!orch.tick(0.0), "no surface, not started");
        orch.set_surface(320.0, 200.0).expect("surface");
        assert!(!orch.tick(0.0), "not started");

        orch.start();
        // Warm-up: rendered but not captured.
        for i in 0..4 {
            assert!(!orch.tick(i as f32 / 60.0), "warm-up frame {i}");
        }
        // Past warm-up the compositor is sampling; whether a frame updates
        // the grid then depends on the content heuristic alone.
        orch.tick(4.0 / 60.0);
        assert!(
            matches!(
                orch.compositor().map(AsciiCompositor::stage),
                Some(Stage::Sampling | Stage::Visible)
            ),
            "warm-up must be over after five frames"
        );

        orch.stop();
        assert!(!orch.tick(5.0 / 60.0));
    }

    #[test]
    fn rebuild_restarts_warmup_but_cheap_changes_do_not() {
        let fired = Arc::new(AtomicUsize::new(0));
        let Some(mut orch) = try_orchestrator(&fired) else {
            return;
        };
        orch.set_surface(320.0, 200.0).expect("surface");
        orch.start();
        for i in 0..10 {
            orch.tick(i as f32 / 60.0);
        }
        let stage_before = orch.compositor().map(AsciiCompositor::stage);
        assert_ne!(stage_before, Some(Stage::Uninitialized));

        let mut cheap = orch.config().clone();
        cheap.enable_waves = !cheap.enable_waves;
        cheap.invert = !cheap.invert;
        orch.apply_config(cheap).expect("cheap path");
        assert_eq!(orch.compositor().map(AsciiCompositor::stage), stage_before);

        let mut rebuild = orch.config().clone();
        rebuild.text = "Fresh".into();
        orch.apply_config(rebuild).expect("rebuild path");
        assert_eq!(
            orch.compositor().map(AsciiCompositor::stage),
            Some(Stage::Uninitialized),
            "texture change starts a fresh warm-up"
        );
    }

    #[test]
    fn dispose_is_idempotent_and_final() {
        let fired = Arc::new(AtomicUsize::new(0));
        let Some(mut orch) = try_orchestrator(&fired) else {
            return;
        };
        orch.set_surface(320.0, 200.0).expect("surface");
        orch.start();
        orch.dispose();
        orch.dispose();
        assert!(orch.is_disposed());
        assert!(orch.compositor().is_none());
        assert!(!orch.tick(1.0));

        // Post-dispose calls are absorbed.
        orch.pointer_moved(10.0, 10.0);
        orch.start();
        assert!(!orch.is_running());
        orch.set_surface(320.0, 200.0).expect("absorbed");
        assert!(orch.compositor().is_none());
    }
}
