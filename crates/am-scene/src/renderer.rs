use am_core::CoreError;
use am_core::ease::Damped;
use am_core::frame::FrameBuffer;
use glam::{Mat4, Vec2, Vec3};
use rayon::prelude::*;

use crate::camera::PerspectiveCamera;
use crate::shader::{FrameUniforms, displace_vertex, sample_fragment};

/// Per-frame fraction of the remaining distance the mesh rotation closes
/// toward the pointer target.
const ROTATION_FACTOR: f32 = 0.05;

/// A quad corner after projection: screen position plus the perspective
/// terms needed for correct UV interpolation.
#[derive(Clone, Copy)]
struct ProjectedVertex {
    screen: Vec2,
    inv_w: f32,
    uv_over_w: Vec2,
}

/// Renders one textured quad under a perspective camera.
///
/// A software stand-in for the GPU path: the vertex stage wobbles the four
/// corners, the fragment stage does the chromatic texture sampling, and a
/// row-parallel rasterizer fills the render target. The quad and texture
/// are built once; `resize` only touches the camera aspect and the target.
#[derive(Debug)]
pub struct SceneRenderer {
    camera: PerspectiveCamera,
    texture: FrameBuffer,
    quad_half_w: f32,
    quad_half_h: f32,
    rotation_x: Damped,
    rotation_y: Damped,
    waves_enabled: f32,
    target: FrameBuffer,
}

impl SceneRenderer {
    /// Build the scene: one single-segment quad whose width preserves the
    /// texture aspect ratio against `plane_base_height`.
    ///
    /// # Errors
    /// `ContextUnavailable` if the render target cannot be created
    /// (zero-sized container). No software fallback below this one.
    pub fn new(
        plane_base_height: f32,
        texture_aspect: f32,
        width: u32,
        height: u32,
        enable_waves: bool,
    ) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::ContextUnavailable { width, height });
        }
        let quad_h = plane_base_height;
        let quad_w = plane_base_height * texture_aspect.max(f32::EPSILON);
        Ok(Self {
            camera: PerspectiveCamera::new(width as f32 / height as f32),
            texture: FrameBuffer::new(2, 2),
            quad_half_w: quad_w / 2.0,
            quad_half_h: quad_h / 2.0,
            rotation_x: Damped::new(0.0, ROTATION_FACTOR),
            rotation_y: Damped::new(0.0, ROTATION_FACTOR),
            waves_enabled: if enable_waves { 1.0 } else { 0.0 },
            target: FrameBuffer::new(width, height),
        })
    }

    /// Upload the current raster into the scene texture.
    ///
    /// Runs at construction and on every scene rebuild; same-size uploads
    /// reuse the existing allocation.
    pub fn upload_texture(&mut self, pixels: &FrameBuffer) {
        if self.texture.width == pixels.width && self.texture.height == pixels.height {
            self.texture.data.copy_from_slice(&pixels.data);
        } else {
            self.texture = pixels.clone();
        }
    }

    /// Cheap resize path: camera aspect and render target only. The quad,
    /// the texture, and the smoothed rotation state are untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("resize to {width}×{height} ignored, not ready");
            return;
        }
        self.camera.set_aspect(width as f32 / height as f32);
        if self.target.width != width || self.target.height != height {
            self.target = FrameBuffer::new(width, height);
        }
    }

    /// Toggle the vertex wobble. Uniform change only, no rebuild.
    pub fn set_waves(&mut self, enabled: bool) {
        self.waves_enabled = if enabled { 1.0 } else { 0.0 };
    }

    /// Render target dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.target.width, self.target.height)
    }

    /// The last rendered frame.
    #[must_use]
    pub fn target(&self) -> &FrameBuffer {
        &self.target
    }

    /// Current smoothed rotation (x, y) in radians.
    #[must_use]
    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation_x.value(), self.rotation_y.value())
    }

    /// Draw one frame.
    ///
    /// `elapsed_secs` is wall-clock time since the instance started;
    /// `pointer_norm` is the pointer position normalized to [0, 1] within
    /// the container. The time uniform advances as `sin(t × 0.5)` and the
    /// rotation exponentially approaches the pointer-derived target.
    pub fn render_frame(&mut self, elapsed_secs: f32, pointer_norm: Vec2) -> &FrameBuffer {
        let uniforms = FrameUniforms {
            time: (elapsed_secs * 0.5).sin(),
            pointer_influence: 1.0,
            waves_enabled: self.waves_enabled,
        };

        // Pointer at the top of the container tilts the mesh up, at the
        // left turns it left: targets span ±0.5 around the center.
        let rx = self.rotation_x.step(0.5 - pointer_norm.y.clamp(0.0, 1.0));
        let ry = self.rotation_y.step(pointer_norm.x.clamp(0.0, 1.0) - 0.5);

        let model = Mat4::from_rotation_y(ry) * Mat4::from_rotation_x(rx);
        let mvp = self.camera.view_projection() * model;

        self.target.clear();

        let (hw, hh) = (self.quad_half_w, self.quad_half_h);
        let corners = [
            (Vec3::new(-hw, hh, 0.0), Vec2::new(0.0, 0.0)),
            (Vec3::new(hw, hh, 0.0), Vec2::new(1.0, 0.0)),
            (Vec3::new(-hw, -hh, 0.0), Vec2::new(0.0, 1.0)),
            (Vec3::new(hw, -hh, 0.0), Vec2::new(1.0, 1.0)),
        ];

        let mut projected = [ProjectedVertex {
            screen: Vec2::ZERO,
            inv_w: 0.0,
            uv_over_w: Vec2::ZERO,
        }; 4];
        let (tw, th) = (self.target.width as f32, self.target.height as f32);
        for (slot, (position, uv)) in projected.iter_mut().zip(corners) {
            let displaced = displace_vertex(position, uniforms.time, uniforms.waves_enabled);
            let clip = mvp * displaced.extend(1.0);
            if clip.w <= 0.1 {
                // Behind the camera; cannot happen at z = 30 but a frame
                // is cheaper to skip than to clip.
                return &self.target;
            }
            let ndc = clip.truncate() / clip.w;
            slot.screen = Vec2::new((ndc.x * 0.5 + 0.5) * tw, (0.5 - ndc.y * 0.5) * th);
            slot.inv_w = 1.0 / clip.w;
            slot.uv_over_w = uv / clip.w;
        }

        // Two triangles covering the quad; double-sided, so winding is
        // handled by the signed-area division in the barycentrics.
        let triangles = [
            [projected[0], projected[2], projected[1]],
            [projected[1], projected[2], projected[3]],
        ];

        let texture = &self.texture;
        let width = self.target.width;
        let stride = (width * 4) as usize;
        self.target
            .data
            .par_chunks_exact_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f32 + 0.5;
                for tri in &triangles {
                    rasterize_row(row, py, width, tri, texture, &uniforms);
                }
            });

        &self.target
    }
}

#[inline(always)]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Fill one target row for one triangle: inside test via barycentrics,
/// perspective-correct UV, fragment sample, RGBA write.
fn rasterize_row(
    row: &mut [u8],
    py: f32,
    width: u32,
    tri: &[ProjectedVertex; 3],
    texture: &FrameBuffer,
    uniforms: &FrameUniforms,
) {
    let [v0, v1, v2] = *tri;
    let area = edge(v0.screen, v1.screen, v2.screen);
    if area.abs() < 1e-6 {
        return;
    }

    let min_y = v0.screen.y.min(v1.screen.y).min(v2.screen.y);
    let max_y = v0.screen.y.max(v1.screen.y).max(v2.screen.y);
    if py < min_y || py > max_y {
        return;
    }

    let min_x = v0.screen.x.min(v1.screen.x).min(v2.screen.x).floor().max(0.0) as u32;
    let max_x = (v0.screen.x.max(v1.screen.x).max(v2.screen.x).ceil() as u32).min(width);

    for x in min_x..max_x {
        let p = Vec2::new(x as f32 + 0.5, py);
        let b0 = edge(v1.screen, v2.screen, p) / area;
        let b1 = edge(v2.screen, v0.screen, p) / area;
        let b2 = edge(v0.screen, v1.screen, p) / area;
        if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
            continue;
        }

        let inv_w = b0 * v0.inv_w + b1 * v1.inv_w + b2 * v2.inv_w;
        if inv_w <= 0.0 {
            continue;
        }
        let uv = (b0 * v0.uv_over_w + b1 * v1.uv_over_w + b2 * v2.uv_over_w) / inv_w;

        let (r, g, b, a) = sample_fragment(texture, uv, uniforms);
        let idx = (x * 4) as usize;
        row[idx] = r;
        row[idx + 1] = g;
        row[idx + 2] = b;
        row[idx + 3] = a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_texture(w: u32, h: u32) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, h);
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[255, 255, 255, 255]);
        }
        fb
    }

    #[test]
    fn zero_sized_target_is_context_unavailable() {
        let err = SceneRenderer::new(8.0, 2.0, 0, 100, true).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ContextUnavailable {
                width: 0,
                height: 100
            }
        ));
    }

    #[test]
    fn centered_pointer_renders_quad_in_view() {
        let mut scene = SceneRenderer::new(8.0, 2.0, 64, 32, false).expect("scene");
        scene.upload_texture(&white_texture(8, 8));
        let frame = scene.render_frame(0.0, Vec2::new(0.5, 0.5));
        let (_, _, _, a) = frame.pixel(32, 16);
        assert_eq!(a, 255, "quad center should cover the target center");
        assert_eq!(frame.pixel(0, 0).3, 0, "corners stay transparent");
    }

    #[test]
    fn transparent_texture_renders_transparent_frame() {
        let mut scene = SceneRenderer::new(8.0, 2.0, 32, 32, true).expect("scene");
        scene.upload_texture(&FrameBuffer::new(8, 8));
        let frame = scene.render_frame(1.0, Vec2::new(0.5, 0.5));
        assert!(frame.data.chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn rotation_approaches_pointer_target_without_overshoot() {
        let mut scene = SceneRenderer::new(8.0, 1.0, 32, 32, false).expect("scene");
        scene.upload_texture(&white_texture(4, 4));
        // Pointer pinned to the top-left corner: targets (0.5, -0.5).
        let mut prev = scene.rotation();
        for _ in 0..400 {
            scene.render_frame(0.0, Vec2::new(0.0, 0.0));
            let (rx, ry) = scene.rotation();
            assert!(rx >= prev.0 && rx <= 0.5 + f32::EPSILON);
            assert!(ry <= prev.1 && ry >= -0.5 - f32::EPSILON);
            prev = (rx, ry);
        }
        assert!((prev.0 - 0.5).abs() < 1e-3);
        assert!((prev.1 + 0.5).abs() < 1e-3);
    }

    #[test]
    fn resize_updates_target_but_not_texture() {
        let mut scene = SceneRenderer::new(8.0, 2.0, 64, 32, true).expect("scene");
        scene.upload_texture(&white_texture(8, 8));
        scene.resize(128, 64);
        assert_eq!(scene.size(), (128, 64));
        assert_eq!(scene.texture.width, 8);
        scene.resize(0, 0); // Not ready yet, keep previous target.
        assert_eq!(scene.size(), (128, 64));
    }
}
