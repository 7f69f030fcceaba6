use am_core::frame::FrameBuffer;
use glam::{Vec2, Vec3};

/// Per-frame shader parameters, passed by value into the render step.
///
/// One immutable bag instead of scattered mutable uniforms: the raster,
/// scene, and compositor all see the same frame state.
#[derive(Clone, Copy, Debug)]
pub struct FrameUniforms {
    /// Damped time progression (`sin(elapsed × 0.5)`), not raw elapsed
    /// time, so low frame rates do not produce visible jumps.
    pub time: f32,
    /// Pointer influence scalar fed into the fragment offsets.
    pub pointer_influence: f32,
    /// 1.0 when the vertex wobble is enabled, 0.0 otherwise. Scaling by a
    /// flag keeps the toggle free of any pipeline rebuild.
    pub waves_enabled: f32,
}

/// Vertex stage: displace a vertex along x/y/z by sinusoidal functions of
/// time and the vertex's own position, scaled by the waves flag.
///
/// # Example
/// ```
/// use am_scene::shader::displace_vertex;
/// use glam::Vec3;
/// let p = Vec3::new(1.0, 2.0, 0.0);
/// // Waves disabled: identity.
/// assert_eq!(displace_vertex(p, 3.0, 0.0), p);
/// ```
#[inline(always)]
#[must_use]
pub fn displace_vertex(position: Vec3, time: f32, waves_enabled: f32) -> Vec3 {
    let t = time * 5.0;
    Vec3::new(
        position.x + (t + position.y).sin() * 0.5 * waves_enabled,
        position.y + (t + position.z).cos() * 0.15 * waves_enabled,
        position.z + (t + position.x).sin() * waves_enabled,
    )
}

/// Fragment stage: sample the texture three times with small independent
/// per-channel offsets driven by time and the pointer scalar, producing a
/// chromatic shimmer. Alpha is sampled unperturbed so transparency edges
/// stay crisp.
#[inline(always)]
#[must_use]
pub fn sample_fragment(texture: &FrameBuffer, uv: Vec2, uniforms: &FrameUniforms) -> (u8, u8, u8, u8) {
    let t = uniforms.time;
    let m = uniforms.pointer_influence;

    let r_shift = (t + uv.x + m).cos() * 0.01;
    // tan is unbounded near its poles; clamp keeps the shift small.
    let g_shift = (uv.x - t * 0.5 + m).tan().clamp(-1.0, 1.0) * 0.01;
    let b_shift = -(t * 3.0 + uv.y + m).cos() * 0.01;

    let (r, _, _, _) = sample_bilinear(texture, uv + Vec2::splat(r_shift));
    let (_, g, _, _) = sample_bilinear(texture, uv + Vec2::splat(g_shift));
    let (_, _, b, _) = sample_bilinear(texture, uv + Vec2::splat(b_shift));
    let (_, _, _, a) = sample_bilinear(texture, uv);
    (r, g, b, a)
}

/// Bilinear texture sample with clamp-to-edge addressing.
///
/// uv (0,0) is the top-left texel, (1,1) the bottom-right.
#[inline(always)]
#[must_use]
pub fn sample_bilinear(texture: &FrameBuffer, uv: Vec2) -> (u8, u8, u8, u8) {
    if texture.width == 0 || texture.height == 0 {
        return (0, 0, 0, 0);
    }
    let max_x = (texture.width - 1) as f32;
    let max_y = (texture.height - 1) as f32;
    let x = (uv.x.clamp(0.0, 1.0) * max_x).clamp(0.0, max_x);
    let y = (uv.y.clamp(0.0, 1.0) * max_y).clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(texture.width - 1);
    let y1 = (y0 + 1).min(texture.height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = texture.pixel(x0, y0);
    let p10 = texture.pixel(x1, y0);
    let p01 = texture.pixel(x0, y1);
    let p11 = texture.pixel(x1, y1);

    let lerp2 = |c00: u8, c10: u8, c01: u8, c11: u8| -> u8 {
        let top = f32::from(c00) * (1.0 - fx) + f32::from(c10) * fx;
        let bottom = f32::from(c01) * (1.0 - fx) + f32::from(c11) * fx;
        (top * (1.0 - fy) + bottom * fy) as u8
    };

    (
        lerp2(p00.0, p10.0, p01.0, p11.0),
        lerp2(p00.1, p10.1, p01.1, p11.1),
        lerp2(p00.2, p10.2, p01.2, p11.2),
        lerp2(p00.3, p10.3, p01.3, p11.3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: (u8, u8, u8, u8)) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                fb.set_pixel(x, y, rgba);
            }
        }
        fb
    }

    #[test]
    fn waves_flag_zero_is_identity() {
        let p = Vec3::new(-3.2, 4.0, 0.5);
        assert_eq!(displace_vertex(p, 123.4, 0.0), p);
    }

    #[test]
    fn waves_displacement_is_bounded() {
        for i in 0..100 {
            let t = i as f32 * 0.37;
            let p = Vec3::new(1.0, -2.0, 0.0);
            let d = displace_vertex(p, t, 1.0);
            assert!((d.x - p.x).abs() <= 0.5 + 1e-6);
            assert!((d.y - p.y).abs() <= 0.15 + 1e-6);
            assert!((d.z - p.z).abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn bilinear_sampling_clamps_to_edge() {
        let tex = solid(4, 4, (10, 20, 30, 255));
        assert_eq!(sample_bilinear(&tex, Vec2::new(-5.0, 9.0)), (10, 20, 30, 255));
    }

    #[test]
    fn fragment_alpha_matches_unperturbed_sample_on_solid_texture() {
        let tex = solid(8, 8, (200, 100, 50, 255));
        let uniforms = FrameUniforms {
            time: 0.7,
            pointer_influence: 1.0,
            waves_enabled: 1.0,
        };
        let (_, _, _, a) = sample_fragment(&tex, Vec2::new(0.5, 0.5), &uniforms);
        assert_eq!(a, 255);
    }

    #[test]
    fn zero_size_texture_samples_transparent() {
        let tex = FrameBuffer::new(0, 0);
        assert_eq!(sample_bilinear(&tex, Vec2::new(0.5, 0.5)), (0, 0, 0, 0));
    }
}
