/// 3D scene: one textured quad, wobbled by a vertex stage and sampled with
/// per-channel chromatic offsets by a fragment stage, drawn by a software
/// rasterizer under a perspective camera.

pub mod camera;
pub mod renderer;
pub mod shader;

pub use camera::PerspectiveCamera;
pub use renderer::SceneRenderer;
pub use shader::FrameUniforms;
