//! The capability set every shader format implements
//!
//! Different shader abstraction formats (direct GLSL files, a node graph
//! compiled down to GLSL, ...) all expose this one surface, so the render
//! loop can drive any of them through `Box<dyn Shader>` without changes.

use crate::lights::LightData;
use crate::mesh::VertexBufferSet;
use crate::properties::ShaderProperties;
use glam::Mat4;
use glint_core::{PropertyGroup, Result};

pub trait Shader {
    /// Renderer-scope schema (global per-engine settings)
    fn renderer_properties(&self) -> &ShaderProperties;

    /// Material-scope schema (per-material settings)
    fn material_properties(&self) -> &ShaderProperties;

    /// Snapshot renderer settings and validate the stage configuration.
    /// Fails before any compilation work if a mandatory stage is missing.
    fn update_renderer_properties(&mut self, settings: &dyn PropertyGroup) -> Result<()>;

    fn update_material_properties(&mut self, settings: &dyn PropertyGroup) -> Result<()>;

    /// Re-resolve all stage sources and build a fresh program. On failure
    /// the previously linked program stays valid and bindable.
    fn recompile(&mut self) -> Result<()>;

    /// Has any source file changed since the last successful compile?
    /// The host's poll loop calls this; the core never polls on its own.
    fn mtimes_changed(&self) -> bool;

    fn bind(&self);
    fn unbind(&self);

    fn set_camera_matrices(&mut self, view: Mat4, projection: Mat4);
    fn set_object_matrices(&mut self, model: Mat4);
    fn set_lights(&mut self, lights: &LightData);

    /// Allocate a buffer set for one mesh; the caller owns it exclusively
    fn create_vertex_data(&self) -> VertexBufferSet;

    /// Upload (or re-upload) a mesh's data before drawing it
    fn upload_vertex_data(&self, data: &mut VertexBufferSet);
}
