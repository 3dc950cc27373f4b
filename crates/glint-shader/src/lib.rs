//! Glint Shader - shader compilation, hot-reload, and GPU data packing
//!
//! This crate is the shader-management core of the engine. It resolves
//! `#include` directives in GLSL source, compiles and links stage sources
//! into GPU programs through the `GlDevice` abstraction, snapshots source
//! file mtimes so the host's poll loop can drive hot-reload, packs scene
//! lighting into fixed-capacity uniform arrays, and owns per-mesh
//! vertex/index buffer sets.
//!
//! Everything runs synchronously on the render thread against a single
//! current graphics context; there is no internal concurrency.

mod fallback;
mod glsl;
mod lights;
mod mesh;
mod preprocessor;
mod program;
mod properties;
mod shader;
mod watch;

pub use fallback::FallbackShader;
pub use glsl::{GlslShader, ShaderConfig};
pub use lights::{LightData, LightRecord, PackedLights, MAX_ADDITIONAL_LIGHTS};
pub use mesh::VertexBufferSet;
pub use preprocessor::Preprocessor;
pub use program::{compile_program, CompiledProgram};
pub use properties::{ShaderProperties, ShaderProperty};
pub use shader::Shader;
pub use watch::MonitoredFiles;
