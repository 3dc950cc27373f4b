//! Glint GPU - the device interface the shader core drives
//!
//! The core compiles programs, sets uniforms, and uploads vertex buffers
//! through the `GlDevice` trait; the host supplies the concrete driver
//! binding. `MockDevice` is a call-recording implementation used by tests
//! and examples.

mod device;
mod mock;

pub use device::{
    AttribLocation, BufferId, BufferTarget, BufferUsage, GlDevice, ProgramId, ShaderId,
    ShaderStage, UniformLocation, VertexArrayId,
};
pub use mock::{MockDevice, UniformValue};
