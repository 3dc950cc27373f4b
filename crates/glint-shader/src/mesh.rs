//! Per-mesh GPU buffer management
//!
//! Each mesh/shader pairing owns one `VertexBufferSet` exclusively; the
//! handles are never shared across shaders. Uploads unbind everything
//! before returning so bad code elsewhere can't scribble on this VAO.

use crate::program::CompiledProgram;
use glint_gpu::{BufferId, BufferTarget, BufferUsage, GlDevice, VertexArrayId};
use std::rc::Rc;

/// One vertex-array object, position and normal buffers, and an index
/// buffer for a single mesh. All four GPU objects are deleted on drop.
pub struct VertexBufferSet {
    device: Rc<dyn GlDevice>,
    vao: VertexArrayId,
    position_buffer: BufferId,
    normal_buffer: BufferId,
    index_buffer: BufferId,
    /// Flattened xyz positions
    pub positions: Vec<f32>,
    /// Flattened xyz normals, parallel to `positions`
    pub normals: Vec<f32>,
    /// Triangle indices
    pub indices: Vec<u32>,
    index_count: usize,
}

impl VertexBufferSet {
    pub fn new(device: Rc<dyn GlDevice>) -> Self {
        let vao = device.create_vertex_array();
        let position_buffer = device.create_buffer();
        let normal_buffer = device.create_buffer();
        let index_buffer = device.create_buffer();
        Self {
            device,
            vao,
            position_buffer,
            normal_buffer,
            index_buffer,
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            index_count: 0,
        }
    }

    /// Index count recorded at the last upload, for draw-call sizing
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Upload the CPU-side arrays into the GPU buffers and wire the
    /// "Position" and "Normal" attributes of `program` to them.
    pub fn upload(&mut self, program: &CompiledProgram) {
        let device = self.device.as_ref();
        device.bind_vertex_array(Some(self.vao));

        device.bind_buffer(BufferTarget::Array, Some(self.position_buffer));
        device.buffer_data_f32(BufferTarget::Array, &self.positions, BufferUsage::StaticDraw);
        program.set_vertex_attribute("Position", 3, 0);

        device.bind_buffer(BufferTarget::Array, Some(self.normal_buffer));
        device.buffer_data_f32(BufferTarget::Array, &self.normals, BufferUsage::StaticDraw);
        program.set_vertex_attribute("Normal", 3, 0);

        device.bind_buffer(BufferTarget::ElementArray, Some(self.index_buffer));
        device.buffer_data_u32(BufferTarget::ElementArray, &self.indices, BufferUsage::StaticDraw);

        device.bind_vertex_array(None);
        device.bind_buffer(BufferTarget::ElementArray, None);
        device.bind_buffer(BufferTarget::Array, None);

        self.index_count = self.indices.len();
    }
}

impl Drop for VertexBufferSet {
    fn drop(&mut self) {
        self.device.delete_buffer(self.position_buffer);
        self.device.delete_buffer(self.normal_buffer);
        self.device.delete_buffer(self.index_buffer);
        self.device.delete_vertex_array(self.vao);
    }
}
