//! The GL-style device operations consumed by the shader core

use std::fmt;

/// One unit of shader source corresponding to a pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEval,
    Geometry,
    Fragment,
}

impl ShaderStage {
    /// All stages, in pipeline order
    pub const ALL: [ShaderStage; 5] = [
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEval,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    /// Display name used in compile diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex",
            ShaderStage::TessControl => "Tessellation Control",
            ShaderStage::TessEval => "Tessellation Evaluation",
            ShaderStage::Geometry => "Geometry",
            ShaderStage::Fragment => "Fragment",
        }
    }

    /// Vertex and fragment stages are mandatory; everything else is optional
    pub fn is_required(&self) -> bool {
        matches!(self, ShaderStage::Vertex | ShaderStage::Fragment)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding target for data buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Array,
    /// Triangle indices
    ElementArray,
}

/// Upload frequency hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

/// Opaque handle to a shader-stage object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Opaque handle to a linked program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Opaque handle to a data or index buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Opaque handle to a vertex-array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

/// Driver-resolved uniform slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Driver-resolved vertex attribute slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub i32);

/// The GPU driver capability the core calls into.
///
/// The core assumes a single current graphics context and is never invoked
/// concurrently, so implementations need no internal locking. Compile and
/// link report failure as `Err(diagnostic)` with the driver's info log.
pub trait GlDevice {
    fn create_shader(&self, stage: ShaderStage) -> ShaderId;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId) -> Result<(), String>;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> ProgramId;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId) -> Result<(), String>;
    fn delete_program(&self, program: ProgramId);
    /// `None` unbinds the current program
    fn use_program(&self, program: Option<ProgramId>);

    /// `None` when the name does not resolve to an active uniform
    /// (commonly because the driver optimized it out)
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation>;

    fn set_uniform_int(&self, location: UniformLocation, value: i32);
    fn set_uniform_float(&self, location: UniformLocation, value: f32);
    fn set_uniform_vec3(&self, location: UniformLocation, value: [f32; 3]);
    fn set_uniform_vec4(&self, location: UniformLocation, value: [f32; 4]);
    /// Column-major, the storage order the graphics API expects
    fn set_uniform_mat4(&self, location: UniformLocation, value: &[f32; 16]);
    fn set_uniform_vec3_array(&self, location: UniformLocation, values: &[f32]);
    fn set_uniform_vec4_array(&self, location: UniformLocation, values: &[f32]);

    fn create_vertex_array(&self) -> VertexArrayId;
    fn bind_vertex_array(&self, vao: Option<VertexArrayId>);
    fn delete_vertex_array(&self, vao: VertexArrayId);

    fn create_buffer(&self) -> BufferId;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    /// Uploads into whichever buffer is currently bound to `target`
    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32], usage: BufferUsage);
    fn buffer_data_u32(&self, target: BufferTarget, data: &[u32], usage: BufferUsage);
    fn delete_buffer(&self, buffer: BufferId);

    /// Enable an attribute array and configure its pointer for
    /// `BufferTarget::Array` reads
    fn enable_vertex_attribute(&self, location: AttribLocation, components: u32, stride: u32);
}
