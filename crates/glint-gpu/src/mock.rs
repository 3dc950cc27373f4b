//! Call-recording `GlDevice` implementation for tests and examples
//!
//! Behaves enough like a real driver to exercise the shader core without a
//! graphics context: sources containing an `#error` directive fail to
//! compile with a synthetic info log, a `#pragma force_link_error` line
//! forces a link failure, and uniform names resolve only when they occur
//! textually in a linked program's source (mimicking uniforms that were
//! optimized out).

use crate::device::{
    AttribLocation, BufferId, BufferTarget, BufferUsage, GlDevice, ProgramId, ShaderId,
    ShaderStage, UniformLocation, VertexArrayId,
};
use std::cell::RefCell;
use std::collections::HashMap;

/// A uniform write recorded by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
    Vec3Array(Vec<f32>),
    Vec4Array(Vec<f32>),
}

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    source: String,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    /// Concatenated source of all attached stages, set on successful link
    linked_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum MockBufferData {
    F32(Vec<f32>),
    U32(Vec<u32>),
}

#[derive(Default)]
struct MockState {
    next_id: u32,
    shaders: HashMap<u32, ShaderRecord>,
    programs: HashMap<u32, ProgramRecord>,
    compile_calls: usize,
    bound_program: Option<u32>,

    uniform_locations: HashMap<(u32, String), i32>,
    uniform_names: HashMap<i32, (u32, String)>,
    attrib_locations: HashMap<(u32, String), i32>,
    next_location: i32,
    uniforms: HashMap<(u32, String), UniformValue>,

    vertex_arrays: Vec<u32>,
    bound_vertex_array: Option<u32>,
    buffers: HashMap<u32, Option<MockBufferData>>,
    bound_array_buffer: Option<u32>,
    bound_element_buffer: Option<u32>,
    enabled_attributes: Vec<(i32, u32, u32)>,
}

impl MockState {
    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn bound_for(&mut self, target: BufferTarget) -> &mut Option<u32> {
        match target {
            BufferTarget::Array => &mut self.bound_array_buffer,
            BufferTarget::ElementArray => &mut self.bound_element_buffer,
        }
    }
}

/// In-memory GPU device double
#[derive(Default)]
pub struct MockDevice {
    state: RefCell<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_shader_count(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_array_count(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// Total number of `compile_shader` calls ever made
    pub fn compile_call_count(&self) -> usize {
        self.state.borrow().compile_calls
    }

    pub fn bound_program(&self) -> Option<ProgramId> {
        self.state.borrow().bound_program.map(ProgramId)
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().bound_vertex_array.map(VertexArrayId)
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        let state = self.state.borrow();
        match target {
            BufferTarget::Array => state.bound_array_buffer.map(BufferId),
            BufferTarget::ElementArray => state.bound_element_buffer.map(BufferId),
        }
    }

    /// The last value written to a named uniform of `program`, if any
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniforms
            .get(&(program.0, name.to_string()))
            .cloned()
    }

    pub fn buffer_f32(&self, buffer: BufferId) -> Option<Vec<f32>> {
        match self.state.borrow().buffers.get(&buffer.0)? {
            Some(MockBufferData::F32(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn buffer_u32(&self, buffer: BufferId) -> Option<Vec<u32>> {
        match self.state.borrow().buffers.get(&buffer.0)? {
            Some(MockBufferData::U32(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn enabled_attribute_count(&self) -> usize {
        self.state.borrow().enabled_attributes.len()
    }

    /// The stage a live shader object was created for
    pub fn shader_stage(&self, shader: ShaderId) -> Option<ShaderStage> {
        self.state.borrow().shaders.get(&shader.0).map(|s| s.stage)
    }

    fn record_uniform(&self, location: UniformLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        if let Some(key) = state.uniform_names.get(&location.0).cloned() {
            state.uniforms.insert(key, value);
        }
    }
}

impl GlDevice for MockDevice {
    fn create_shader(&self, stage: ShaderStage) -> ShaderId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.shaders.insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
            },
        );
        ShaderId(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.shaders.get_mut(&shader.0) {
            record.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        state.compile_calls += 1;
        let record = state
            .shaders
            .get(&shader.0)
            .ok_or_else(|| "invalid shader object".to_string())?;
        if record.source.is_empty() {
            return Err("no source attached".to_string());
        }
        for (line_no, line) in record.source.lines().enumerate() {
            if line.trim_start().starts_with("#error") {
                return Err(format!(
                    "ERROR: 0:{}: '#error' : {}",
                    line_no + 1,
                    line.trim()
                ));
            }
        }
        Ok(())
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.state.borrow_mut().shaders.remove(&shader.0);
    }

    fn create_program(&self) -> ProgramId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.programs.insert(id, ProgramRecord::default());
        ProgramId(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.programs.get_mut(&program.0) {
            record.attached.push(shader.0);
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.programs.get_mut(&program.0) {
            record.attached.retain(|id| *id != shader.0);
        }
    }

    fn link_program(&self, program: ProgramId) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let attached = state
            .programs
            .get(&program.0)
            .ok_or_else(|| "invalid program object".to_string())?
            .attached
            .clone();
        if attached.is_empty() {
            return Err("no shader objects attached".to_string());
        }

        let combined: String = attached
            .iter()
            .filter_map(|id| state.shaders.get(id).map(|s| s.source.as_str()))
            .collect::<Vec<_>>()
            .join("\n");

        if combined.contains("#pragma force_link_error") {
            return Err("link failed: forced by #pragma force_link_error".to_string());
        }

        if let Some(record) = state.programs.get_mut(&program.0) {
            record.linked_source = Some(combined);
        }
        Ok(())
    }

    fn delete_program(&self, program: ProgramId) {
        self.state.borrow_mut().programs.remove(&program.0);
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.state.borrow_mut().bound_program = program.map(|p| p.0);
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let mut state = self.state.borrow_mut();
        let linked = state.programs.get(&program.0)?.linked_source.clone()?;
        // Names absent from the linked source behave as optimized out
        if !linked.contains(name) {
            return None;
        }
        let key = (program.0, name.to_string());
        if let Some(loc) = state.uniform_locations.get(&key) {
            return Some(UniformLocation(*loc));
        }
        let loc = state.next_location;
        state.next_location += 1;
        state.uniform_locations.insert(key.clone(), loc);
        state.uniform_names.insert(loc, key);
        Some(UniformLocation(loc))
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        let mut state = self.state.borrow_mut();
        let linked = state.programs.get(&program.0)?.linked_source.clone()?;
        if !linked.contains(name) {
            return None;
        }
        let key = (program.0, name.to_string());
        if let Some(loc) = state.attrib_locations.get(&key) {
            return Some(AttribLocation(*loc));
        }
        let loc = state.next_location;
        state.next_location += 1;
        state.attrib_locations.insert(key, loc);
        Some(AttribLocation(loc))
    }

    fn set_uniform_int(&self, location: UniformLocation, value: i32) {
        self.record_uniform(location, UniformValue::Int(value));
    }

    fn set_uniform_float(&self, location: UniformLocation, value: f32) {
        self.record_uniform(location, UniformValue::Float(value));
    }

    fn set_uniform_vec3(&self, location: UniformLocation, value: [f32; 3]) {
        self.record_uniform(location, UniformValue::Vec3(value));
    }

    fn set_uniform_vec4(&self, location: UniformLocation, value: [f32; 4]) {
        self.record_uniform(location, UniformValue::Vec4(value));
    }

    fn set_uniform_mat4(&self, location: UniformLocation, value: &[f32; 16]) {
        self.record_uniform(location, UniformValue::Mat4(*value));
    }

    fn set_uniform_vec3_array(&self, location: UniformLocation, values: &[f32]) {
        self.record_uniform(location, UniformValue::Vec3Array(values.to_vec()));
    }

    fn set_uniform_vec4_array(&self, location: UniformLocation, values: &[f32]) {
        self.record_uniform(location, UniformValue::Vec4Array(values.to_vec()));
    }

    fn create_vertex_array(&self) -> VertexArrayId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.vertex_arrays.push(id);
        VertexArrayId(id)
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        self.state.borrow_mut().bound_vertex_array = vao.map(|v| v.0);
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        self.state
            .borrow_mut()
            .vertex_arrays
            .retain(|id| *id != vao.0);
    }

    fn create_buffer(&self) -> BufferId {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.buffers.insert(id, None);
        BufferId(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut state = self.state.borrow_mut();
        *state.bound_for(target) = buffer.map(|b| b.0);
    }

    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32], _usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = *state.bound_for(target) {
            state
                .buffers
                .insert(id, Some(MockBufferData::F32(data.to_vec())));
        }
    }

    fn buffer_data_u32(&self, target: BufferTarget, data: &[u32], _usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = *state.bound_for(target) {
            state
                .buffers
                .insert(id, Some(MockBufferData::U32(data.to_vec())));
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.state.borrow_mut().buffers.remove(&buffer.0);
    }

    fn enable_vertex_attribute(&self, location: AttribLocation, components: u32, stride: u32) {
        self.state
            .borrow_mut()
            .enabled_attributes
            .push((location.0, components, stride));
    }
}
