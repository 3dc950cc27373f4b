//! Program compilation, linking, and the typed uniform surface
//!
//! Stage and program objects are wrapped in guards so intermediate GPU
//! handles are released on every exit path, including compile and link
//! failures. Hot-reloading repeatedly must not leak driver objects.

use glam::{Mat4, Vec3, Vec4};
use glint_core::{GlintError, Result};
use glint_gpu::{GlDevice, ProgramId, ShaderId, ShaderStage, UniformLocation};
use std::rc::Rc;

/// Deletes the stage object when the guard leaves scope
struct StageGuard<'a> {
    device: &'a dyn GlDevice,
    id: ShaderId,
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        self.device.delete_shader(self.id);
    }
}

fn compile_stage<'a>(
    device: &'a dyn GlDevice,
    stage: ShaderStage,
    source: &str,
) -> Result<StageGuard<'a>> {
    let id = device.create_shader(stage);
    let guard = StageGuard { device, id };
    device.shader_source(id, source);
    device
        .compile_shader(id)
        .map_err(|log| GlintError::Compile {
            stage: stage.name().to_string(),
            log,
        })?;
    Ok(guard)
}

/// Deletes the program object unless linking succeeded
struct ProgramGuard<'a> {
    device: &'a dyn GlDevice,
    id: ProgramId,
    linked: bool,
}

impl Drop for ProgramGuard<'_> {
    fn drop(&mut self) {
        if !self.linked {
            self.device.delete_program(self.id);
        }
    }
}

/// Compile each stage source, link them into one program, and release all
/// intermediate stage objects regardless of outcome.
pub fn compile_program(
    device: &Rc<dyn GlDevice>,
    stages: &[(ShaderStage, String)],
) -> Result<CompiledProgram> {
    let mut guards = Vec::with_capacity(stages.len());
    for (stage, source) in stages {
        guards.push(compile_stage(device.as_ref(), *stage, source)?);
    }

    let mut program = ProgramGuard {
        device: device.as_ref(),
        id: device.create_program(),
        linked: false,
    };
    for guard in &guards {
        device.attach_shader(program.id, guard.id);
    }
    let link_result = device.link_program(program.id);
    for guard in &guards {
        device.detach_shader(program.id, guard.id);
    }
    drop(guards);

    link_result.map_err(GlintError::Link)?;
    program.linked = true;
    Ok(CompiledProgram {
        device: Rc::clone(device),
        id: program.id,
    })
}

/// A successfully linked GPU program.
///
/// Exists only post-link, so holding one is proof the handle is usable for
/// drawing. Carries the typed uniform setters; setting a name the driver
/// optimized out is a silent no-op, not an error. The underlying program
/// object is deleted on drop.
pub struct CompiledProgram {
    device: Rc<dyn GlDevice>,
    id: ProgramId,
}

impl std::fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl CompiledProgram {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn bind(&self) {
        self.device.use_program(Some(self.id));
    }

    pub fn unbind(&self) {
        self.device.use_program(None);
    }

    fn location(&self, name: &str) -> Option<UniformLocation> {
        self.device.uniform_location(self.id, name)
    }

    pub fn set_mat4(&self, name: &str, mat: Mat4) {
        let Some(location) = self.location(name) else {
            return;
        };
        // glam stores column-major, which is already the API's convention
        self.device.set_uniform_mat4(location, &mat.to_cols_array());
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        let Some(location) = self.location(name) else {
            return;
        };
        self.device.set_uniform_vec3(location, value.to_array());
    }

    pub fn set_vec4(&self, name: &str, value: Vec4) {
        let Some(location) = self.location(name) else {
            return;
        };
        self.device.set_uniform_vec4(location, value.to_array());
    }

    pub fn set_int(&self, name: &str, value: i32) {
        let Some(location) = self.location(name) else {
            return;
        };
        self.device.set_uniform_int(location, value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        let Some(location) = self.location(name) else {
            return;
        };
        self.device.set_uniform_float(location, value);
    }

    pub fn set_vec3_array(&self, name: &str, values: &[f32]) {
        let Some(location) = self.location(name) else {
            return;
        };
        self.device.set_uniform_vec3_array(location, values);
    }

    pub fn set_vec4_array(&self, name: &str, values: &[f32]) {
        let Some(location) = self.location(name) else {
            return;
        };
        self.device.set_uniform_vec4_array(location, values);
    }

    /// Enable a named vertex attribute for reads from the currently bound
    /// array buffer
    pub fn set_vertex_attribute(&self, name: &str, components: u32, stride: u32) {
        let Some(location) = self.device.attrib_location(self.id, name) else {
            return;
        };
        self.device
            .enable_vertex_attribute(location, components, stride);
    }
}

impl Drop for CompiledProgram {
    fn drop(&mut self) {
        self.device.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_gpu::{MockDevice, UniformValue};

    const VS: &str = "#version 330 core\nuniform mat4 ModelMatrix;\nvoid main() {}\n";
    const FS: &str = "#version 330 core\nout vec4 FragColor;\nvoid main() {}\n";

    fn stages(vs: &str, fs: &str) -> Vec<(ShaderStage, String)> {
        vec![
            (ShaderStage::Vertex, vs.to_string()),
            (ShaderStage::Fragment, fs.to_string()),
        ]
    }

    #[test]
    fn valid_sources_link_and_release_stage_objects() {
        let mock = Rc::new(MockDevice::new());
        let device: Rc<dyn GlDevice> = mock.clone();

        let program = compile_program(&device, &stages(VS, FS)).unwrap();
        assert_eq!(mock.live_program_count(), 1);
        // Intermediate stage objects are gone even on success
        assert_eq!(mock.live_shader_count(), 0);

        program.bind();
        assert_eq!(mock.bound_program(), Some(program.id()));
    }

    #[test]
    fn compile_failure_names_the_stage() {
        let mock = Rc::new(MockDevice::new());
        let device: Rc<dyn GlDevice> = mock.clone();

        let bad_vs = "#version 330 core\n#error bad token\nvoid main() {}\n";
        let err = compile_program(&device, &stages(bad_vs, FS)).unwrap_err();
        match err {
            GlintError::Compile { stage, log } => {
                assert_eq!(stage, "Vertex");
                assert!(log.contains("#error"));
            }
            other => panic!("expected Compile, got {other:?}"),
        }
        // Nothing leaked on the failure path
        assert_eq!(mock.live_shader_count(), 0);
        assert_eq!(mock.live_program_count(), 0);
    }

    #[test]
    fn link_failure_releases_program_object() {
        let mock = Rc::new(MockDevice::new());
        let device: Rc<dyn GlDevice> = mock.clone();

        let bad_fs = "#version 330 core\n#pragma force_link_error\nvoid main() {}\n";
        let err = compile_program(&device, &stages(VS, bad_fs)).unwrap_err();
        assert!(matches!(err, GlintError::Link(_)));
        assert_eq!(mock.live_shader_count(), 0);
        assert_eq!(mock.live_program_count(), 0);
    }

    #[test]
    fn drop_deletes_program() {
        let mock = Rc::new(MockDevice::new());
        let device: Rc<dyn GlDevice> = mock.clone();

        let program = compile_program(&device, &stages(VS, FS)).unwrap();
        drop(program);
        assert_eq!(mock.live_program_count(), 0);
    }

    #[test]
    fn unknown_uniform_is_a_silent_no_op() {
        let mock = Rc::new(MockDevice::new());
        let device: Rc<dyn GlDevice> = mock.clone();

        let program = compile_program(&device, &stages(VS, FS)).unwrap();
        program.set_vec3("NotInTheProgram", Vec3::ONE);
        assert_eq!(mock.uniform(program.id(), "NotInTheProgram"), None);

        // A name that is present still lands
        program.set_mat4("ModelMatrix", Mat4::IDENTITY);
        assert_eq!(
            mock.uniform(program.id(), "ModelMatrix"),
            Some(UniformValue::Mat4(Mat4::IDENTITY.to_cols_array()))
        );
    }
}
