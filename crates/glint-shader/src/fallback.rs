//! Built-in fallback shader
//!
//! A known-good program compiled from embedded source, so the host always
//! has something drawable when a user shader has never compiled or its
//! files are gone. No files, no properties, no lighting.

use crate::lights::LightData;
use crate::mesh::VertexBufferSet;
use crate::program::{compile_program, CompiledProgram};
use crate::properties::ShaderProperties;
use crate::shader::Shader;
use glam::Mat4;
use glint_core::{PropertyGroup, Result};
use glint_gpu::{GlDevice, ShaderStage};
use std::rc::Rc;

const VS_FALLBACK: &str = r#"#version 330 core

uniform mat4 ModelViewProjectionMatrix;
uniform mat4 ModelMatrix;

in vec3 Position;
in vec3 Normal;

out VS_OUT {
    vec3 positionWS;
    vec3 normalWS;
} OUT;

void main()
{
    gl_Position = ModelViewProjectionMatrix * vec4(Position, 1.0);

    OUT.positionWS = (ModelMatrix * vec4(Position, 1.0)).xyz;
    OUT.normalWS = (ModelMatrix * vec4(Normal, 0)).xyz;
}
"#;

const FS_FALLBACK: &str = r#"#version 330 core

uniform mat4 CameraMatrix;

layout (location = 0) out vec4 FragColor;

in VS_OUT {
    vec3 positionWS;
    vec3 normalWS;
} IN;

void main()
{
    vec3 cameraPositionWS = CameraMatrix[3].xyz;

    vec3 eye = cameraPositionWS - IN.positionWS;
    float ndl = clamp(dot(IN.normalWS, normalize(eye)), 0.0, 1.0);

    vec3 inner = vec3(0.61, 0.54, 0.52);
    vec3 outer = vec3(0.27, 0.19, 0.18);
    vec3 highlight = vec3(0.98, 0.95, 0.92);

    FragColor = vec4(mix(outer, mix(inner, highlight, ndl * 0.25), ndl * 0.75), 1);
}
"#;

/// Safe default shader compiled from embedded sources
pub struct FallbackShader {
    device: Rc<dyn GlDevice>,
    properties: ShaderProperties,
    program: Option<CompiledProgram>,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl FallbackShader {
    pub fn new(device: Rc<dyn GlDevice>) -> Self {
        Self {
            device,
            properties: ShaderProperties::new(),
            program: None,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        }
    }

    /// Compile the embedded sources. Only fails if the device itself is
    /// broken, since the sources are known-good.
    pub fn compile(&mut self) -> Result<()> {
        let stages = [
            (ShaderStage::Vertex, VS_FALLBACK.to_string()),
            (ShaderStage::Fragment, FS_FALLBACK.to_string()),
        ];
        self.program = Some(compile_program(&self.device, &stages)?);
        Ok(())
    }

    pub fn program(&self) -> Option<&CompiledProgram> {
        self.program.as_ref()
    }
}

impl Shader for FallbackShader {
    fn renderer_properties(&self) -> &ShaderProperties {
        &self.properties
    }

    fn material_properties(&self) -> &ShaderProperties {
        &self.properties
    }

    fn update_renderer_properties(&mut self, _settings: &dyn PropertyGroup) -> Result<()> {
        // Nothing configurable
        Ok(())
    }

    fn update_material_properties(&mut self, _settings: &dyn PropertyGroup) -> Result<()> {
        Ok(())
    }

    fn recompile(&mut self) -> Result<()> {
        self.compile()
    }

    fn mtimes_changed(&self) -> bool {
        false
    }

    fn bind(&self) {
        if let Some(program) = &self.program {
            program.bind();
        }
    }

    fn unbind(&self) {
        self.device.use_program(None);
    }

    fn set_camera_matrices(&mut self, view: Mat4, projection: Mat4) {
        self.view_matrix = view;
        self.projection_matrix = projection;

        let Some(program) = &self.program else {
            return;
        };
        program.set_mat4("CameraMatrix", view.inverse());
    }

    fn set_object_matrices(&mut self, model: Mat4) {
        let Some(program) = &self.program else {
            return;
        };
        let mvp = self.projection_matrix * self.view_matrix * model;
        program.set_mat4("ModelMatrix", model);
        program.set_mat4("ModelViewProjectionMatrix", mvp);
    }

    fn set_lights(&mut self, _lights: &LightData) {
        // The fallback ignores scene lighting
    }

    fn create_vertex_data(&self) -> VertexBufferSet {
        VertexBufferSet::new(Rc::clone(&self.device))
    }

    fn upload_vertex_data(&self, data: &mut VertexBufferSet) {
        if let Some(program) = &self.program {
            data.upload(program);
        }
    }
}
