//! Direct-source GLSL shader
//!
//! The simplest shader format: stage source files on disk, preprocessed
//! for includes, compiled and linked as-is. A `#version` directive is
//! prepended automatically so source files stay portable.

use crate::lights::{LightData, PackedLights, MAX_ADDITIONAL_LIGHTS};
use crate::mesh::VertexBufferSet;
use crate::preprocessor::Preprocessor;
use crate::program::{compile_program, CompiledProgram};
use crate::properties::ShaderProperties;
use crate::shader::Shader;
use crate::watch::MonitoredFiles;
use glam::{Mat4, Vec4};
use glint_core::{GlintError, PropertyGroup, PropertyKind, Result};
use glint_gpu::{GlDevice, ShaderStage};
use log::{debug, warn};
use std::path::PathBuf;
use std::rc::Rc;

/// Renderer-schema descriptors for the five stage file slots
const STAGE_PROPERTIES: [(ShaderStage, &str, &str, &str); 5] = [
    (
        ShaderStage::Vertex,
        "vert_filename",
        "Vertex",
        "GLSL vertex shader source file",
    ),
    (
        ShaderStage::TessControl,
        "tesc_filename",
        "Tessellation Control",
        "GLSL tessellation control shader source file",
    ),
    (
        ShaderStage::TessEval,
        "tese_filename",
        "Tessellation Evaluation",
        "GLSL tessellation evaluation shader source file",
    ),
    (
        ShaderStage::Geometry,
        "geom_filename",
        "Geometry",
        "GLSL geometry shader source file",
    ),
    (
        ShaderStage::Fragment,
        "frag_filename",
        "Fragment",
        "GLSL fragment shader source file",
    ),
];

/// Construction-time constants for a `GlslShader`
#[derive(Debug, Clone)]
pub struct ShaderConfig {
    /// Payload of the `#version` directive prepended to every stage
    pub version_directive: String,
    /// Capacity of the packed additional-light arrays
    pub max_additional_lights: usize,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            version_directive: "330 core".to_string(),
            max_additional_lights: MAX_ADDITIONAL_LIGHTS,
        }
    }
}

/// Shader compiled directly from GLSL source files on disk
pub struct GlslShader {
    device: Rc<dyn GlDevice>,
    config: ShaderConfig,
    properties: ShaderProperties,
    material_properties: ShaderProperties,
    /// Configured stage files, in pipeline order
    stages: Vec<(ShaderStage, PathBuf)>,
    /// Last successfully linked program; retained across failed recompiles
    program: Option<CompiledProgram>,
    watch: MonitoredFiles,
    last_error: Option<String>,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl GlslShader {
    pub fn new(device: Rc<dyn GlDevice>, config: ShaderConfig) -> Self {
        let mut properties = ShaderProperties::new();
        for (stage, id, label, description) in STAGE_PROPERTIES {
            if stage.is_required() {
                properties.add_required(PropertyKind::SourceFile, id, label, description);
            } else {
                properties.add(PropertyKind::SourceFile, id, label, description);
            }
        }
        properties.add(
            PropertyKind::Image,
            "diffuse",
            "Diffuse",
            "Diffuse color channel image",
        );

        Self {
            device,
            config,
            properties,
            material_properties: ShaderProperties::new(),
            stages: Vec::new(),
            program: None,
            watch: MonitoredFiles::default(),
            last_error: None,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        }
    }

    /// The currently linked program, if any compile has ever succeeded
    pub fn program(&self) -> Option<&CompiledProgram> {
        self.program.as_ref()
    }

    /// Diagnostic text from the last failed compile, for the host UI
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Preprocess every configured stage, returning the stage sources and
    /// the full file set to monitor (stage files + transitive includes).
    fn resolve_stage_sources(&self) -> Result<(Vec<(ShaderStage, String)>, Vec<PathBuf>)> {
        let mut sources = Vec::with_capacity(self.stages.len());
        let mut monitored: Vec<PathBuf> = Vec::new();

        for (stage, path) in &self.stages {
            let mut preprocessor = Preprocessor::new();
            let body = preprocessor.resolve_file(path)?;
            sources.push((
                *stage,
                format!("#version {}\n{}", self.config.version_directive, body),
            ));

            monitored.push(path.clone());
            for include in preprocessor.includes() {
                // Headers shared between stages only need one watch entry
                if !monitored.contains(include) {
                    monitored.push(include.clone());
                }
            }
        }

        Ok((sources, monitored))
    }
}

impl Shader for GlslShader {
    fn renderer_properties(&self) -> &ShaderProperties {
        &self.properties
    }

    fn material_properties(&self) -> &ShaderProperties {
        &self.material_properties
    }

    fn update_renderer_properties(&mut self, settings: &dyn PropertyGroup) -> Result<()> {
        self.properties.from_property_group(settings)?;

        let mut stages = Vec::new();
        for (stage, id, _, _) in STAGE_PROPERTIES {
            match self.properties.path(id) {
                Some(path) => {
                    if stage.is_required() && !path.is_file() {
                        return Err(GlintError::MissingRequiredStage {
                            stage: stage.name().to_string(),
                            path: path.to_path_buf(),
                        });
                    }
                    stages.push((stage, path.to_path_buf()));
                }
                None => {
                    // Optional stages may simply be unconfigured
                }
            }
        }
        self.stages = stages;
        Ok(())
    }

    fn update_material_properties(&mut self, settings: &dyn PropertyGroup) -> Result<()> {
        self.material_properties.from_property_group(settings)
    }

    fn recompile(&mut self) -> Result<()> {
        let result = self
            .resolve_stage_sources()
            .and_then(|(sources, monitored)| {
                let program = compile_program(&self.device, &sources)?;
                Ok((program, monitored))
            });

        match result {
            Ok((program, monitored)) => {
                // Swapping in the new program drops (and deletes) the old one
                self.program = Some(program);
                self.watch = MonitoredFiles::from_paths(monitored);
                self.watch.update();
                self.last_error = None;
                debug!(
                    "recompiled GLSL shader, watching {} file(s)",
                    self.watch.len()
                );
                Ok(())
            }
            Err(err) => {
                // Keep the previous program bindable: one typo in a
                // hot-reloaded file must not leave the host with nothing
                // to draw with
                self.last_error = Some(err.to_string());
                warn!("shader recompile failed: {err}");
                Err(err)
            }
        }
    }

    fn mtimes_changed(&self) -> bool {
        self.watch.changed()
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
        program.set_mat4("ViewMatrix", view);
        program.set_mat4("ProjectionMatrix", projection);
        program.set_mat4("CameraMatrix", view.inverse());
    }

    fn set_object_matrices(&mut self, model: Mat4) {
        let Some(program) = &self.program else {
            return;
        };
        let model_view = self.view_matrix * model;
        let model_view_projection = self.projection_matrix * model_view;

        program.set_mat4("ModelMatrix", model);
        program.set_mat4("ModelViewMatrix", model_view);
        program.set_mat4("ModelViewProjectionMatrix", model_view_projection);
    }

    fn set_lights(&mut self, lights: &LightData) {
        let Some(program) = &self.program else {
            return;
        };

        let packed = PackedLights::pack(lights, self.config.max_additional_lights);

        // Zeroed rather than left stale, so removing the sun between
        // frames doesn't leave last frame's direction in the uniforms
        let (direction, color) = match lights.main_light {
            Some(main) => (main.direction, main.color),
            None => (Vec4::ZERO, Vec4::ZERO),
        };
        program.set_vec4("_MainLightDirection", direction);
        program.set_vec4("_MainLightColor", color);

        program.set_int("_AdditionalLightsCount", packed.count as i32);
        program.set_vec4_array("_AdditionalLightsPosition", &packed.positions);
        program.set_vec4_array("_AdditionalLightsColor", &packed.colors);
        program.set_vec4_array("_AdditionalLightsSpotDir", &packed.directions);
        program.set_vec4_array("_AdditionalLightsAttenuation", &packed.attenuations);

        program.set_vec3("_AmbientColor", lights.ambient_color);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::LightRecord;
    use glam::Vec3;
    use glint_gpu::{MockDevice, UniformValue};
    use std::collections::HashMap;
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    const VS: &str = "\
uniform mat4 ViewMatrix;
uniform mat4 ProjectionMatrix;
uniform mat4 CameraMatrix;
uniform mat4 ModelMatrix;
uniform mat4 ModelViewMatrix;
uniform mat4 ModelViewProjectionMatrix;
in vec3 Position;
in vec3 Normal;
void main() {}
";

    const FS: &str = "\
uniform vec4 _MainLightDirection;
uniform vec4 _MainLightColor;
uniform int _AdditionalLightsCount;
uniform vec4 _AdditionalLightsPosition[16];
uniform vec4 _AdditionalLightsColor[16];
uniform vec4 _AdditionalLightsSpotDir[16];
uniform vec4 _AdditionalLightsAttenuation[16];
uniform vec3 _AmbientColor;
out vec4 FragColor;
void main() {}
";

    struct Fixture {
        mock: Rc<MockDevice>,
        shader: GlslShader,
        dir: PathBuf,
    }

    fn fixture(name: &str) -> Fixture {
        let dir = std::env::temp_dir().join(format!("glint-glsl-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.vert"), VS).unwrap();
        fs::write(dir.join("main.frag"), FS).unwrap();

        let mock = Rc::new(MockDevice::new());
        let device: Rc<dyn GlDevice> = mock.clone();
        let shader = GlslShader::new(device, ShaderConfig::default());
        Fixture { mock, shader, dir }
    }

    fn settings(dir: &Path) -> HashMap<String, glint_core::PropertyValue> {
        let mut settings = HashMap::new();
        settings.insert(
            "vert_filename".to_string(),
            glint_core::PropertyValue::Path(dir.join("main.vert")),
        );
        settings.insert(
            "frag_filename".to_string(),
            glint_core::PropertyValue::Path(dir.join("main.frag")),
        );
        settings
    }

    fn bump_mtime(path: &Path) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(2))
            .unwrap();
    }

    #[test]
    fn compiles_from_configured_stage_files() {
        let mut fx = fixture("compile");
        fx.shader
            .update_renderer_properties(&settings(&fx.dir))
            .unwrap();
        fx.shader.recompile().unwrap();

        assert!(fx.shader.program().is_some());
        assert!(fx.shader.last_error().is_none());
        fx.shader.bind();
        assert_eq!(
            fx.mock.bound_program(),
            Some(fx.shader.program().unwrap().id())
        );
        fx.shader.unbind();
        assert_eq!(fx.mock.bound_program(), None);
    }

    #[test]
    fn missing_fragment_file_fails_before_any_compilation() {
        let mut fx = fixture("missing-frag");
        let mut settings = settings(&fx.dir);
        settings.insert(
            "frag_filename".to_string(),
            glint_core::PropertyValue::Path(fx.dir.join("does_not_exist.frag")),
        );

        let err = fx.shader.update_renderer_properties(&settings).unwrap_err();
        match err {
            GlintError::MissingRequiredStage { stage, path } => {
                assert_eq!(stage, "Fragment");
                assert!(path.ends_with("does_not_exist.frag"));
            }
            other => panic!("expected MissingRequiredStage, got {other:?}"),
        }
        assert_eq!(fx.mock.compile_call_count(), 0);
    }

    #[test]
    fn mtimes_settle_after_compile_and_trip_on_edit() {
        let mut fx = fixture("mtimes");
        fx.shader
            .update_renderer_properties(&settings(&fx.dir))
            .unwrap();
        fx.shader.recompile().unwrap();
        assert!(!fx.shader.mtimes_changed());

        bump_mtime(&fx.dir.join("main.frag"));
        assert!(fx.shader.mtimes_changed());
    }

    #[test]
    fn included_files_are_monitored() {
        let mut fx = fixture("includes");
        fs::write(fx.dir.join("common.glsl"), "float helper() { return 1.0; }\n").unwrap();
        fs::write(
            fx.dir.join("main.frag"),
            format!("#include \"common.glsl\"\n{FS}"),
        )
        .unwrap();

        fx.shader
            .update_renderer_properties(&settings(&fx.dir))
            .unwrap();
        fx.shader.recompile().unwrap();
        assert!(!fx.shader.mtimes_changed());

        bump_mtime(&fx.dir.join("common.glsl"));
        assert!(fx.shader.mtimes_changed());
    }

    #[test]
    fn failed_recompile_retains_previous_program() {
        let mut fx = fixture("fail-soft");
        fx.shader
            .update_renderer_properties(&settings(&fx.dir))
            .unwrap();
        fx.shader.recompile().unwrap();
        let good_program = fx.shader.program().unwrap().id();

        fs::write(fx.dir.join("main.frag"), "#error broken edit\n").unwrap();
        let err = fx.shader.recompile().unwrap_err();
        assert!(matches!(err, GlintError::Compile { .. }));

        // The last-known-good program survives the bad edit
        let retained = fx.shader.program().expect("program was discarded");
        assert_eq!(retained.id(), good_program);
        fx.shader.bind();
        assert_eq!(fx.mock.bound_program(), Some(good_program));

        let diagnostic = fx.shader.last_error().unwrap();
        assert!(diagnostic.contains("Fragment"));
        assert!(diagnostic.contains("#error"));

        // A fixed source compiles again and clears the diagnostic
        fs::write(fx.dir.join("main.frag"), FS).unwrap();
        fx.shader.recompile().unwrap();
        assert!(fx.shader.last_error().is_none());
    }

    #[test]
    fn set_lights_packs_and_zeroes_missing_main_light() {
        let mut fx = fixture("lights");
        fx.shader
            .update_renderer_properties(&settings(&fx.dir))
            .unwrap();
        fx.shader.recompile().unwrap();
        let program = fx.shader.program().unwrap().id();

        let mut lights = LightData::new();
        lights.ambient_color = Vec3::new(0.1, 0.2, 0.3);
        lights.set_additional_light(
            42,
            LightRecord {
                position: Vec4::new(1.0, 2.0, 3.0, 1.0),
                ..Default::default()
            },
        );
        fx.shader.set_lights(&lights);

        assert_eq!(
            fx.mock.uniform(program, "_AdditionalLightsCount"),
            Some(UniformValue::Int(1))
        );
        assert_eq!(
            fx.mock.uniform(program, "_AmbientColor"),
            Some(UniformValue::Vec3([0.1, 0.2, 0.3]))
        );
        match fx.mock.uniform(program, "_AdditionalLightsPosition") {
            Some(UniformValue::Vec4Array(values)) => {
                assert_eq!(values.len(), 16 * 4);
                assert_eq!(&values[..4], [1.0, 2.0, 3.0, 1.0]);
                assert_eq!(&values[4..8], [0.0; 4]);
            }
            other => panic!("expected Vec4Array, got {other:?}"),
        }

        // No main light this frame: dedicated uniforms are zeroed, not stale
        assert_eq!(
            fx.mock.uniform(program, "_MainLightDirection"),
            Some(UniformValue::Vec4([0.0; 4]))
        );
        assert_eq!(
            fx.mock.uniform(program, "_MainLightColor"),
            Some(UniformValue::Vec4([0.0; 4]))
        );

        // With a main light, its record lands in the dedicated uniforms
        lights.main_light = Some(LightRecord {
            direction: Vec4::new(0.0, -1.0, 0.0, 0.0),
            color: Vec4::new(1.0, 0.9, 0.8, 1.0),
            ..Default::default()
        });
        fx.shader.set_lights(&lights);
        assert_eq!(
            fx.mock.uniform(program, "_MainLightColor"),
            Some(UniformValue::Vec4([1.0, 0.9, 0.8, 1.0]))
        );
    }

    #[test]
    fn object_matrices_compose_with_camera_state() {
        let mut fx = fixture("matrices");
        fx.shader
            .update_renderer_properties(&settings(&fx.dir))
            .unwrap();
        fx.shader.recompile().unwrap();
        let program = fx.shader.program().unwrap().id();

        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let projection = Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 100.0);
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));

        fx.shader.set_camera_matrices(view, projection);
        fx.shader.set_object_matrices(model);

        assert_eq!(
            fx.mock.uniform(program, "CameraMatrix"),
            Some(UniformValue::Mat4(view.inverse().to_cols_array()))
        );
        assert_eq!(
            fx.mock.uniform(program, "ModelViewProjectionMatrix"),
            Some(UniformValue::Mat4(
                (projection * view * model).to_cols_array()
            ))
        );
    }
}
