//! Demonstrate the hot-reload poll loop against the mock device.
//!
//! Run with: cargo run -p glint-shader --example hot_reload

use glint_core::PropertyValue;
use glint_gpu::{GlDevice, MockDevice};
use glint_shader::{GlslShader, Shader, ShaderConfig};
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

const VS: &str = "uniform mat4 ModelViewProjectionMatrix;\nin vec3 Position;\nvoid main() {}\n";
const FS: &str = "#include \"common.glsl\"\nout vec4 FragColor;\nvoid main() {}\n";

fn main() {
    env_logger::init();

    let dir = std::env::temp_dir().join(format!("glint-hot-reload-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("failed to create demo directory");
    fs::write(dir.join("common.glsl"), "float helper() { return 1.0; }\n").unwrap();
    fs::write(dir.join("main.vert"), VS).unwrap();
    fs::write(dir.join("main.frag"), FS).unwrap();

    let device: Rc<dyn GlDevice> = Rc::new(MockDevice::new());
    let mut shader = GlslShader::new(device, ShaderConfig::default());

    let mut settings = HashMap::new();
    settings.insert(
        "vert_filename".to_string(),
        PropertyValue::Path(dir.join("main.vert")),
    );
    settings.insert(
        "frag_filename".to_string(),
        PropertyValue::Path(dir.join("main.frag")),
    );

    shader.update_renderer_properties(&settings).unwrap();
    shader.recompile().unwrap();
    println!("initial compile ok");

    // The host would run this check once per frame. Edit one of the files
    // under {dir} (including common.glsl) to trigger a reload; a broken
    // edit keeps the previous program drawable.
    println!("watching {} for edits...", dir.display());
    for _ in 0..100 {
        if shader.mtimes_changed() {
            match shader.recompile() {
                Ok(()) => println!("reloaded"),
                Err(err) => println!("reload failed, keeping last good program: {err}"),
            }
        }
        shader.bind();
        // ... draw calls would go here ...
        shader.unbind();
        thread::sleep(Duration::from_millis(100));
    }
}
