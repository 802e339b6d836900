use std::collections::HashMap;

use glam::Mat4;
use js_sys::{Float32Array, Uint32Array};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{Error, Result};
use crate::scene::{Frame, Material, Mesh, MeshHandle, Primitive, SceneHost};

const POSITION: u32 = 0;
const MORPH_TARGET: u32 = 1;
const COLOR: u32 = 2;
const SIZE: u32 = 3;

const BASIC_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_target;
uniform mat4 u_mvp;
uniform float u_morph;
void main() {
    gl_Position = u_mvp * vec4(mix(a_position, a_target, u_morph), 1.0);
}
"#;

const BASIC_FS: &str = r#"#version 300 es
precision mediump float;
uniform vec4 u_color;
out vec4 out_color;
void main() {
    out_color = u_color;
}
"#;

const PARTICLE_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 2) in vec3 a_color;
layout(location = 3) in float a_size;
uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_time;
uniform float u_pixel_ratio;
out vec3 v_color;
void main() {
    v_color = a_color;
    vec3 pos = a_position;
    pos.y += sin(u_time + a_position.x * 0.1) * 2.0;
    pos.x += cos(u_time + a_position.z * 0.1) * 1.0;
    vec4 mv = u_model_view * vec4(pos, 1.0);
    gl_Position = u_projection * mv;
    gl_PointSize = a_size * u_pixel_ratio * (300.0 / -mv.z);
}
"#;

const PARTICLE_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
out vec4 out_color;
void main() {
    float d = distance(gl_PointCoord, vec2(0.5));
    out_color = vec4(v_color, 0.05 / d - 0.1);
}
"#;

struct Program {
    program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
}

impl Program {
    fn new(gl: &GL, vs: &str, fs: &str, uniforms: &[&'static str]) -> Result<Self> {
        let vs = compile(gl, GL::VERTEX_SHADER, vs)?;
        let fs = compile(gl, GL::FRAGMENT_SHADER, fs)?;
        let program = link(gl, &vs, &fs)?;
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));
        let uniforms = uniforms
            .iter()
            .filter_map(|&name| gl.get_uniform_location(&program, name).map(|loc| (name, loc)))
            .collect();
        Ok(Self { program, uniforms })
    }

    fn uniform(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }
}

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    buffers: Vec<WebGlBuffer>,
    mode: u32,
    count: i32,
    indexed: bool,
}

/// WebGL2 scene host bound to one canvas.
pub struct WebGlHost {
    canvas: HtmlCanvasElement,
    gl: GL,
    basic: Program,
    particles: Program,
    meshes: Vec<Option<GpuMesh>>,
    css_size: (f32, f32),
    pixel_ratio: f32,
}

impl WebGlHost {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|e| Error::Graphics(format!("{e:?}")))?
            .ok_or_else(|| Error::Graphics("WebGL2 not supported".into()))?
            .dyn_into()
            .map_err(|_| Error::Graphics("context is not WebGL2".into()))?;

        let basic = Program::new(&gl, BASIC_VS, BASIC_FS, &["u_mvp", "u_morph", "u_color"])?;
        let particles = Program::new(
            &gl,
            PARTICLE_VS,
            PARTICLE_FS,
            &["u_model_view", "u_projection", "u_time", "u_pixel_ratio"],
        )?;

        Ok(Self {
            canvas,
            gl,
            basic,
            particles,
            meshes: Vec::new(),
            css_size: (0.0, 0.0),
            pixel_ratio: 1.0,
        })
    }

    fn apply_size(&self) {
        let (w, h) = self.css_size;
        let (pw, ph) = ((w * self.pixel_ratio) as u32, (h * self.pixel_ratio) as u32);
        self.canvas.set_width(pw);
        self.canvas.set_height(ph);
        let style = self.canvas.style();
        if style.set_property("width", &format!("{w}px")).is_err()
            || style.set_property("height", &format!("{h}px")).is_err()
        {
            log::debug!("canvas style not writable");
        }
        self.gl.viewport(0, 0, pw as i32, ph as i32);
    }

    fn array_buffer(&self, location: u32, components: i32, data: &[f32]) -> Option<WebGlBuffer> {
        let gl = &self.gl;
        let buffer = gl.create_buffer()?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(location);
        gl.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
        Some(buffer)
    }

    fn create_mesh(&self, mesh: &Mesh) -> Option<GpuMesh> {
        let gl = &self.gl;
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(&vao));

        let flat = |v: &[glam::Vec3]| v.iter().flat_map(|p| p.to_array()).collect::<Vec<f32>>();
        let positions = flat(mesh.positions.as_slice());
        let mut buffers = vec![self.array_buffer(POSITION, 3, &positions)?];
        let target = mesh.morph_target.as_deref().map(flat);
        buffers.push(self.array_buffer(MORPH_TARGET, 3, target.as_deref().unwrap_or(positions.as_slice()))?);
        if let Some(colors) = &mesh.colors {
            buffers.push(self.array_buffer(COLOR, 3, &flat(colors.as_slice()))?);
        }
        if let Some(sizes) = &mesh.sizes {
            buffers.push(self.array_buffer(SIZE, 1, sizes)?);
        }
        if let Some(indices) = &mesh.indices {
            let buffer = gl.create_buffer()?;
            gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&buffer));
            gl.buffer_data_with_array_buffer_view(
                GL::ELEMENT_ARRAY_BUFFER,
                &Uint32Array::from(indices.as_slice()),
                GL::STATIC_DRAW,
            );
            buffers.push(buffer);
        }
        gl.bind_vertex_array(None);

        Some(GpuMesh {
            vao,
            buffers,
            mode: match mesh.primitive {
                Primitive::Points => GL::POINTS,
                Primitive::Lines => GL::LINES,
                Primitive::Triangles => GL::TRIANGLES,
            },
            count: mesh.element_count() as i32,
            indexed: mesh.indices.is_some(),
        })
    }
}

impl SceneHost for WebGlHost {
    fn upload(&mut self, mesh: &Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        let gpu = self.create_mesh(mesh);
        if gpu.is_none() {
            log::error!("mesh upload failed; {} elements skipped", mesh.element_count());
        }
        self.meshes.push(gpu);
        handle
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.css_size = (width, height);
        self.apply_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
        self.apply_size();
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn render(&mut self, frame: &Frame<'_>) {
        let gl = &self.gl;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.enable(GL::BLEND);

        let view = frame.camera.view();
        let projection = frame.camera.projection();

        for draw in frame.draws {
            let Some(Some(mesh)) = self.meshes.get(draw.mesh.0 as usize) else {
                continue;
            };
            match draw.material {
                Material::Basic { color, opacity } => {
                    let p = &self.basic;
                    gl.use_program(Some(&p.program));
                    gl.enable(GL::DEPTH_TEST);
                    gl.depth_mask(true);
                    gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
                    set_matrix(gl, p.uniform("u_mvp"), projection * view * draw.model);
                    gl.uniform1f(p.uniform("u_morph"), draw.morph);
                    gl.uniform4f(p.uniform("u_color"), color.x, color.y, color.z, opacity);
                }
                Material::Particles { time } => {
                    let p = &self.particles;
                    gl.use_program(Some(&p.program));
                    gl.disable(GL::DEPTH_TEST);
                    gl.depth_mask(false);
                    gl.blend_func(GL::SRC_ALPHA, GL::ONE);
                    set_matrix(gl, p.uniform("u_model_view"), view * draw.model);
                    set_matrix(gl, p.uniform("u_projection"), projection);
                    gl.uniform1f(p.uniform("u_time"), time);
                    gl.uniform1f(p.uniform("u_pixel_ratio"), self.pixel_ratio);
                }
            }

            gl.bind_vertex_array(Some(&mesh.vao));
            if mesh.indexed {
                gl.draw_elements_with_i32(mesh.mode, mesh.count, GL::UNSIGNED_INT, 0);
            } else {
                gl.draw_arrays(mesh.mode, 0, mesh.count);
            }
        }
        gl.bind_vertex_array(None);
    }

    fn dispose(&mut self) {
        let gl = &self.gl;
        for mesh in self.meshes.drain(..).flatten() {
            for buffer in &mesh.buffers {
                gl.delete_buffer(Some(buffer));
            }
            gl.delete_vertex_array(Some(&mesh.vao));
        }
        gl.delete_program(Some(&self.basic.program));
        gl.delete_program(Some(&self.particles.program));
    }
}

fn set_matrix(gl: &GL, location: Option<&WebGlUniformLocation>, matrix: Mat4) {
    gl.uniform_matrix4fv_with_f32_array(location, false, &matrix.to_cols_array());
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Graphics("unable to create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(Error::Graphics(format!("shader compile: {log}")))
    }
}

fn link(gl: &GL, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Graphics("unable to create program".into()))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(Error::Graphics(format!("program link: {log}")))
    }
}
