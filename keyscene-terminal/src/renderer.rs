/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use keyscene_core::{DrawItem, Frame, Material, Triangle};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Fixed world-space light, pointing from the scene towards the light
const LIGHT_DIR: [f32; 3] = [0.3, 0.5, 1.0];

/// Share of brightness every lit face gets regardless of orientation
const AMBIENT: f32 = 0.2;

/// A projected vertex: screen x, screen y, NDC depth
type ScreenVertex = (f32, f32, f32);

/// ASCII renderer that converts draw items to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Rasterize every item of `frame`
    pub fn render_frame(&mut self, frame: &Frame) {
        let view_projection = Matrix4::from_column_slice(&frame.view_projection);
        for item in &frame.items {
            self.render_item(item, &view_projection);
        }
    }

    pub fn render_item(&mut self, item: &DrawItem, view_projection: &Matrix4<f32>) {
        let model = Matrix4::from_column_slice(&item.world_matrix);
        let mvp = view_projection * model;
        let normal_matrix = model.fixed_view::<3, 3>(0, 0).into_owned();

        for triangle in item.geometry.triangles() {
            self.render_triangle(&triangle, &mvp, &normal_matrix, &item.material);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        mvp: &Matrix4<f32>,
        normal_matrix: &Matrix3<f32>,
        material: &Material,
    ) {
        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            let p = vertex.position;
            match self.project(mvp, Vector4::new(p.x as f32, p.y as f32, p.z as f32, 1.0)) {
                Some(projected) => *slot = projected,
                // Behind the camera or outside the depth range
                None => return,
            }
        }

        let brightness = match triangle.calculate_normal() {
            Some(n) => {
                let world = (normal_matrix * Vector3::new(n.x as f32, n.y as f32, n.z as f32))
                    .try_normalize(1e-6)
                    .unwrap_or_else(Vector3::zeros);
                let light = Vector3::from(LIGHT_DIR).normalize();
                AMBIENT + (1.0 - AMBIENT) * world.dot(&light).max(0.0)
            }
            None => return,
        };

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        self.rasterize_triangle(&screen, character, shade(material, brightness));
    }

    /// Clip-space to screen-space with the perspective divide
    fn project(&self, mvp: &Matrix4<f32>, point: Vector4<f32>) -> Option<ScreenVertex> {
        let clip = mvp * point;

        // Prevent division by near-zero or negative w
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;

        if !(-1.0..=1.0).contains(&ndc_z) {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * self.height as f32;
        Some((screen_x, screen_y, ndc_z))
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenVertex; 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // Smaller NDC depth is closer to the camera
                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    /// Number of cells covered by geometry
    pub fn coverage(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Plain text rows, without colour codes
    pub fn to_text(&self) -> String {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Material diffuse colour dimmed by `brightness`
fn shade(material: &Material, brightness: f32) -> Color {
    let [r, g, b] = material.diffuse.map(|c| (c * brightness).clamp(0.0, 1.0) * 255.0);
    Color::Rgb {
        r: r as u8,
        g: g as u8,
        b: b as u8,
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
