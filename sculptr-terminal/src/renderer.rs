//! ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use sculptr_core::camera::project_point;
use sculptr_core::Viewer;
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 0.5;

const LIGHT_POSITION: [f32; 3] = [5.0, 8.0, 5.0];
const AMBIENT: f32 = 0.15;
const DIFFUSE: f32 = 0.85;

/// Ground grid on the y = 0 plane: lines every `GRID_STEP` out to `GRID_HALF` steps
const GRID_HALF: i32 = 20;
const GRID_STEP: f32 = 1.0;
/// World-space spacing of the points sampled along each grid line
const GRID_SAMPLE: f32 = 0.02;
const GRID_CHAR: char = '.';
const X_AXIS_CHAR: char = 'x';
const Z_AXIS_CHAR: char = 'z';

/// Projection aspect ratio for a grid of `width` x `height` cells
pub fn viewport_aspect(width: usize, height: usize) -> f32 {
    width as f32 * CELL_ASPECT / height.max(1) as f32
}

/// A projected corner: screen position, depth and light intensity
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    intensity: f32,
}

/// ASCII renderer that converts the viewer's mesh to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    grid: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            grid: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let grid = self.grid;
        *self = Self::new(width, height);
        self.grid = grid;
    }

    pub fn grid(&self) -> bool {
        self.grid
    }

    pub fn set_grid(&mut self, grid: bool) {
        self.grid = grid;
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.grid = !self.grid;
        self.grid
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Rasterize the grid (when enabled) and the active mesh with the viewer's
    /// camera and normals
    pub fn render(&mut self, viewer: &Viewer) {
        let mesh = viewer.mesh();
        let normals = viewer.normals();
        let view_projection = viewer.camera().view_projection();

        if self.grid {
            self.render_grid(&view_projection);
        }

        for (face, triangle) in mesh.triangles().enumerate() {
            let corner_normals = normals.corner_normals(mesh, face);
            let mut corners = [None; 3];
            for (i, position) in triangle.vertices.iter().enumerate() {
                let Some((x, y, depth)) = self.to_screen(&view_projection, position) else {
                    break;
                };
                corners[i] = Some(ScreenVertex {
                    x,
                    y,
                    depth,
                    intensity: shade(position, &corner_normals[i]),
                });
            }

            // Triangles crossing the near or far plane are dropped.
            if let [Some(a), Some(b), Some(c)] = corners {
                self.rasterize_triangle([a, b, c]);
            }
        }
    }

    /// Screen position and depth, `None` outside the near and far planes
    fn to_screen(
        &self,
        view_projection: &Matrix4<f32>,
        point: &Point3<f32>,
    ) -> Option<(f32, f32, f32)> {
        let ndc = project_point(view_projection, point)?;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some((
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            ndc.z,
        ))
    }

    /// Floor grid with the X and Z axes marked, depth tested like the mesh
    fn render_grid(&mut self, view_projection: &Matrix4<f32>) {
        let half = GRID_HALF as f32 * GRID_STEP;
        for i in -GRID_HALF..=GRID_HALF {
            let offset = i as f32 * GRID_STEP;
            let (along_x, along_z) = if i == 0 {
                (X_AXIS_CHAR, Z_AXIS_CHAR)
            } else {
                (GRID_CHAR, GRID_CHAR)
            };
            self.plot_line(
                view_projection,
                Point3::new(-half, 0.0, offset),
                Point3::new(half, 0.0, offset),
                along_x,
            );
            self.plot_line(
                view_projection,
                Point3::new(offset, 0.0, -half),
                Point3::new(offset, 0.0, half),
                along_z,
            );
        }
    }

    fn plot_line(
        &mut self,
        view_projection: &Matrix4<f32>,
        from: Point3<f32>,
        to: Point3<f32>,
        c: char,
    ) {
        let samples = ((to - from).norm() / GRID_SAMPLE).ceil().max(1.0) as usize;
        for step in 0..=samples {
            let point = from + (to - from) * (step as f32 / samples as f32);
            let Some((x, y, depth)) = self.to_screen(view_projection, &point) else {
                continue;
            };
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.width || y >= self.height {
                continue;
            }
            let idx = y * self.width + x;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = c;
            }
        }
    }

    fn rasterize_triangle(&mut self, coords: [ScreenVertex; 3]) {
        let [v0, v1, v2] = coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth and light
                        let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                        let intensity =
                            w0 * v0.intensity + w1 * v1.intensity + w2 * v2.intensity;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = ramp_char(intensity);
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_at(x, y);

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    X_AXIS_CHAR => Color::Red,
                    Z_AXIS_CHAR => Color::DarkCyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Ambient plus diffuse light from a point light; zero normals get ambient only
fn shade(position: &Point3<f32>, normal: &Vector3<f32>) -> f32 {
    let to_light = sculptr_core::math::normalize(Point3::from(LIGHT_POSITION) - position);
    AMBIENT + DIFFUSE * normal.dot(&to_light).max(0.0)
}

fn ramp_char(intensity: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    // Index 0 is blank, keep lit surfaces visible.
    let index = (intensity.clamp(0.0, 1.0) * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, last)]
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

#[cfg(test)]
mod tests {
    use super::*;
    use sculptr_core::{generate, CameraConfig, Primitive, ShapeKind, ViewerConfig};

    fn framed(kind: ShapeKind, width: usize, height: usize) -> Viewer {
        let mesh = generate(&Primitive::default_for(kind)).unwrap();
        let mut viewer = Viewer::with_mesh(mesh, ViewerConfig::default(), 1, 1);
        viewer.camera_mut().set_aspect(viewport_aspect(width, height));
        viewer
    }

    fn lit_cells(renderer: &AsciiRenderer) -> usize {
        (0..renderer.height())
            .flat_map(|y| (0..renderer.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.char_at(x, y) != ' ')
            .count()
    }

    #[test]
    fn test_empty_viewer_renders_blank() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.set_grid(false);
        renderer.render(&Viewer::default());
        assert_eq!(lit_cells(&renderer), 0);
    }

    #[test]
    fn test_grid_toggle() {
        let mut renderer = AsciiRenderer::new(40, 20);
        assert!(renderer.grid());
        renderer.render(&Viewer::default());
        assert!(lit_cells(&renderer) > 0);
        for y in 0..20 {
            for x in 0..40 {
                let c = renderer.char_at(x, y);
                assert!(matches!(c, ' ' | GRID_CHAR | X_AXIS_CHAR | Z_AXIS_CHAR), "{c}");
            }
        }

        assert!(!renderer.toggle_grid());
        renderer.clear();
        renderer.render(&Viewer::default());
        assert_eq!(lit_cells(&renderer), 0);

        renderer.resize(20, 10);
        assert!(!renderer.grid());
    }

    #[test]
    fn test_degenerate_camera_settings_render() {
        let config = ViewerConfig {
            camera: CameraConfig {
                near: 1.0,
                far: 1.0,
                fov: 0.0,
                ..CameraConfig::default()
            },
            ..ViewerConfig::default()
        };
        let mesh = generate(&Primitive::default_for(ShapeKind::Sphere)).unwrap();
        let mut viewer = Viewer::with_mesh(mesh, config, 80, 24);
        viewer.camera_mut().set_aspect(viewport_aspect(80, 24));
        let mut renderer = AsciiRenderer::new(80, 24);
        renderer.render(&viewer);
        assert!(lit_cells(&renderer) > 0);
    }

    #[test]
    fn test_framed_mesh_is_visible_and_centered() {
        for kind in ShapeKind::ALL {
            let mut renderer = AsciiRenderer::new(80, 40);
            renderer.set_grid(false);
            renderer.render(&framed(kind, 80, 40));
            assert!(lit_cells(&renderer) > 20, "{kind} barely visible");
            if kind != ShapeKind::Torus {
                assert_ne!(renderer.char_at(40, 20), ' ', "{kind} not centered");
            }
            // Framing leaves a margin around the mesh.
            assert_eq!(renderer.char_at(0, 0), ' ');
            assert_eq!(renderer.char_at(79, 39), ' ');
        }
    }

    #[test]
    fn test_clear_resets_buffers() {
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render(&framed(ShapeKind::Box, 80, 40));
        assert!(lit_cells(&renderer) > 0);
        renderer.clear();
        assert_eq!(lit_cells(&renderer), 0);
    }

    #[test]
    fn test_draw_emits_every_cell() {
        let renderer = AsciiRenderer::new(4, 3);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_ramp_char_bounds() {
        assert_eq!(ramp_char(0.0), '.');
        assert_eq!(ramp_char(1.0), '@');
        assert_eq!(ramp_char(7.0), '@');
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
    }
}
