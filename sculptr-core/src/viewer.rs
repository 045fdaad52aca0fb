//! Viewer state: the active mesh, what is derived from it, and the camera
//!
//! A rasterizer reads vertices, faces, normals and the camera from here; it
//! never mutates the mesh. Loading always swaps in a complete new mesh.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::{Camera, CameraConfig, CameraMode};
use crate::error::GeometryResult;
use crate::geometry::{Aabb, Mesh, NormalSet, ShadingMode};
use crate::input::InputState;
use crate::obj;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub shading: ShadingMode,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    mesh: Mesh,
    bounds: Option<Aabb>,
    normals: NormalSet,
    camera: Camera,
}

impl Viewer {
    /// An empty viewer with the camera in its default pose
    pub fn new(config: ViewerConfig, width: u32, height: u32) -> Self {
        let mesh = Mesh::new();
        Self {
            normals: NormalSet::compute(&mesh, config.shading),
            bounds: None,
            mesh,
            camera: Camera::with_config(config.camera, width, height),
        }
    }

    pub fn with_mesh(mesh: Mesh, config: ViewerConfig, width: u32, height: u32) -> Self {
        let mut viewer = Self::new(config, width, height);
        viewer.load_mesh(mesh);
        viewer
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn normals(&self) -> &NormalSet {
        &self.normals
    }

    pub fn shading(&self) -> ShadingMode {
        self.normals.mode()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Replace the active mesh, re-derive bounds and normals, and frame it
    pub fn load_mesh(&mut self, mesh: Mesh) {
        let shading = self.shading();
        self.bounds = mesh.bounds();
        self.normals = NormalSet::compute(&mesh, shading);
        self.mesh = mesh;
        self.reset_view();
    }

    /// Parse `path` and install it. On error the current mesh stays active.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> GeometryResult<()> {
        let mesh = obj::load_obj(path)?;
        self.load_mesh(mesh);
        Ok(())
    }

    /// Parse OBJ text and install it. On error the current mesh stays active.
    pub fn load_obj_str(&mut self, text: &str) -> GeometryResult<()> {
        let mesh = obj::parse_obj(text)?;
        self.load_mesh(mesh);
        Ok(())
    }

    /// Frame the active mesh, or restore the default pose when there is none
    pub fn reset_view(&mut self) {
        self.camera.frame_to_fit(self.bounds.as_ref());
    }

    pub fn set_shading(&mut self, shading: ShadingMode) {
        if shading != self.shading() {
            self.normals = NormalSet::compute(&self.mesh, shading);
        }
    }

    pub fn toggle_shading(&mut self) -> ShadingMode {
        self.set_shading(self.shading().toggled());
        self.shading()
    }

    pub fn toggle_camera_mode(&mut self) -> CameraMode {
        let mode = self.camera.mode.toggled();
        self.camera.set_mode(mode);
        info!(?mode, "camera mode changed");
        mode
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Advance the simulation by `dt` seconds, clamped to the configured maximum
    pub fn advance(&mut self, input: &InputState, dt: f32) {
        let max_dt = self.camera.config().max_dt;
        let dt = if dt.is_finite() { dt.clamp(0.0, max_dt) } else { 0.0 };
        self.camera.advance(input, dt);
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default(), 800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::input::Movement;
    use crate::primitives::{generate, Primitive, ShapeKind};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn sphere() -> Mesh {
        generate(&Primitive::default_for(ShapeKind::Sphere)).unwrap()
    }

    #[test]
    fn test_empty_viewer() {
        let viewer = Viewer::default();
        assert!(viewer.mesh().is_empty());
        assert!(viewer.bounds().is_none());
        assert!(viewer.normals().as_slice().is_empty());
        assert_eq!(viewer.camera().position, Point3::new(0.0, 0.75, 3.5));
    }

    #[test]
    fn test_load_mesh_derives_state() {
        let mut viewer = Viewer::default();
        viewer.load_mesh(sphere());
        assert_eq!(viewer.mesh().vertex_count(), 544);
        assert_eq!(viewer.normals().as_slice().len(), 544);
        let bounds = viewer.bounds().unwrap();
        assert_relative_eq!(bounds.max.y, 0.6, epsilon = 1e-6);
        assert_relative_eq!(viewer.camera().target, bounds.center(), epsilon = 1e-6);
    }

    #[test]
    fn test_failed_load_keeps_mesh() {
        let mut viewer = Viewer::with_mesh(sphere(), ViewerConfig::default(), 800, 600);
        let camera = viewer.camera().clone();
        let err = viewer
            .load_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\n")
            .unwrap_err();
        assert!(matches!(err, GeometryError::Malformed { .. }));
        assert_eq!(viewer.mesh().vertex_count(), 544);
        assert_eq!(viewer.camera(), &camera);
    }

    #[test]
    fn test_non_finite_file_keeps_camera_finite() {
        let mut viewer = Viewer::with_mesh(sphere(), ViewerConfig::default(), 800, 600);
        let camera = viewer.camera().clone();
        for text in ["v inf 0 0\nv 1 1 1\nv 0 1 0\nf 1 2 3\n", "v nan 0 0\n"] {
            let err = viewer.load_obj_str(text).unwrap_err();
            assert!(matches!(err, GeometryError::Malformed { line: 1, .. }));
        }
        assert_eq!(viewer.camera(), &camera);
        assert!(viewer.camera().position.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_degenerate_camera_settings_are_repaired() {
        let mut config = ViewerConfig::default();
        config.camera.near = 2.0;
        config.camera.far = 2.0;
        config.camera.max_dt = -1.0;
        let mut viewer = Viewer::with_mesh(sphere(), config, 800, 600);
        assert!(viewer.camera().near < viewer.camera().far);

        let mut input = InputState::new();
        input.press(Movement::Forward);
        let start = viewer.camera().position;
        viewer.advance(&input, 1.0);
        let moved = (viewer.camera().position - start).norm();
        assert_relative_eq!(moved, 1.5 * 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_shading_toggle_recomputes_normals() {
        let mut viewer = Viewer::with_mesh(sphere(), ViewerConfig::default(), 800, 600);
        assert_eq!(viewer.shading(), ShadingMode::Smooth);
        assert_eq!(viewer.toggle_shading(), ShadingMode::Flat);
        assert_eq!(viewer.normals().as_slice().len(), viewer.mesh().face_count());

        // Shading survives a reload.
        viewer.load_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(viewer.normals(), &NormalSet::PerFace(vec![nalgebra::Vector3::z()]));
    }

    #[test]
    fn test_reset_view_after_moving() {
        let mut viewer = Viewer::with_mesh(sphere(), ViewerConfig::default(), 800, 600);
        let framed = viewer.camera().clone();
        let mut input = InputState::new();
        input.press(Movement::Left);
        input.add_look(40.0, 12.0);
        viewer.advance(&input, 0.016);
        assert_ne!(viewer.camera().position, framed.position);
        viewer.reset_view();
        assert_eq!(viewer.camera(), &framed);
    }

    #[test]
    fn test_advance_clamps_dt() {
        let mut viewer = Viewer::default();
        let start = viewer.camera().position;
        let mut input = InputState::new();
        input.press(Movement::Forward);
        viewer.advance(&input, 10.0);
        let moved = (viewer.camera().position - start).norm();
        assert_relative_eq!(moved, 1.5 * 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_toggle_camera_mode() {
        let mut viewer = Viewer::with_mesh(sphere(), ViewerConfig::default(), 800, 600);
        assert_eq!(viewer.toggle_camera_mode(), CameraMode::Orbit);
        assert_eq!(viewer.toggle_camera_mode(), CameraMode::FreeFly);
    }
}
