//! Camera model: orientation, framing and motion integration
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::Aabb;
use crate::input::{InputState, Movement};
use crate::math::{self, Vec3};

/// Pitch is kept inside `[-PITCH_LIMIT, PITCH_LIMIT]` degrees
pub const PITCH_LIMIT: f32 = 89.9;

/// Accepted vertical field of view range in degrees
pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 179.0;

/// How the camera position evolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Position integrated directly from held movement keys
    #[default]
    FreeFly,
    /// Position derived from `target - forward * distance`
    Orbit,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::FreeFly => Self::Orbit,
            Self::Orbit => Self::FreeFly,
        }
    }
}

/// Camera tunables. Angles are in degrees, speeds in units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub mode: CameraMode,
    /// Vertical field of view
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub move_speed: f32,
    /// Speed factor while the fast modifier is held
    pub fast_multiplier: f32,
    /// Degrees of yaw/pitch per pixel of mouse movement
    pub look_sensitivity: f32,
    /// Orbit yaw/pitch rate in degrees per second
    pub orbit_rate: f32,
    /// Orbit zoom rate in units per second
    pub zoom_rate: f32,
    pub min_distance: f32,
    /// Padding factor `k` in `d = k * extent / sin(fov / 2)`
    pub fit_padding: f32,
    /// Floor for the framed extent so empty or flat meshes still get a sane distance
    pub min_extent: f32,
    pub default_yaw: f32,
    pub default_pitch: f32,
    pub default_position: [f32; 3],
    pub default_distance: f32,
    /// Scroll dolly step as a fraction of `move_speed` per notch
    pub scroll_dolly: f32,
    /// Longest tick a viewer integrates in one step
    pub max_dt: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::FreeFly,
            fov: 45.0,
            near: 0.05,
            far: 500.0,
            move_speed: 1.5,
            fast_multiplier: 2.25,
            look_sensitivity: 0.2,
            orbit_rate: 90.0,
            zoom_rate: 2.0,
            min_distance: 0.1,
            fit_padding: 1.1,
            min_extent: 0.25,
            default_yaw: 35.0,
            default_pitch: -20.0,
            default_position: [0.0, 0.75, 3.5],
            default_distance: 3.5,
            scroll_dolly: 0.75,
            max_dt: 0.05,
        }
    }
}

impl CameraConfig {
    /// Copy of this config with unusable values replaced by the defaults.
    ///
    /// Guarantees `0 < near < far`, `fov` within `[MIN_FOV, MAX_FOV]` and
    /// finite positive rates, floors and paddings.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let near = positive_or("near", self.near, defaults.near);
        let far = if self.far.is_finite() && self.far > near {
            self.far
        } else {
            let far = defaults.far.max(near * 1000.0);
            warn!(value = self.far, fallback = far, "invalid camera setting `far`");
            far
        };
        let fov = if self.fov.is_finite() {
            self.fov.clamp(MIN_FOV, MAX_FOV)
        } else {
            warn!(fallback = defaults.fov, "invalid camera setting `fov`");
            defaults.fov
        };

        Self {
            mode: self.mode,
            fov,
            near,
            far,
            move_speed: non_negative_or("move_speed", self.move_speed, defaults.move_speed),
            fast_multiplier: positive_or(
                "fast_multiplier",
                self.fast_multiplier,
                defaults.fast_multiplier,
            ),
            look_sensitivity: non_negative_or(
                "look_sensitivity",
                self.look_sensitivity,
                defaults.look_sensitivity,
            ),
            orbit_rate: non_negative_or("orbit_rate", self.orbit_rate, defaults.orbit_rate),
            zoom_rate: non_negative_or("zoom_rate", self.zoom_rate, defaults.zoom_rate),
            min_distance: positive_or("min_distance", self.min_distance, defaults.min_distance),
            fit_padding: positive_or("fit_padding", self.fit_padding, defaults.fit_padding),
            min_extent: positive_or("min_extent", self.min_extent, defaults.min_extent),
            default_yaw: finite_or("default_yaw", self.default_yaw, defaults.default_yaw),
            default_pitch: finite_or("default_pitch", self.default_pitch, defaults.default_pitch),
            default_position: if self.default_position.iter().all(|c| c.is_finite()) {
                self.default_position
            } else {
                warn!("invalid camera setting `default_position`");
                defaults.default_position
            },
            default_distance: positive_or(
                "default_distance",
                self.default_distance,
                defaults.default_distance,
            ),
            scroll_dolly: non_negative_or("scroll_dolly", self.scroll_dolly, defaults.scroll_dolly),
            max_dt: positive_or("max_dt", self.max_dt, defaults.max_dt),
        }
    }
}

fn finite_or(name: &'static str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        warn!(value, fallback, "invalid camera setting `{name}`");
        fallback
    }
}

fn positive_or(name: &'static str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!(value, fallback, "invalid camera setting `{name}`");
        fallback
    }
}

fn non_negative_or(name: &'static str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(value, fallback, "invalid camera setting `{name}`");
        fallback
    }
}

/// Orthonormal view basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Basis {
    /// Basis for `yaw` and `pitch` in degrees with world up fixed at +Y
    pub fn from_angles(yaw: f32, pitch: f32) -> Self {
        let (sy, cy) = yaw.to_radians().sin_cos();
        let (sp, cp) = pitch.to_radians().sin_cos();
        let forward = math::normalize(Vec3::new(cp * sy, sp, cp * cy));
        let right = math::normalize(math::cross(forward, Vector3::y()));
        let up = math::normalize(math::cross(right, forward));
        Self { forward, right, up }
    }
}

/// Perspective camera shared by the free-fly and orbit modes
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Orbit pivot; the framed mesh centre after a fit
    pub target: Point3<f32>,
    /// Degrees
    pub yaw: f32,
    /// Degrees, clamped to `[-PITCH_LIMIT, PITCH_LIMIT]`
    pub pitch: f32,
    pub distance: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: CameraMode,
    config: CameraConfig,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(CameraConfig::default(), width, height)
    }

    /// Camera for a `width` x `height` viewport. Out-of-range settings are
    /// replaced, see [`CameraConfig::sanitized`].
    pub fn with_config(config: CameraConfig, width: u32, height: u32) -> Self {
        let config = config.sanitized();
        let mut camera = Self {
            position: Point3::origin(),
            target: Point3::origin(),
            yaw: 0.0,
            pitch: 0.0,
            distance: config.default_distance,
            fov: config.fov,
            aspect: 1.0,
            near: config.near,
            far: config.far,
            mode: config.mode,
            config,
        };
        camera.set_viewport(width, height);
        camera.reset();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.set_aspect(width as f32 / height.max(1) as f32);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn basis(&self) -> Basis {
        Basis::from_angles(self.yaw, self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().forward
    }

    /// Restore the default pose used when there is nothing to frame
    pub fn reset(&mut self) {
        let [x, y, z] = self.config.default_position;
        self.yaw = self.config.default_yaw;
        self.pitch = clamp_pitch(self.config.default_pitch);
        self.position = Point3::new(x, y, z);
        self.distance = self.config.default_distance;
        self.target = self.position + self.forward() * self.distance;
        self.far = self.config.far;
    }

    /// Place the camera so `bounds` fills the view from the default angle.
    ///
    /// `None` (an empty mesh) falls back to [`Camera::reset`].
    pub fn frame_to_fit(&mut self, bounds: Option<&Aabb>) {
        let Some(bounds) = bounds else {
            self.reset();
            return;
        };

        let center = bounds.center();
        let extent = bounds.extent().max(self.config.min_extent);
        let half_fov = (self.fov.to_radians() * 0.5).max(f32::EPSILON);
        let distance = self.config.fit_padding * extent / half_fov.sin();
        let far = distance + extent * 2.0;
        if !far.is_finite() || center.iter().any(|c| !c.is_finite()) {
            warn!(?bounds, "cannot frame non-finite bounds, resetting view");
            self.reset();
            return;
        }

        self.yaw = self.config.default_yaw;
        self.pitch = clamp_pitch(self.config.default_pitch);
        self.target = center;
        self.distance = distance;
        self.position = center - self.forward() * distance;
        self.far = self.config.far.max(far);

        debug!(extent, distance, "framed bounds");
    }

    /// Switch modes without moving the view
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == CameraMode::Orbit && self.mode != CameraMode::Orbit {
            self.distance = self.distance.max(self.config.min_distance);
            self.target = self.position + self.forward() * self.distance;
        }
        self.mode = mode;
    }

    /// Mouse look: `dx`/`dy` in pixels, +y down
    pub fn look(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let sensitivity = self.config.look_sensitivity;
        self.yaw += dx * sensitivity;
        self.pitch = clamp_pitch(self.pitch - dy * sensitivity);
        if self.mode == CameraMode::Orbit {
            self.update_orbit_position();
        }
    }

    /// Scroll: dolly along `forward` in free-fly, change `distance` in orbit
    pub fn scroll(&mut self, notches: f32) {
        if !notches.is_finite() || notches == 0.0 {
            return;
        }
        let step = notches * self.config.move_speed * self.config.scroll_dolly;
        match self.mode {
            CameraMode::FreeFly => self.position += self.forward() * step,
            CameraMode::Orbit => {
                self.distance = (self.distance - step).max(self.config.min_distance);
                self.update_orbit_position();
            }
        }
    }

    /// Integrate one tick of input. Never fails; a bad `dt` counts as zero.
    pub fn advance(&mut self, input: &InputState, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.look(input.look_delta.x, input.look_delta.y);
        self.scroll(input.scroll_delta);
        match self.mode {
            CameraMode::FreeFly => self.integrate_free_fly(input, dt),
            CameraMode::Orbit => self.integrate_orbit(input, dt),
        }
    }

    fn speed_factor(&self, input: &InputState) -> f32 {
        if input.fast {
            self.config.fast_multiplier
        } else {
            1.0
        }
    }

    fn integrate_free_fly(&mut self, input: &InputState, dt: f32) {
        let Basis { forward, right, up } = self.basis();
        let mut direction = Vec3::zeros();
        for movement in &input.held {
            direction += match movement {
                Movement::Forward => forward,
                Movement::Back => -forward,
                Movement::Right => right,
                Movement::Left => -right,
                Movement::Up => up,
                Movement::Down => -up,
            };
        }
        let direction = math::normalize(direction);
        let speed = self.config.move_speed * self.speed_factor(input);
        self.position += math::scale(direction, speed * dt);
    }

    fn integrate_orbit(&mut self, input: &InputState, dt: f32) {
        let factor = self.speed_factor(input);
        let angle = self.config.orbit_rate * factor * dt;
        self.yaw += input.axis(Movement::Right, Movement::Left) * angle;
        self.pitch = clamp_pitch(self.pitch - input.axis(Movement::Up, Movement::Down) * angle);

        let zoom = self.config.zoom_rate * factor * dt;
        self.distance = (self.distance - input.axis(Movement::Forward, Movement::Back) * zoom)
            .max(self.config.min_distance);
        self.update_orbit_position();
    }

    /// Recompute the orbit position from scratch so it never drifts
    fn update_orbit_position(&mut self) {
        self.position = self.target - self.forward() * self.distance;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let Basis { forward, up, .. } = self.basis();
        Matrix4::look_at_rh(&self.position, &(self.position + forward), &up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Normalised device coordinates of `point`, `None` when it is behind the camera
    pub fn project(&self, point: &Point3<f32>) -> Option<Point3<f32>> {
        project_point(&self.view_projection(), point)
    }

    /// Project a 3D point to 2D screen space, `None` when outside the view volume
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let ndc = self.project(point)?;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Apply a precomputed [`Camera::view_projection`] to `point`.
///
/// Returns normalised device coordinates, or `None` when the point is behind
/// the eye.
pub fn project_point(view_projection: &Matrix4<f32>, point: &Point3<f32>) -> Option<Point3<f32>> {
    let clip = view_projection * point.to_homogeneous();
    if clip.w <= 1e-6 {
        return None;
    }
    Some(Point3::from(clip.xyz() / clip.w))
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}
