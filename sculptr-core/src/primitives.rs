//! Parametric primitive meshes
//!
//! Every generator is a deterministic function of its parameters. All shapes
//! are centred on the origin with +Y up and wound counter-clockwise when seen
//! from outside.
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::Mesh;

/// Smallest accepted `segments` / `rings` value
pub const MIN_RESOLUTION: u32 = 3;

/// The closed set of shapes the generators understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Sphere,
    Torus,
    Cone,
    Cylinder,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Box,
        ShapeKind::Sphere,
        ShapeKind::Torus,
        ShapeKind::Cone,
        ShapeKind::Cylinder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Torus => "torus",
            ShapeKind::Cone => "cone",
            ShapeKind::Cylinder => "cylinder",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" | "cube" => Ok(ShapeKind::Box),
            "sphere" => Ok(ShapeKind::Sphere),
            "torus" => Ok(ShapeKind::Torus),
            "cone" => Ok(ShapeKind::Cone),
            "cylinder" => Ok(ShapeKind::Cylinder),
            _ => Err(GeometryError::UnknownShape(s.to_string())),
        }
    }
}

/// Axis-aligned cube
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxParams {
    /// Edge length
    pub size: f32,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self { size: 1.0 }
    }
}

/// Latitude/longitude sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereParams {
    pub radius: f32,
    /// Longitude samples per ring
    pub segments: u32,
    /// Latitude bands; the mesh has `rings + 1` vertex rows
    pub rings: u32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 0.6,
            segments: 32,
            rings: 16,
        }
    }
}

/// Torus lying in the XZ plane with its hole along Y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusParams {
    /// Distance from the centre to the middle of the tube
    pub major_radius: f32,
    /// Radius of the tube
    pub minor_radius: f32,
    /// Divisions around the main ring
    pub rings: u32,
    /// Divisions around the tube cross-section
    pub segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            major_radius: 0.65,
            minor_radius: 0.22,
            rings: 24,
            segments: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeParams {
    /// Base radius
    pub radius: f32,
    pub height: f32,
    pub segments: u32,
}

impl Default for ConeParams {
    fn default() -> Self {
        Self {
            radius: 0.6,
            height: 1.0,
            segments: 40,
        }
    }
}

/// Cylinder with closed caps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderParams {
    pub radius: f32,
    pub height: f32,
    pub segments: u32,
}

impl Default for CylinderParams {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 1.0,
            segments: 40,
        }
    }
}

/// A shape together with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Primitive {
    Box(BoxParams),
    Sphere(SphereParams),
    Torus(TorusParams),
    Cone(ConeParams),
    Cylinder(CylinderParams),
}

impl Primitive {
    /// The shape with its documented default parameters
    pub fn default_for(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Box => Primitive::Box(BoxParams::default()),
            ShapeKind::Sphere => Primitive::Sphere(SphereParams::default()),
            ShapeKind::Torus => Primitive::Torus(TorusParams::default()),
            ShapeKind::Cone => Primitive::Cone(ConeParams::default()),
            ShapeKind::Cylinder => Primitive::Cylinder(CylinderParams::default()),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Primitive::Box(_) => ShapeKind::Box,
            Primitive::Sphere(_) => ShapeKind::Sphere,
            Primitive::Torus(_) => ShapeKind::Torus,
            Primitive::Cone(_) => ShapeKind::Cone,
            Primitive::Cylinder(_) => ShapeKind::Cylinder,
        }
    }

    /// Reject resolutions below [`MIN_RESOLUTION`] and non-positive dimensions
    pub fn validate(&self) -> GeometryResult<()> {
        match self {
            Primitive::Box(p) => check_dimension("size", p.size),
            Primitive::Sphere(p) => {
                check_dimension("radius", p.radius)?;
                check_resolution("segments", p.segments)?;
                check_resolution("rings", p.rings)
            }
            Primitive::Torus(p) => {
                check_dimension("major_radius", p.major_radius)?;
                check_dimension("minor_radius", p.minor_radius)?;
                check_resolution("rings", p.rings)?;
                check_resolution("segments", p.segments)
            }
            Primitive::Cone(p) => {
                check_dimension("radius", p.radius)?;
                check_dimension("height", p.height)?;
                check_resolution("segments", p.segments)
            }
            Primitive::Cylinder(p) => {
                check_dimension("radius", p.radius)?;
                check_dimension("height", p.height)?;
                check_resolution("segments", p.segments)
            }
        }
    }
}

impl From<ShapeKind> for Primitive {
    fn from(kind: ShapeKind) -> Self {
        Primitive::default_for(kind)
    }
}

/// Build the mesh for `primitive` after validating its parameters
pub fn generate(primitive: &Primitive) -> GeometryResult<Mesh> {
    primitive.validate()?;
    let mesh = match primitive {
        Primitive::Box(p) => box_mesh(p),
        Primitive::Sphere(p) => sphere_mesh(p),
        Primitive::Torus(p) => torus_mesh(p),
        Primitive::Cone(p) => cone_mesh(p),
        Primitive::Cylinder(p) => cylinder_mesh(p),
    };
    debug!(
        shape = %primitive.kind(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "generated primitive"
    );
    Ok(mesh)
}

fn check_resolution(name: &'static str, value: u32) -> GeometryResult<()> {
    if value < MIN_RESOLUTION {
        return Err(GeometryError::invalid_parameter(
            name,
            format!("must be at least {MIN_RESOLUTION}, got {value}"),
        ));
    }
    Ok(())
}

fn check_dimension(name: &'static str, value: f32) -> GeometryResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GeometryError::invalid_parameter(
            name,
            format!("must be a positive finite number, got {value}"),
        ));
    }
    Ok(())
}

fn box_mesh(p: &BoxParams) -> Mesh {
    let s = p.size * 0.5;
    let mut mesh = Mesh::with_capacity(8, 12);
    for (x, y, z) in [
        (-s, -s, -s),
        (s, -s, -s),
        (s, s, -s),
        (-s, s, -s),
        (-s, -s, s),
        (s, -s, s),
        (s, s, s),
        (-s, s, s),
    ] {
        mesh.push_vertex(x, y, z);
    }

    // Back, front, bottom, top, right, left
    for [a, b, c] in [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [1, 2, 6],
        [1, 6, 5],
        [0, 4, 7],
        [0, 7, 3],
    ] {
        mesh.push_face(a, b, c);
    }
    mesh
}

fn sphere_mesh(p: &SphereParams) -> Mesh {
    let (segments, rings) = (p.segments, p.rings);
    let mut mesh = Mesh::with_capacity(
        ((rings + 1) * segments) as usize,
        (2 * segments * (rings - 1)) as usize,
    );

    for i in 0..=rings {
        let theta = PI * i as f32 / rings as f32;
        let y = p.radius * theta.cos();
        let r = p.radius * theta.sin();
        for j in 0..segments {
            let phi = TAU * j as f32 / segments as f32;
            mesh.push_vertex(r * phi.cos(), y, r * phi.sin());
        }
    }

    let index = |i: u32, j: u32| i * segments + j % segments;
    for i in 0..rings {
        for j in 0..segments {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            if i == 0 {
                // Row `a`/`d` is the collapsed north pole
                mesh.push_face(a, c, b);
            } else if i == rings - 1 {
                // Row `b`/`c` is the collapsed south pole
                mesh.push_face(a, d, b);
            } else {
                mesh.push_face(a, c, b);
                mesh.push_face(a, d, c);
            }
        }
    }
    mesh
}

fn torus_mesh(p: &TorusParams) -> Mesh {
    let (rings, segments) = (p.rings, p.segments);
    let mut mesh =
        Mesh::with_capacity((rings * segments) as usize, (2 * rings * segments) as usize);

    for i in 0..rings {
        let u = TAU * i as f32 / rings as f32;
        let (su, cu) = u.sin_cos();
        for j in 0..segments {
            let v = TAU * j as f32 / segments as f32;
            let (sv, cv) = v.sin_cos();
            let ring_radius = p.major_radius + p.minor_radius * cv;
            mesh.push_vertex(ring_radius * cu, p.minor_radius * sv, ring_radius * su);
        }
    }

    let index = |i: u32, j: u32| (i % rings) * segments + j % segments;
    for i in 0..rings {
        for j in 0..segments {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            mesh.push_face(a, c, b);
            mesh.push_face(a, d, c);
        }
    }
    mesh
}

fn cone_mesh(p: &ConeParams) -> Mesh {
    let segments = p.segments;
    let half = p.height * 0.5;
    let mut mesh = Mesh::with_capacity(segments as usize + 2, 2 * segments as usize);

    for j in 0..segments {
        let phi = TAU * j as f32 / segments as f32;
        mesh.push_vertex(p.radius * phi.cos(), -half, p.radius * phi.sin());
    }
    let apex = mesh.push_vertex(0.0, half, 0.0);
    let base_center = mesh.push_vertex(0.0, -half, 0.0);

    for a in 0..segments {
        let b = (a + 1) % segments;
        mesh.push_face(a, apex, b);
        mesh.push_face(base_center, a, b);
    }
    mesh
}

fn cylinder_mesh(p: &CylinderParams) -> Mesh {
    let segments = p.segments;
    let half = p.height * 0.5;
    let mut mesh = Mesh::with_capacity(2 * segments as usize + 2, 4 * segments as usize);

    let mut top = Vec::with_capacity(segments as usize);
    let mut bottom = Vec::with_capacity(segments as usize);
    for j in 0..segments {
        let phi = TAU * j as f32 / segments as f32;
        let (x, z) = (p.radius * phi.cos(), p.radius * phi.sin());
        top.push(mesh.push_vertex(x, half, z));
        bottom.push(mesh.push_vertex(x, -half, z));
    }
    let top_center = mesh.push_vertex(0.0, half, 0.0);
    let bottom_center = mesh.push_vertex(0.0, -half, 0.0);

    for j in 0..segments as usize {
        let next = (j + 1) % segments as usize;
        let (a, b) = (bottom[j], bottom[next]);
        let (c, d) = (top[next], top[j]);
        mesh.push_face(a, c, b);
        mesh.push_face(a, d, c);
        mesh.push_face(top_center, c, d);
        mesh.push_face(bottom_center, a, b);
    }
    mesh
}
