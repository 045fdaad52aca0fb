//! Indexed triangle mesh, bounding box and normals
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};
use crate::math::{self, Vec3};

/// Three vertex indices forming one triangle
pub type Face = [u32; 3];

/// A triangle resolved to its three corner positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Flat normal `normalize((b - a) x (c - a))`; zero for degenerate triangles
    pub fn calculate_normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        math::normalize(math::cross(b - a, c - a))
    }

    pub fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }
}

/// An indexed triangle mesh.
///
/// Vertices are addressed only by their position in `vertices`. Every face
/// index is guaranteed to be in range; nothing else (winding, closedness,
/// manifoldness) is assumed, so degenerate triangles at sphere poles or a
/// cone apex are fine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Point3<f32>>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Build a mesh from existing buffers, rejecting out-of-range face indices
    pub fn from_parts(vertices: Vec<Point3<f32>>, faces: Vec<Face>) -> GeometryResult<Self> {
        if let Some(i) = vertices.iter().position(|v| v.iter().any(|c| !c.is_finite())) {
            return Err(GeometryError::invalid_parameter(
                "vertices",
                format!("vertex {i} has a non-finite coordinate"),
            ));
        }
        let vertex_count = vertices.len();
        for (i, face) in faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&index| index as usize >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange {
                    line: i + 1,
                    index: i64::from(index),
                    vertex_count,
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex and return its index
    pub(crate) fn push_vertex(&mut self, x: f32, y: f32, z: f32) -> u32 {
        self.vertices.push(Point3::new(x, y, z));
        (self.vertices.len() - 1) as u32
    }

    /// Append a face. Callers are responsible for the indices being in range.
    pub(crate) fn push_face(&mut self, a: u32, b: u32, c: u32) {
        debug_assert!([a, b, c]
            .iter()
            .all(|&i| (i as usize) < self.vertices.len()));
        self.faces.push([a, b, c]);
    }

    pub fn triangle(&self, face: usize) -> Triangle {
        let [a, b, c] = self.faces[face];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).map(move |i| self.triangle(i))
    }

    /// Bounding box of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter())
    }

    /// One flat normal per face
    pub fn face_normals(&self) -> Vec<Vec3> {
        self.triangles().map(|t| t.calculate_normal()).collect()
    }

    /// One smooth normal per vertex, accumulated from adjacent face normals.
    ///
    /// Vertices not referenced by any face keep the zero vector.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut accumulated = vec![Vec3::zeros(); self.vertices.len()];
        for (face, normal) in self.faces.iter().zip(self.face_normals()) {
            for &index in face {
                accumulated[index as usize] += normal;
            }
        }
        for normal in &mut accumulated {
            *normal = math::normalize(*normal);
        }
        accumulated
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Componentwise min/max over `points`; `None` when there are no points
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point3<f32>>) -> Option<Self> {
        let first = *points.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in points {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Width, height and depth
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of width, height and depth
    pub fn extent(&self) -> f32 {
        self.size().max()
    }

    /// Inclusive containment test
    pub fn contains(&self, point: &Point3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Which normals a viewer derives for lighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// One normal per face
    Flat,
    /// One normal per vertex
    #[default]
    Smooth,
}

impl ShadingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Flat => Self::Smooth,
            Self::Smooth => Self::Flat,
        }
    }
}

/// Normals derived from a mesh, either per face or per vertex
#[derive(Debug, Clone, PartialEq)]
pub enum NormalSet {
    PerFace(Vec<Vec3>),
    PerVertex(Vec<Vec3>),
}

impl NormalSet {
    pub fn compute(mesh: &Mesh, mode: ShadingMode) -> Self {
        match mode {
            ShadingMode::Flat => Self::PerFace(mesh.face_normals()),
            ShadingMode::Smooth => Self::PerVertex(mesh.vertex_normals()),
        }
    }

    pub fn mode(&self) -> ShadingMode {
        match self {
            Self::PerFace(_) => ShadingMode::Flat,
            Self::PerVertex(_) => ShadingMode::Smooth,
        }
    }

    pub fn as_slice(&self) -> &[Vec3] {
        match self {
            Self::PerFace(normals) | Self::PerVertex(normals) => normals,
        }
    }

    /// Normals for the three corners of `face`.
    ///
    /// A zero vector means no normal is available for that corner.
    pub fn corner_normals(&self, mesh: &Mesh, face: usize) -> [Vec3; 3] {
        match self {
            Self::PerFace(normals) => [normals[face]; 3],
            Self::PerVertex(normals) => {
                let [a, b, c] = mesh.faces()[face];
                [
                    normals[a as usize],
                    normals[b as usize],
                    normals[c as usize],
                ]
            }
        }
    }
}
