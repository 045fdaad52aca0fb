//! Sculptr Core - procedural mesh pipeline
//!
//! Primitive generation, the OBJ interchange codec, derived geometry
//! (bounds and normals) and the camera model that frames and navigates a
//! mesh. Everything here is synchronous and free of rendering concerns.

pub mod camera;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod input;
pub mod math;
pub mod obj;
pub mod primitives;
pub mod viewer;

// Re-export commonly used types
pub use camera::{Basis, Camera, CameraConfig, CameraMode};
pub use error::{GeometryError, GeometryResult};
pub use generator::{GenMeta, GenResult, GenerateRequest, GeneratorEngine};
pub use geometry::{Aabb, Face, Mesh, NormalSet, ShadingMode, Triangle};
pub use input::{InputState, Movement};
pub use math::Vec3;
pub use obj::{load_obj, parse_obj, save_obj, write_obj, ObjWriteOptions};
pub use primitives::{generate, Primitive, ShapeKind};
pub use viewer::{Viewer, ViewerConfig};
