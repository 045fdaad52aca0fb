//! Generator engine: builds a primitive and persists it as an OBJ job
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GeometryResult;
use crate::geometry::Mesh;
use crate::obj::{self, ObjWriteOptions};
use crate::primitives::{self, Primitive, ShapeKind};

/// File name of the mesh inside each job directory
pub const MESH_FILE_NAME: &str = "mesh.obj";

/// A resolved generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub primitive: Primitive,
    /// Free text the shape was chosen from, kept for the record
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateRequest {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl From<ShapeKind> for GenerateRequest {
    fn from(kind: ShapeKind) -> Self {
        Self::new(Primitive::default_for(kind))
    }
}

/// Informational record of what was generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenMeta {
    pub shape: ShapeKind,
    pub request: GenerateRequest,
}

#[derive(Debug, Clone)]
pub struct GenResult {
    pub mesh: Mesh,
    pub mesh_path: PathBuf,
    pub meta: GenMeta,
}

/// Writes each generated mesh to `<out_dir>/job_<unix-millis>/mesh.obj`
#[derive(Debug, Clone)]
pub struct GeneratorEngine {
    out_dir: PathBuf,
    options: ObjWriteOptions,
}

impl GeneratorEngine {
    /// Create the engine, creating `out_dir` if needed
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> GeometryResult<Self> {
        Self::with_options(out_dir, ObjWriteOptions::default())
    }

    pub fn with_options<P: Into<PathBuf>>(
        out_dir: P,
        options: ObjWriteOptions,
    ) -> GeometryResult<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir, options })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Build the requested primitive and write it to a fresh job directory.
    ///
    /// Invalid parameters fail before anything touches the disk.
    pub fn generate(&self, request: &GenerateRequest) -> GeometryResult<GenResult> {
        let mesh = primitives::generate(&request.primitive)?;

        let job_dir = self.next_job_dir();
        fs::create_dir_all(&job_dir)?;
        let mesh_path = job_dir.join(MESH_FILE_NAME);
        obj::save_obj(&mesh, &mesh_path, &self.options)?;

        let shape = request.primitive.kind();
        info!(%shape, path = %mesh_path.display(), "generated mesh");
        Ok(GenResult {
            mesh,
            mesh_path,
            meta: GenMeta {
                shape,
                request: request.clone(),
            },
        })
    }

    fn next_job_dir(&self) -> PathBuf {
        let stamp = Utc::now().timestamp_millis();
        let base = self.out_dir.join(format!("job_{stamp}"));
        if !base.exists() {
            return base;
        }
        (1..)
            .map(|n| self.out_dir.join(format!("job_{stamp}_{n}")))
            .find(|dir| !dir.exists())
            .unwrap_or(base)
    }
}
