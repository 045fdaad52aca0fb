//! Wavefront OBJ subset reader and writer
//!
//! Only `v` and `f` records are interpreted. Comments (`#`), blank lines and
//! other record types (`o`, `g`, `vn`, `vt`, `s`, `usemtl`, ...) are skipped.
//!
//! ```text
//! # comment
//! o name
//! v <x> <y> <z>
//! f <i1>[/<t1>[/<n1>]] <i2>... <i3>... [more]
//! ```
//!
//! Face indices are 1-based; negative indices count back from the last vertex
//! read so far. Polygons with more than three corners are split into a fan
//! around their first corner.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nom::{
    character::complete::{char, i64 as index},
    combinator::{all_consuming, opt, rest},
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::Mesh;

/// Formatting options for [`write_obj`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjWriteOptions {
    /// Digits after the decimal point for vertex coordinates
    pub precision: usize,
    /// Emitted as an `o <name>` record ahead of the vertices.
    /// Stored as `""` when absent so that `None` survives a settings file.
    #[serde(with = "object_name")]
    pub object_name: Option<String>,
}

mod object_name {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(name: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(name.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Some(name).filter(|name| !name.is_empty()))
    }
}

impl Default for ObjWriteOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            object_name: Some("generated".to_string()),
        }
    }
}

/// Write `mesh` as OBJ text: all vertices in order, then all faces in order
pub fn write_obj<W: Write>(
    mesh: &Mesh,
    writer: &mut W,
    options: &ObjWriteOptions,
) -> std::io::Result<()> {
    if let Some(name) = options.object_name.as_deref().filter(|name| !name.is_empty()) {
        writeln!(writer, "o {name}")?;
    }
    let p = options.precision;
    for v in mesh.vertices() {
        writeln!(writer, "v {:.p$} {:.p$} {:.p$}", v.x, v.y, v.z)?;
    }
    for [a, b, c] in mesh.faces() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

pub fn to_obj_string(mesh: &Mesh, options: &ObjWriteOptions) -> String {
    let mut out = Vec::new();
    // Writing into a Vec<u8> cannot fail.
    let _ = write_obj(mesh, &mut out, options);
    String::from_utf8_lossy(&out).into_owned()
}

/// Write `mesh` to a file at `path`
pub fn save_obj<P: AsRef<Path>>(
    mesh: &Mesh,
    path: P,
    options: &ObjWriteOptions,
) -> GeometryResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut writer, options)?;
    writer.flush()?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "saved mesh"
    );
    Ok(())
}

/// Parse OBJ text into a mesh. Any malformed record fails the whole parse.
pub fn parse_obj(input: &str) -> GeometryResult<Mesh> {
    read_obj(input.as_bytes())
}

/// Load a mesh from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> GeometryResult<Mesh> {
    let path = path.as_ref();
    let mesh = read_obj(BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Parse OBJ records from any buffered reader
pub fn read_obj<R: BufRead>(reader: R) -> GeometryResult<Mesh> {
    let mut parser = ObjParser::default();
    for (i, line) in reader.lines().enumerate() {
        parser.parse_line(i + 1, &line?)?;
    }
    parser.finish()
}

#[derive(Default)]
struct ObjParser {
    mesh: Mesh,
    corners: Vec<u32>,
    skipped: usize,
}

impl ObjParser {
    fn parse_line(&mut self, line_no: usize, line: &str) -> GeometryResult<()> {
        let content = match line.find('#') {
            Some(at) => &line[..at],
            None => line,
        };
        let mut tokens = content.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(());
        };

        match keyword {
            "v" => {
                let mut coords = [0.0f32; 3];
                for (axis, coord) in coords.iter_mut().enumerate() {
                    let token = tokens.next().ok_or_else(|| {
                        GeometryError::malformed(
                            line_no,
                            format!("vertex needs 3 coordinates, found {axis}"),
                        )
                    })?;
                    *coord = parse_float(token).ok_or_else(|| {
                        GeometryError::malformed(line_no, format!("invalid coordinate `{token}`"))
                    })?;
                }
                // A trailing w or vertex colour is allowed and ignored.
                self.mesh.push_vertex(coords[0], coords[1], coords[2]);
            }
            "f" => {
                self.corners.clear();
                for token in tokens {
                    let corner = self.resolve_index(line_no, token)?;
                    self.corners.push(corner);
                }
                if self.corners.len() < 3 {
                    return Err(GeometryError::malformed(
                        line_no,
                        format!("face needs at least 3 indices, found {}", self.corners.len()),
                    ));
                }
                let first = self.corners[0];
                for pair in self.corners[1..].windows(2) {
                    self.mesh.push_face(first, pair[0], pair[1]);
                }
            }
            "o" | "g" | "s" | "vn" | "vt" | "vp" | "l" | "mtllib" | "usemtl" => {}
            other => {
                if self.skipped == 0 {
                    debug!(line = line_no, record = other, "skipping unknown OBJ record");
                }
                self.skipped += 1;
            }
        }
        Ok(())
    }

    /// Turn one face token into a 0-based vertex index
    fn resolve_index(&self, line_no: usize, token: &str) -> GeometryResult<u32> {
        let raw = parse_face_index(token).ok_or_else(|| {
            GeometryError::malformed(line_no, format!("invalid face index `{token}`"))
        })?;

        let vertex_count = self.mesh.vertex_count();
        let resolved = if raw < 0 {
            vertex_count as i64 + raw
        } else {
            raw - 1
        };
        if resolved < 0 || resolved >= vertex_count as i64 {
            return Err(GeometryError::IndexOutOfRange {
                line: line_no,
                index: raw,
                vertex_count,
            });
        }
        Ok(resolved as u32)
    }

    fn finish(self) -> GeometryResult<Mesh> {
        if self.skipped > 0 {
            warn!(records = self.skipped, "ignored unknown OBJ records");
        }
        Ok(self.mesh)
    }
}

/// Finite coordinates only: `float` also accepts `inf` and `nan`
fn parse_float(token: &str) -> Option<f32> {
    let parsed: IResult<&str, f32> = all_consuming(float)(token);
    parsed
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}

/// `v`, `v/t`, `v//n` or `v/t/n`; only the leading vertex index is kept
fn parse_face_index(token: &str) -> Option<i64> {
    let parsed: IResult<&str, i64> =
        all_consuming(terminated(index, opt(preceded(char('/'), rest))))(token);
    parsed.ok().map(|(_, value)| value)
}
