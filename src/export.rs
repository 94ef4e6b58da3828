//! Output of a mesh for rendering and as OBJ text.

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::data_structure::HalfEdge;
use crate::error::MeshError;
use crate::error::Result;

/// Interleaved vertex layout of [`RenderBuffer`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderVertex {
  pub position: [f32; 3],
  pub normal: [f32; 3],
  pub tex_coords: [f32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct RenderBuffer {
  pub vertices: Vec<RenderVertex>,
  pub indices: Vec<u32>,
}

impl HalfEdge {
  /// One render vertex per mesh vertex, with its normal and a fixed texture
  /// coordinate, and three indices per face.
  pub fn make_render_buffer(&self) -> RenderBuffer {
    let vertices = self
      .vertex_keys()
      .map(|vertex| RenderVertex {
        position: self.get_position(vertex).into(),
        normal: self.vertex_normal(vertex).into(),
        tex_coords: [0.5, 0.5],
      })
      .collect();

    let (_, indices) = self.indexed_vertices();

    RenderBuffer { vertices, indices }
  }
}

/// Writes faces as OBJ `f` lines whose position, texture and normal indices
/// are all the vertex id.
#[derive(Clone, Debug, Default)]
pub struct ObjWriter {
  /// Also emit `v`, `vn` and `vt` lines.
  pub write_positions: bool,
}

impl ObjWriter {
  pub fn new(write_positions: bool) -> Self {
    ObjWriter { write_positions }
  }

  pub fn write<W: Write>(
    &self,
    mesh: &HalfEdge,
    writer: &mut W,
    name: &str,
  ) -> io::Result<()> {
    writeln!(writer, "#{}", name)?;
    writeln!(writer, "#vertex data")?;
    writeln!(writer, "#v x y z (w = 1.0)")?;
    writeln!(writer, "#vn i j k")?;
    writeln!(writer, "#vt u v")?;
    writeln!(writer)?;

    if self.write_positions {
      for vertex in mesh.vertex_keys() {
        let position = mesh.get_position(vertex);
        let normal = mesh.vertex_normal(vertex);
        writeln!(writer, "v {} {} {}", position[0], position[1], position[2])?;
        writeln!(writer, "vn {} {} {}", normal[0], normal[1], normal[2])?;
        writeln!(writer, "vt 0.5 0.5")?;
      }
      writeln!(writer)?;
    }

    writeln!(writer, "#face data")?;
    writeln!(
      writer,
      "#f vertex1Num/texCoord1Num/vertNormal1Num \
       vertex2Num/texCoord2Num/vertNormal2Num \
       vertex3Num/texCoord3Num/vertNormal3Num"
    )?;
    writeln!(writer)?;

    for face in mesh.face_keys() {
      let [a, b, c] = mesh.get_face_neighbors(face);
      writeln!(
        writer,
        "f {0}/{0}/{0} {1}/{1}/{1} {2}/{2}/{2}",
        a + 1,
        b + 1,
        c + 1
      )?;
    }

    writeln!(writer)?;
    write!(writer, "#end {}", name)
  }

  /// Writes `name.obj` into `dir`, or `name_0.obj`, `name_1.obj`, ... if
  /// that file already exists. Returns the path written.
  pub fn save(&self, mesh: &HalfEdge, dir: &Path, name: &str) -> Result<PathBuf> {
    let io_err = |path: &Path| {
      let path = path.to_path_buf();
      move |source| MeshError::Io { path, source }
    };

    let mut path = dir.join(format!("{}.obj", name));
    let mut attempt = 0;
    let file = loop {
      match File::options().write(true).create_new(true).open(&path) {
        Ok(file) => break file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
          path = dir.join(format!("{}_{}.obj", name, attempt));
          attempt += 1;
        }
        Err(err) => return Err(io_err(&path)(err)),
      }
    };

    let file_name = path
      .file_name()
      .map_or_else(|| name.to_owned(), |f| f.to_string_lossy().into_owned());

    let mut writer = BufWriter::new(file);
    self
      .write(mesh, &mut writer, &file_name)
      .and_then(|_| writer.flush())
      .map_err(io_err(&path))?;

    info!("wrote {} faces to {}", mesh.num_faces(), path.display());

    Ok(path)
  }
}
