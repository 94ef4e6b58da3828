use std::path::Path;

use tracing::info;

use crate::data_structure::HalfEdge;
use crate::data_structure::IndexType;
use crate::data_structure::Vertex;
use crate::error::MeshError;
use crate::error::Result;
use crate::strip::GeometryStrip;

/// Unconnected triangle input: positions plus three indices per triangle.
#[derive(Clone, Debug, Default)]
pub struct TriangleSoup {
  pub positions: Vec<Vertex>,
  pub indices: Vec<IndexType>,
}

impl TriangleSoup {
  pub fn new(positions: Vec<Vertex>, indices: Vec<IndexType>) -> Self {
    TriangleSoup { positions, indices }
  }

  /// Loads every model of an OBJ file into one soup, triangulating polygons.
  pub fn load_obj(path: &Path) -> Result<Self> {
    let options = tobj::LoadOptions {
      triangulate: true,
      single_index: true,
      ..Default::default()
    };

    let (models, _) =
      tobj::load_obj(path, &options).map_err(|source| MeshError::Load {
        path: path.to_path_buf(),
        source,
      })?;

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for m in models {
      let mesh = &m.mesh;
      let offset = positions.len() as IndexType;
      positions.extend(
        mesh
          .positions
          .chunks_exact(3)
          .map(|vals| Vertex::new(vals[0], vals[1], vals[2])),
      );
      indices.extend(mesh.indices.iter().map(|idx| idx + offset));
    }

    info!(
      "loaded {} faces and {} vertices from {}",
      indices.len() / 3,
      positions.len(),
      path.display()
    );

    Ok(TriangleSoup { positions, indices })
  }

  pub fn num_triangles(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn build(&self) -> Result<HalfEdge> {
    HalfEdge::from_triangles(&self.positions, &self.indices)
  }
}

impl From<&GeometryStrip> for TriangleSoup {
  fn from(strip: &GeometryStrip) -> Self {
    TriangleSoup::new(strip.vertices(), strip.indices())
  }
}
