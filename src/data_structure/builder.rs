//! Construction of the half-edge graph from a triangle soup.

use std::collections::HashMap;

use tracing::debug;

use crate::data_structure::base::Face;
use crate::data_structure::base::IndexType;
use crate::data_structure::base::Vertex;
use crate::data_structure::base::UNSET;
use crate::data_structure::half_edge::FaceRef;
use crate::data_structure::half_edge::HalfEdgeRef;
use crate::data_structure::half_edge::Offset;
use crate::data_structure::half_edge::VertexRef;
use crate::data_structure::HalfEdge;
use crate::error::MeshError;
use crate::error::Result;
use crate::utils::get_normal;

impl HalfEdge {
  /// Builds a mesh from vertex positions and a flat list of triangle
  /// indices (three per triangle, consistently wound).
  ///
  /// Directed edges used by two triangles are paired as opposites; every
  /// other edge gets a faceless boundary half-edge. A directed edge used by
  /// more than one triangle is rejected, as is any input that leaves the
  /// graph with a broken invariant (e.g. two boundary fans meeting at one
  /// vertex).
  ///
  /// Positions that no triangle references are kept as isolated vertices.
  pub fn from_triangles(
    positions: &[Vertex],
    indices: &[IndexType],
  ) -> Result<Self> {
    if indices.len() % 3 != 0 {
      return Err(MeshError::IndexCount {
        count: indices.len(),
      });
    }

    let faces: Vec<Face> = indices
      .chunks_exact(3)
      .map(|vals| [vals[0], vals[1], vals[2]])
      .collect();

    for (face_idx, face) in faces.iter().enumerate() {
      if let Some(&vertex) =
        face.iter().find(|&&v| v as usize >= positions.len())
      {
        return Err(MeshError::InvalidVertexIndex {
          face: face_idx,
          vertex,
        });
      }
      if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
        return Err(MeshError::DegenerateFace { face: face_idx });
      }
    }

    let mut out = HalfEdge {
      vertex_refs: positions
        .iter()
        .map(|position| VertexRef {
          half_edge_idx: None,
          vertex: *position,
          removed: false,
        })
        .collect(),
      ..Default::default()
    };

    out.boundary_edge_idx = out.link_triangles(&faces)?;
    out.check_topology()?;

    debug!(
      "built {} faces and {} half-edges over {} vertices",
      out.num_faces(),
      out.num_half_edges(),
      out.num_vertices()
    );

    Ok(out)
  }

  /// Appends one face and three half-edges per triangle, pairs the new
  /// half-edges through a directed-edge map and synthesizes boundary
  /// half-edges for the unpaired ones.
  ///
  /// Returns the first boundary half-edge created, if any.
  pub(crate) fn link_triangles(
    &mut self,
    faces: &[Face],
  ) -> Result<Option<IndexType>> {
    let first_half_edge_idx = self.half_edge_refs.len() as IndexType;

    let mut vertex_pair_to_half_edge_idx =
      HashMap::with_capacity(faces.len() * 3);

    for face in faces {
      let face_idx = self.face_refs.len() as IndexType;
      let next_vertex = [face[1], face[2], face[0]];
      let start_idx = self.half_edge_refs.len() as IndexType;
      let next_idxs = [start_idx + 1, start_idx + 2, start_idx];

      for ((tail, head), next_idx) in
        face.iter().zip(next_vertex.iter()).zip(next_idxs.iter())
      {
        let half_edge_idx = self.half_edge_refs.len() as IndexType;

        if vertex_pair_to_half_edge_idx
          .insert((*tail, *head), half_edge_idx)
          .is_some()
        {
          return Err(MeshError::NonManifoldEdge {
            from: *tail,
            to: *head,
          });
        }

        let tail_ref = &mut self.vertex_refs[*tail as usize];
        if tail_ref.half_edge_idx.is_none() {
          tail_ref.half_edge_idx = Some(half_edge_idx);
        }

        self.half_edge_refs.push(HalfEdgeRef {
          head_idx: *head,
          next_idx: *next_idx,
          opposite_idx: UNSET,
          face_idx: Some(face_idx),
          removed: false,
        });
      }

      let normal = get_normal([
        self.get_position(face[0]),
        self.get_position(face[1]),
        self.get_position(face[2]),
      ]);

      // the third half-edge (face[2] -> face[0]) points at the first corner
      self.face_refs.push(FaceRef {
        half_edge_idx: start_idx + 2,
        normal,
        removed: false,
      });
    }

    let first_boundary_idx = self.half_edge_refs.len() as IndexType;
    let mut boundary_edge_idx = None;

    for half_edge_idx in first_half_edge_idx..first_boundary_idx {
      if self.opposite(half_edge_idx) != UNSET {
        continue;
      }

      let head = self.head(half_edge_idx);
      let tail = self.relative_get(half_edge_idx, Offset::NextNext).head_idx;

      match vertex_pair_to_half_edge_idx.get(&(head, tail)) {
        Some(&opposite_idx) => {
          self.half_edge_mut(half_edge_idx).opposite_idx = opposite_idx;
          self.half_edge_mut(opposite_idx).opposite_idx = half_edge_idx;
        }
        None => {
          let new_idx = self.half_edge_refs.len() as IndexType;
          self.half_edge_refs.push(HalfEdgeRef {
            head_idx: tail,
            next_idx: UNSET,
            opposite_idx: half_edge_idx,
            face_idx: None,
            removed: false,
          });
          self.half_edge_mut(half_edge_idx).opposite_idx = new_idx;

          // boundary vertices anchor outward along the boundary
          self.vertex_refs[head as usize].half_edge_idx = Some(new_idx);

          boundary_edge_idx.get_or_insert(new_idx);
        }
      }
    }

    // every boundary vertex now anchors on its outgoing boundary half-edge,
    // which is exactly the successor of the boundary half-edge entering it
    for half_edge_idx in
      first_boundary_idx..(self.half_edge_refs.len() as IndexType)
    {
      let head = self.head(half_edge_idx);
      self.half_edge_mut(half_edge_idx).next_idx =
        self.vertex_half_edge(head).unwrap_or(UNSET);
    }

    Ok(boundary_edge_idx)
  }
}
