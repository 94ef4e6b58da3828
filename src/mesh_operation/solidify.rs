use tracing::debug;
use tracing::info;

use crate::data_structure::Face;
use crate::data_structure::FaceRef;
use crate::data_structure::HalfEdge;
use crate::data_structure::HalfEdgeRef;
use crate::data_structure::IndexType;
use crate::data_structure::Vertex;
use crate::data_structure::VertexRef;
use crate::data_structure::UNSET;
use crate::error::MeshError;
use crate::error::Result;
use crate::error::TopologyError;
use crate::mesh_operation::Operation;
use crate::utils::get_normal;

/// Turns an open sheet with a single boundary loop into a closed shell.
///
/// Every vertex gets a copy on a back layer, the sheet is moved half the
/// separation along its vertex normals and the copy half the separation the
/// other way, and a rim of two triangles per boundary edge joins the two
/// layers. Vertex `i`'s copy gets id `i + N` where `N` is the vertex count
/// before solidifying.
#[derive(Debug, Clone)]
pub struct Solidify {
  pub separation: f32,
}

impl Solidify {
  pub fn new(separation: f32) -> Self {
    Solidify { separation }
  }
}

impl Operation for Solidify {
  type Output = ();

  fn apply(&self, mesh: &mut HalfEdge) -> Result<()> {
    mesh.solidify(self.separation)?;

    info!(
      "solidified with separation {}: {} faces, {} vertices",
      self.separation,
      mesh.num_faces(),
      mesh.num_vertices()
    );

    Ok(())
  }
}

impl HalfEdge {
  pub(crate) fn solidify(&mut self, separation: f32) -> Result<()> {
    if !separation.is_finite() || separation < 0.0 {
      return Err(MeshError::invalid_param(
        "separation",
        separation,
        "must be a finite, non-negative distance",
      ));
    }

    if self.boundary_half_edge().is_none() {
      return Err(MeshError::ClosedMesh);
    }

    let mut front_boundary = Vec::new();
    self.get_boundary_loop(&mut front_boundary);

    let boundary_edges = self.num_boundary_half_edges();
    if front_boundary.len() != boundary_edges {
      return Err(MeshError::MultipleBoundaryLoops {
        boundary_edges,
        loop_edges: front_boundary.len(),
      });
    }

    let num_vertices = self.num_vertices() as IndexType;
    let half = separation / 2.0;

    let offsets: Vec<Vertex> = self
      .vertex_keys()
      .map(|vertex| {
        let normal = self.vertex_normal(vertex);
        if normal == Vertex::zeros() {
          Vertex::z() * half
        } else {
          normal * half
        }
      })
      .collect();

    for (vertex, offset) in self.vertex_keys().zip(offsets.iter()) {
      let position = self.get_position(vertex);
      self.vertex_refs.push(VertexRef {
        half_edge_idx: None,
        vertex: position - offset,
        removed: false,
      });
      self.vertex_refs[vertex as usize].vertex = position + offset;
    }

    // mirrored winding so the back layer faces away from the front
    let back_faces: Vec<Face> = self
      .face_keys()
      .map(|face| {
        let [p, q, r] = self.get_face_neighbors(face);
        [p + num_vertices, r + num_vertices, q + num_vertices]
      })
      .collect();

    self.link_triangles(&back_faces)?;

    self.stitch_rim(&front_boundary, num_vertices)?;

    self.boundary_edge_idx = None;
    self.update_face_normals();

    debug!(
      "rim of {} boundary edges stitched, {} half-edges total",
      front_boundary.len(),
      self.num_half_edges()
    );

    self.verify_topology();

    Ok(())
  }

  // Each front boundary edge t -> h becomes the first edge of the rim face
  // (t, h, t'), and the back boundary edge h' -> t' the first edge of the rim
  // face (h', t', h).
  fn stitch_rim(
    &mut self,
    front_boundary: &[IndexType],
    num_vertices: IndexType,
  ) -> Result<()> {
    // per boundary edge: (t' -> t, h -> h')
    let mut sides = Vec::with_capacity(front_boundary.len());

    for &t_h in front_boundary {
      let t = self.tail(t_h);
      let h = self.head(t_h);
      let t_back = t + num_vertices;
      let h_back = h + num_vertices;

      let hb_tb = self
        .vertex_half_edge(h_back)
        .filter(|&half_edge_idx| self.is_boundary(half_edge_idx))
        .ok_or(TopologyError::BoundaryAnchor(h_back))?;

      let front_face = self.face_refs.len() as IndexType;
      let back_face = front_face + 1;

      let base = self.half_edge_refs.len() as IndexType;
      let (h_tb, tb_t, tb_h, h_hb) = (base, base + 1, base + 2, base + 3);

      for (head_idx, next_idx, opposite_idx, face_idx) in [
        (t_back, tb_t, tb_h, front_face),
        (t, t_h, UNSET, front_face),
        (h, h_hb, h_tb, back_face),
        (h_back, hb_tb, UNSET, back_face),
      ] {
        self.half_edge_refs.push(HalfEdgeRef {
          head_idx,
          next_idx,
          opposite_idx,
          face_idx: Some(face_idx),
          removed: false,
        });
      }

      let front_ref = self.half_edge_mut(t_h);
      front_ref.face_idx = Some(front_face);
      front_ref.next_idx = h_tb;

      let back_ref = self.half_edge_mut(hb_tb);
      back_ref.face_idx = Some(back_face);
      back_ref.next_idx = tb_h;

      let [t_pos, h_pos, tb_pos, hb_pos] =
        [t, h, t_back, h_back].map(|vertex| self.get_position(vertex));

      self.face_refs.push(FaceRef {
        half_edge_idx: tb_t,
        normal: get_normal([t_pos, h_pos, tb_pos]),
        removed: false,
      });
      self.face_refs.push(FaceRef {
        half_edge_idx: h_hb,
        normal: get_normal([hb_pos, tb_pos, h_pos]),
        removed: false,
      });

      sides.push((tb_t, h_hb));
    }

    // consecutive boundary edges share a vertex: the side t' -> t of one
    // edge is the reverse of the side t -> t' of the edge before it
    for (i, &(tb_t, _)) in sides.iter().enumerate() {
      let (_, t_tb) = sides[(i + sides.len() - 1) % sides.len()];
      self.half_edge_mut(tb_t).opposite_idx = t_tb;
      self.half_edge_mut(t_tb).opposite_idx = tb_t;
    }

    Ok(())
  }
}
