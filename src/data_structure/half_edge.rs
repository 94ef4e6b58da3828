use crate::data_structure::base::Face;
use crate::data_structure::base::IndexType;
use crate::data_structure::base::Vertex;
use crate::data_structure::base::UNSET;
use crate::error::TopologyError;
use crate::utils::get_normal;

#[derive(Clone, Debug)]
pub(crate) struct HalfEdgeRef {
  pub(crate) head_idx: IndexType,
  pub(crate) next_idx: IndexType,
  pub(crate) opposite_idx: IndexType,
  // None => boundary half-edge
  pub(crate) face_idx: Option<IndexType>,
  pub(crate) removed: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct VertexRef {
  // outgoing half-edge; None only for vertices no triangle uses
  pub(crate) half_edge_idx: Option<IndexType>,
  pub(crate) vertex: Vertex,
  pub(crate) removed: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct FaceRef {
  // the half-edge pointing at the face's first corner
  pub(crate) half_edge_idx: IndexType,
  // unnormalized, |normal| == 2 * area
  pub(crate) normal: Vertex,
  pub(crate) removed: bool,
}

/// Triangle mesh stored as a doubly connected edge list.
///
/// Vertices, half-edges and faces live in three arenas and reference each
/// other by index. Every half-edge stores the vertex it points to (its
/// head), the next half-edge around its face, and its opposite. Half-edges
/// without a face form the boundary loops of an open surface; they are
/// chained to each other through `next`.
///
/// Operations that delete elements only mark them as removed and compact
/// the arenas before returning, so outside of those operations indices are
/// dense and vertex indices double as vertex ids.
#[derive(Clone, Debug, Default)]
pub struct HalfEdge {
  pub(crate) half_edge_refs: Vec<HalfEdgeRef>,
  pub(crate) vertex_refs: Vec<VertexRef>,
  pub(crate) face_refs: Vec<FaceRef>,
  pub(crate) boundary_edge_idx: Option<IndexType>,
}

pub(crate) enum Offset {
  Current,
  Next,
  NextNext,
}

impl HalfEdge {
  pub(crate) fn relative_get(
    &self,
    idx: IndexType,
    offset: Offset,
  ) -> &HalfEdgeRef {
    let first = &self.half_edge_refs[idx as usize];

    match offset {
      Offset::Current => first,
      Offset::Next => &self.half_edge_refs[first.next_idx as usize],
      Offset::NextNext => {
        &self.half_edge_refs
          [self.half_edge_refs[first.next_idx as usize].next_idx as usize]
      }
    }
  }

  pub(crate) fn half_edge_mut(&mut self, idx: IndexType) -> &mut HalfEdgeRef {
    &mut self.half_edge_refs[idx as usize]
  }

  pub fn num_vertices(&self) -> usize {
    self.vertex_refs.len()
  }

  pub fn num_half_edges(&self) -> usize {
    self.half_edge_refs.len()
  }

  pub fn num_faces(&self) -> usize {
    self.face_refs.len()
  }

  pub fn num_boundary_half_edges(&self) -> usize {
    self
      .half_edge_refs
      .iter()
      .filter(|h| !h.removed && h.face_idx.is_none())
      .count()
  }

  pub fn vertex_keys(&self) -> std::ops::Range<IndexType> {
    0..(self.vertex_refs.len() as IndexType)
  }

  pub fn half_edge_keys(&self) -> std::ops::Range<IndexType> {
    0..(self.half_edge_refs.len() as IndexType)
  }

  pub fn face_keys(&self) -> std::ops::Range<IndexType> {
    0..(self.face_refs.len() as IndexType)
  }

  /// The boundary half-edge the mesh keeps as the entry point of its
  /// boundary loop, or `None` for a closed mesh.
  pub fn boundary_half_edge(&self) -> Option<IndexType> {
    self.boundary_edge_idx
  }

  pub fn is_closed(&self) -> bool {
    self.boundary_edge_idx.is_none()
  }

  pub fn next(&self, half_edge: IndexType) -> IndexType {
    self.half_edge_refs[half_edge as usize].next_idx
  }

  pub fn opposite(&self, half_edge: IndexType) -> IndexType {
    self.half_edge_refs[half_edge as usize].opposite_idx
  }

  /// The half-edge whose `next` is `half_edge`.
  ///
  /// Walks around the tail vertex, so this costs O(degree).
  pub fn previous(&self, half_edge: IndexType) -> IndexType {
    let mut checked = self.opposite(half_edge);
    while self.next(checked) != half_edge {
      checked = self.opposite(self.next(checked));
    }
    checked
  }

  pub fn head(&self, half_edge: IndexType) -> IndexType {
    self.half_edge_refs[half_edge as usize].head_idx
  }

  pub fn tail(&self, half_edge: IndexType) -> IndexType {
    self.head(self.opposite(half_edge))
  }

  pub fn face(&self, half_edge: IndexType) -> Option<IndexType> {
    self.half_edge_refs[half_edge as usize].face_idx
  }

  pub fn is_boundary(&self, half_edge: IndexType) -> bool {
    self.face(half_edge).is_none()
  }

  /// Outgoing anchor half-edge of a vertex. Boundary vertices always anchor
  /// on their outgoing boundary half-edge.
  pub fn vertex_half_edge(&self, vertex: IndexType) -> Option<IndexType> {
    self.vertex_refs[vertex as usize].half_edge_idx
  }

  pub fn face_half_edge(&self, face: IndexType) -> IndexType {
    self.face_refs[face as usize].half_edge_idx
  }

  /// Cached unnormalized face normal.
  pub fn face_normal(&self, face: IndexType) -> Vertex {
    self.face_refs[face as usize].normal
  }

  pub fn get_position(&self, vertex: IndexType) -> Vertex {
    self.vertex_refs[vertex as usize].vertex
  }

  /// Moves a vertex and refreshes the cached normals of its faces.
  pub fn set_position(&mut self, vertex: IndexType, position: &Vertex) {
    self.vertex_refs[vertex as usize].vertex = *position;

    let mut outgoing = Vec::new();
    self.get_outgoing_half_edges(vertex, &mut outgoing);
    for half_edge_idx in outgoing {
      if let Some(face_idx) = self.face(half_edge_idx) {
        self.update_face_normal(face_idx);
      }
    }
  }

  /// Vertex indices of a face, starting at its first corner.
  pub fn get_face_neighbors(&self, face: IndexType) -> Face {
    let half_edge_idx = self.face_half_edge(face);
    [
      self.relative_get(half_edge_idx, Offset::Current).head_idx,
      self.relative_get(half_edge_idx, Offset::Next).head_idx,
      self.relative_get(half_edge_idx, Offset::NextNext).head_idx,
    ]
  }

  /// Outgoing half-edges of a vertex in one-ring order, starting at
  /// `start` (which must leave the vertex).
  pub(crate) fn ring_from(
    &self,
    start: IndexType,
    outgoing: &mut Vec<IndexType>,
  ) {
    outgoing.clear();

    let mut half_edge_idx = start;
    loop {
      outgoing.push(half_edge_idx);
      half_edge_idx = self.next(self.opposite(half_edge_idx));
      if half_edge_idx == start {
        break;
      }
    }
  }

  pub fn get_outgoing_half_edges(
    &self,
    vertex: IndexType,
    outgoing: &mut Vec<IndexType>,
  ) {
    match self.vertex_half_edge(vertex) {
      Some(start) => self.ring_from(start, outgoing),
      None => outgoing.clear(),
    }
  }

  pub fn get_vertex_neighbors(
    &self,
    vertex: IndexType,
    neighbors: &mut Vec<IndexType>,
  ) {
    self.get_outgoing_half_edges(vertex, neighbors);
    for idx in neighbors.iter_mut() {
      *idx = self.head(*idx);
    }
  }

  pub fn degree(&self, vertex: IndexType) -> usize {
    let mut outgoing = Vec::new();
    self.get_outgoing_half_edges(vertex, &mut outgoing);
    outgoing.len()
  }

  pub(crate) fn update_face_normal(&mut self, face: IndexType) {
    let [a, b, c] = self.get_face_neighbors(face);
    let normal = get_normal([
      self.get_position(a),
      self.get_position(b),
      self.get_position(c),
    ]);
    self.face_refs[face as usize].normal = normal;
  }

  pub(crate) fn update_face_normals(&mut self) {
    for face in self.face_keys() {
      if !self.face_refs[face as usize].removed {
        self.update_face_normal(face);
      }
    }
  }

  pub(crate) fn update_boundary_edge_pointer(&mut self) {
    self.boundary_edge_idx = self
      .half_edge_refs
      .iter()
      .position(|h| !h.removed && h.face_idx.is_none())
      .map(|idx| idx as IndexType);
  }

  /// Drops every element marked as removed and rewrites all indices, which
  /// renumbers vertices densely in collection order.
  pub(crate) fn compact(&mut self) {
    fn remap<T>(refs: &[T], removed: impl Fn(&T) -> bool) -> Vec<IndexType> {
      let mut next_idx = 0;
      refs
        .iter()
        .map(|r| {
          if removed(r) {
            UNSET
          } else {
            next_idx += 1;
            next_idx - 1
          }
        })
        .collect()
    }

    let vertex_map = remap(&self.vertex_refs, |v| v.removed);
    let half_edge_map = remap(&self.half_edge_refs, |h| h.removed);
    let face_map = remap(&self.face_refs, |f| f.removed);

    let vertex_refs = std::mem::take(&mut self.vertex_refs);
    self.vertex_refs = vertex_refs
      .into_iter()
      .filter(|v| !v.removed)
      .map(|v| VertexRef {
        half_edge_idx: v.half_edge_idx.map(|h| half_edge_map[h as usize]),
        ..v
      })
      .collect();

    let half_edge_refs = std::mem::take(&mut self.half_edge_refs);
    self.half_edge_refs = half_edge_refs
      .into_iter()
      .filter(|h| !h.removed)
      .map(|h| HalfEdgeRef {
        head_idx: vertex_map[h.head_idx as usize],
        next_idx: half_edge_map[h.next_idx as usize],
        opposite_idx: half_edge_map[h.opposite_idx as usize],
        face_idx: h.face_idx.map(|f| face_map[f as usize]),
        removed: false,
      })
      .collect();

    let face_refs = std::mem::take(&mut self.face_refs);
    self.face_refs = face_refs
      .into_iter()
      .filter(|f| !f.removed)
      .map(|f| FaceRef {
        half_edge_idx: half_edge_map[f.half_edge_idx as usize],
        ..f
      })
      .collect();

    self.update_face_normals();
    self.update_boundary_edge_pointer();
  }

  fn find_previous(&self, half_edge: IndexType) -> Option<IndexType> {
    let mut checked = self.opposite(half_edge);
    for _ in 0..self.half_edge_refs.len() {
      if self.next(checked) == half_edge {
        return Some(checked);
      }
      checked = self.opposite(self.next(checked));
    }
    None
  }

  /// Checks every half-edge invariant of the graph.
  ///
  /// This is O(n · degree) and meant to run after a mutating phase, not per
  /// access.
  pub fn check_topology(&self) -> Result<(), TopologyError> {
    let num_half_edges = self.half_edge_refs.len() as IndexType;
    let num_vertices = self.vertex_refs.len() as IndexType;
    let num_faces = self.face_refs.len() as IndexType;

    let half_edge_live = |idx: IndexType| {
      idx < num_half_edges && !self.half_edge_refs[idx as usize].removed
    };

    for idx in self.half_edge_keys() {
      let half_edge = &self.half_edge_refs[idx as usize];
      if half_edge.removed {
        continue;
      }

      if half_edge.next_idx == UNSET
        || half_edge.opposite_idx == UNSET
        || half_edge.head_idx == UNSET
      {
        return Err(TopologyError::Unlinked(idx));
      }

      if !half_edge_live(half_edge.next_idx)
        || !half_edge_live(half_edge.opposite_idx)
        || half_edge.head_idx >= num_vertices
        || half_edge.face_idx.map_or(false, |f| {
          f >= num_faces || self.face_refs[f as usize].removed
        })
      {
        return Err(TopologyError::Dangling(idx));
      }

      if self.vertex_refs[half_edge.head_idx as usize].removed {
        return Err(TopologyError::RemovedVertex(half_edge.head_idx));
      }

      if self.opposite(half_edge.opposite_idx) != idx {
        return Err(TopologyError::OppositeMismatch(idx));
      }

      if self.find_previous(idx).is_none()
        || self.find_previous(half_edge.next_idx) != Some(idx)
      {
        return Err(TopologyError::PreviousMismatch(idx));
      }

      match half_edge.face_idx {
        None => {
          if !self.is_boundary(half_edge.next_idx) {
            return Err(TopologyError::BoundaryChain(idx));
          }
          if self.vertex_half_edge(self.tail(idx)) != Some(idx) {
            return Err(TopologyError::BoundaryAnchor(idx));
          }
        }
        Some(face_idx) => {
          let next = self.relative_get(idx, Offset::Next);
          let next_next = self.relative_get(idx, Offset::NextNext);
          if next.face_idx != Some(face_idx)
            || next_next.face_idx != Some(face_idx)
            || next_next.next_idx != idx
          {
            return Err(TopologyError::FaceCycle(face_idx));
          }
        }
      }
    }

    for idx in self.face_keys() {
      let face = &self.face_refs[idx as usize];
      if face.removed {
        continue;
      }
      if !half_edge_live(face.half_edge_idx)
        || self.face(face.half_edge_idx) != Some(idx)
      {
        return Err(TopologyError::FaceCycle(idx));
      }
    }

    let mut referenced = vec![false; self.vertex_refs.len()];
    for half_edge in self.half_edge_refs.iter().filter(|h| !h.removed) {
      referenced[half_edge.head_idx as usize] = true;
    }

    for idx in self.vertex_keys() {
      let vertex = &self.vertex_refs[idx as usize];
      if vertex.removed {
        continue;
      }
      match vertex.half_edge_idx {
        None if referenced[idx as usize] => {
          return Err(TopologyError::VertexAnchor(idx))
        }
        None => {}
        Some(half_edge_idx) => {
          if !half_edge_live(half_edge_idx) || self.tail(half_edge_idx) != idx
          {
            return Err(TopologyError::VertexAnchor(idx));
          }
        }
      }
    }

    if let Some(idx) = self.boundary_edge_idx {
      if !half_edge_live(idx) || !self.is_boundary(idx) {
        return Err(TopologyError::MeshAnchor(idx));
      }
    }

    Ok(())
  }

  #[cfg(debug_assertions)]
  pub(crate) fn verify_topology(&self) {
    if let Err(err) = self.check_topology() {
      panic!("mesh invariant violated: {}", err);
    }
  }

  #[cfg(not(debug_assertions))]
  pub(crate) fn verify_topology(&self) {}
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit_square() -> HalfEdge {
    HalfEdge::from_triangles(
      &[
        Vertex::new(0.0, 0.0, 0.0),
        Vertex::new(1.0, 0.0, 0.0),
        Vertex::new(1.0, 1.0, 0.0),
        Vertex::new(0.0, 1.0, 0.0),
      ],
      &[0, 1, 2, 0, 2, 3],
    )
    .unwrap()
  }

  #[test]
  fn previous_inverts_next() {
    let mesh = unit_square();
    for idx in mesh.half_edge_keys() {
      assert_eq!(mesh.previous(mesh.next(idx)), idx);
      assert_eq!(mesh.next(mesh.previous(idx)), idx);
    }
  }

  #[test]
  fn face_neighbors_follow_input_order() {
    let mesh = unit_square();
    assert_eq!(mesh.get_face_neighbors(0), [0, 1, 2]);
    assert_eq!(mesh.get_face_neighbors(1), [0, 2, 3]);
  }

  #[test]
  fn ring_of_corner_vertex() {
    let mesh = unit_square();

    let mut neighbors = Vec::new();
    mesh.get_vertex_neighbors(0, &mut neighbors);
    neighbors.sort_unstable();
    assert_eq!(neighbors, vec![1, 2, 3]);

    mesh.get_vertex_neighbors(1, &mut neighbors);
    neighbors.sort_unstable();
    assert_eq!(neighbors, vec![0, 2]);
    assert_eq!(mesh.degree(1), 2);
  }

  #[test]
  fn boundary_vertices_anchor_on_boundary() {
    let mesh = unit_square();
    for vertex in mesh.vertex_keys() {
      assert!(mesh.is_boundary_vertex(vertex));
      let anchor = mesh.vertex_half_edge(vertex).unwrap();
      assert!(mesh.is_boundary(anchor));
      assert_eq!(mesh.tail(anchor), vertex);
    }
  }

  #[test]
  fn set_position_refreshes_face_normals() {
    let mut mesh = unit_square();
    mesh.set_position(2, &Vertex::new(2.0, 2.0, 0.0));
    assert_eq!(mesh.face_normal(0), Vertex::new(0.0, 0.0, 2.0));
    assert_eq!(mesh.face_normal(1), Vertex::new(0.0, 0.0, 2.0));
  }

  #[test]
  fn check_topology_detects_broken_opposite() {
    let mut mesh = unit_square();
    let idx = mesh.face_half_edge(0);
    let other = mesh.face_half_edge(1);
    mesh.half_edge_mut(idx).opposite_idx = other;
    assert!(mesh.check_topology().is_err());
  }

  #[test]
  fn compact_drops_removed_elements() {
    let mut mesh = HalfEdge::from_triangles(
      &[
        Vertex::new(0.0, 0.0, 0.0),
        Vertex::new(1.0, 0.0, 0.0),
        Vertex::new(0.0, 1.0, 0.0),
        Vertex::new(5.0, 5.0, 5.0),
      ],
      &[0, 1, 2],
    )
    .unwrap();

    mesh.vertex_refs[3].removed = true;
    mesh.compact();

    assert_eq!(mesh.num_vertices(), 3);
    assert_eq!(mesh.num_half_edges(), 6);
    mesh.check_topology().unwrap();
  }
}
