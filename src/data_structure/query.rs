//! Derived scalar and vector queries.
//!
//! The vertex searches are brute-force scans over every vertex, which is
//! fine for the few hundred vertices a strip mesh has.

use ordered_float::OrderedFloat;

use crate::data_structure::base::IndexType;
use crate::data_structure::base::Vertex;
use crate::data_structure::HalfEdge;
use crate::utils::normalize_or_zero;

impl HalfEdge {
  /// Half-edges of the anchored boundary loop, in loop order.
  pub fn get_boundary_loop(&self, half_edges: &mut Vec<IndexType>) {
    half_edges.clear();

    if let Some(start) = self.boundary_half_edge() {
      let mut half_edge_idx = start;
      loop {
        half_edges.push(half_edge_idx);
        half_edge_idx = self.next(half_edge_idx);
        if half_edge_idx == start {
          break;
        }
      }
    }
  }

  pub fn boundary_edge_count(&self) -> usize {
    let mut half_edges = Vec::new();
    self.get_boundary_loop(&mut half_edges);
    half_edges.len()
  }

  /// Each face contributes half the length of its cached normal.
  pub fn surface_area(&self) -> f32 {
    self
      .face_keys()
      .map(|face| self.face_normal(face).norm())
      .sum::<f32>()
      / 2.0
  }

  /// Length of the anchored boundary loop, 0 for a closed mesh.
  pub fn perimeter(&self) -> f32 {
    let mut half_edges = Vec::new();
    self.get_boundary_loop(&mut half_edges);

    half_edges
      .iter()
      .map(|&half_edge_idx| {
        (self.get_position(self.head(half_edge_idx))
          - self.get_position(self.tail(half_edge_idx)))
        .norm()
      })
      .sum()
  }

  /// Positions in id order plus three vertex ids per face.
  pub fn indexed_vertices(&self) -> (Vec<Vertex>, Vec<IndexType>) {
    let vertices = self
      .vertex_keys()
      .map(|vertex| self.get_position(vertex))
      .collect();

    let indices = self
      .face_keys()
      .flat_map(|face| self.get_face_neighbors(face))
      .collect();

    (vertices, indices)
  }

  /// False for isolated vertices and for ids not in the mesh.
  pub fn is_boundary_vertex(&self, vertex: IndexType) -> bool {
    self
      .vertex_refs
      .get(vertex as usize)
      .and_then(|vertex_ref| vertex_ref.half_edge_idx)
      .map_or(false, |half_edge_idx| self.is_boundary(half_edge_idx))
  }

  /// Normalized sum of the (area weighted) normals of the incident faces.
  pub fn vertex_normal(&self, vertex: IndexType) -> Vertex {
    let mut outgoing = Vec::new();
    self.get_outgoing_half_edges(vertex, &mut outgoing);

    let sum = outgoing
      .iter()
      .filter_map(|&half_edge_idx| self.face(half_edge_idx))
      .fold(Vertex::zeros(), |acc, face| acc + self.face_normal(face));

    normalize_or_zero(sum)
  }

  /// Id of the vertex nearest to `point`; the lowest id wins ties.
  pub fn closest_vertex(&self, point: &Vertex) -> Option<IndexType> {
    self.vertex_keys().min_by_key(|&vertex| {
      OrderedFloat((self.get_position(vertex) - point).norm_squared())
    })
  }

  /// Ids of all vertices at most `radius` away from `point`.
  pub fn vertices_within_radius(
    &self,
    point: &Vertex,
    radius: f32,
  ) -> Vec<IndexType> {
    let radius_sq = radius * radius;

    self
      .vertex_keys()
      .filter(|&vertex| {
        (self.get_position(vertex) - point).norm_squared() <= radius_sq
      })
      .collect()
  }

  /// Ids of all vertices inside the axis-aligned ellipsoid centered on
  /// `point` with semi-axes `radii`. A zero radius only admits vertices
  /// level with `point` on that axis.
  pub fn vertices_within_ellipsoid(
    &self,
    point: &Vertex,
    radii: &Vertex,
  ) -> Vec<IndexType> {
    let radii_sq = radii.component_mul(radii);

    self
      .vertex_keys()
      .filter(|&vertex| {
        let diff = self.get_position(vertex) - point;
        diff
          .iter()
          .zip(radii_sq.iter())
          .map(|(&d, &r)| if d == 0.0 { 0.0 } else { d * d / r })
          .sum::<f32>()
          <= 1.0
      })
      .collect()
  }

  /// Mean position of the given vertices, the origin for an empty list.
  pub fn centroid(&self, vertices: &[IndexType]) -> Vertex {
    if vertices.is_empty() {
      return Vertex::zeros();
    }

    vertices
      .iter()
      .fold(Vertex::zeros(), |acc, &vertex| acc + self.get_position(vertex))
      / vertices.len() as f32
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

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
  fn square_measurements() {
    let mesh = unit_square();
    assert_relative_eq!(mesh.surface_area(), 1.0);
    assert_relative_eq!(mesh.perimeter(), 4.0);
    assert_eq!(mesh.boundary_edge_count(), 4);
  }

  #[test]
  fn closed_mesh_has_no_perimeter() {
    let mesh = HalfEdge::from_triangles(
      &[
        Vertex::new(0.0, 0.0, 0.0),
        Vertex::new(1.0, 0.0, 0.0),
        Vertex::new(0.0, 1.0, 0.0),
        Vertex::new(0.0, 0.0, 1.0),
      ],
      &[0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3],
    )
    .unwrap();

    assert_eq!(mesh.perimeter(), 0.0);
    assert_eq!(mesh.boundary_edge_count(), 0);
    assert!(!mesh.is_boundary_vertex(0));
  }

  #[test]
  fn closest_vertex_at_exact_position() {
    let mesh = unit_square();
    assert_eq!(mesh.closest_vertex(&Vertex::new(0.0, 1.0, 0.0)), Some(3));
    assert_eq!(mesh.closest_vertex(&Vertex::new(0.9, 0.2, 0.3)), Some(1));
  }

  #[test]
  fn closest_vertex_of_empty_mesh() {
    let mesh = HalfEdge::from_triangles(&[], &[]).unwrap();
    assert_eq!(mesh.closest_vertex(&Vertex::zeros()), None);
  }

  #[test]
  fn radius_search_includes_the_rim() {
    let mesh = unit_square();
    let found = mesh.vertices_within_radius(&Vertex::zeros(), 1.0);
    assert_eq!(found, vec![0, 1, 3]);
  }

  #[test]
  fn ellipsoid_search() {
    let mesh = unit_square();
    let found = mesh.vertices_within_ellipsoid(
      &Vertex::zeros(),
      &Vertex::new(1.0, 0.5, 0.5),
    );
    assert_eq!(found, vec![0, 1]);
  }

  #[test]
  fn flat_ellipsoid_keeps_vertices_in_its_plane() {
    let mesh = unit_square();
    let found = mesh.vertices_within_ellipsoid(
      &Vertex::zeros(),
      &Vertex::new(1.0, 1.0, 0.0),
    );
    assert_eq!(found, vec![0, 1, 3]);

    let found = mesh.vertices_within_ellipsoid(
      &Vertex::new(0.0, 0.0, 0.5),
      &Vertex::new(1.0, 1.0, 0.0),
    );
    assert!(found.is_empty());
  }

  #[test]
  fn unknown_vertex_is_not_on_the_boundary() {
    let mesh = unit_square();
    assert!(mesh.is_boundary_vertex(0));
    assert!(!mesh.is_boundary_vertex(4));
    assert!(!mesh.is_boundary_vertex(IndexType::MAX));
  }

  #[test]
  fn centroid_of_corners() {
    let mesh = unit_square();
    let centroid = mesh.centroid(&[0, 1, 2, 3]);
    assert_relative_eq!(centroid, Vertex::new(0.5, 0.5, 0.0));
    assert_eq!(mesh.centroid(&[]), Vertex::zeros());
  }

  #[test]
  fn vertex_normals_of_flat_sheet() {
    let mesh = unit_square();
    for vertex in mesh.vertex_keys() {
      assert_relative_eq!(mesh.vertex_normal(vertex), Vertex::z());
    }
  }

  #[test]
  fn indexed_vertices_round_trip() {
    let mesh = unit_square();
    let (vertices, indices) = mesh.indexed_vertices();
    assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);

    let rebuilt = HalfEdge::from_triangles(&vertices, &indices).unwrap();
    assert_eq!(rebuilt.num_faces(), mesh.num_faces());
    assert_relative_eq!(rebuilt.surface_area(), mesh.surface_area());
  }
}
