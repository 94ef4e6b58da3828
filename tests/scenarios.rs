use approx::assert_relative_eq;

use shellmesh::{
  Consolidate, Envelope, GeometryStrip, HalfEdge, MeshError, ObjWriter,
  Operation, Solidify, TriangleSoup, Vertex,
};

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

// two unit squares joined by a zero-width column of cells
fn squares_with_welded_seam() -> HalfEdge {
  let rows = (0..2)
    .map(|y| {
      [0.0, 1.0, 1.0, 2.0]
        .iter()
        .map(|&x| Vertex::new(x, y as f32, 0.0))
        .collect()
    })
    .collect();
  let strip = GeometryStrip::new(rows).unwrap();
  TriangleSoup::from(&strip).build().unwrap()
}

#[test]
fn unit_square_structure() {
  let mesh = unit_square();

  let face_half_edges = mesh
    .half_edge_keys()
    .filter(|&idx| !mesh.is_boundary(idx))
    .count();

  assert_eq!(mesh.num_faces(), 2);
  assert_eq!(face_half_edges, 6);
  assert_eq!(mesh.num_boundary_half_edges(), 4);
  assert_relative_eq!(mesh.surface_area(), 1.0);
  mesh.check_topology().unwrap();
}

#[test]
fn half_edge_invariants_hold() {
  let mesh = squares_with_welded_seam();

  for idx in mesh.half_edge_keys() {
    assert_eq!(mesh.opposite(mesh.opposite(idx)), idx);
    assert_eq!(mesh.next(mesh.previous(idx)), idx);
    assert_eq!(mesh.previous(mesh.next(idx)), idx);
    if mesh.is_boundary(idx) {
      assert!(mesh.is_boundary(mesh.next(idx)));
      assert_eq!(mesh.vertex_half_edge(mesh.tail(idx)), Some(idx));
    }
  }
}

#[test]
fn consolidation_collapses_edge_adjacent_seam() {
  let mut mesh = squares_with_welded_seam();
  assert_eq!(mesh.num_vertices(), 8);
  assert_eq!(mesh.num_faces(), 6);

  let removed = Consolidate::new(1e-4).apply(&mut mesh).unwrap();

  assert_eq!(removed, 2);
  assert_eq!(mesh.num_vertices(), 6);
  assert_eq!(mesh.num_faces(), 4);
  assert_relative_eq!(mesh.surface_area(), 2.0, epsilon = 1e-6);
  assert_relative_eq!(mesh.perimeter(), 6.0, epsilon = 1e-6);
  mesh.check_topology().unwrap();

  assert_eq!(Consolidate::new(1e-4).apply(&mut mesh).unwrap(), 0);
}

#[test]
fn consolidation_ignores_coincident_vertices_without_an_edge() {
  let positions = vec![
    Vertex::new(0.0, 0.0, 0.0),
    Vertex::new(1.0, 0.0, 0.0),
    Vertex::new(1.0, 1.0, 0.0),
    Vertex::new(0.0, 1.0, 0.0),
    Vertex::new(1.0, 0.0, 0.0),
    Vertex::new(2.0, 0.0, 0.0),
    Vertex::new(2.0, 1.0, 0.0),
    Vertex::new(1.0, 1.0, 0.0),
  ];
  let mut mesh = HalfEdge::from_triangles(
    &positions,
    &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
  )
  .unwrap();

  assert_eq!(Consolidate::new(1e-4).apply(&mut mesh).unwrap(), 0);
  assert_eq!(mesh.num_vertices(), 8);
  assert_eq!(mesh.num_faces(), 4);
}

#[test]
fn solidify_unit_square() {
  let mut mesh = unit_square();
  Solidify::new(0.1).apply(&mut mesh).unwrap();

  assert_eq!(mesh.num_faces(), 12);
  assert_eq!(mesh.boundary_half_edge(), None);
  assert_relative_eq!(mesh.surface_area(), 2.4, epsilon = 1e-5);
  mesh.check_topology().unwrap();
}

#[test]
fn zero_thickness_solidify_doubles_area() {
  let mut mesh = squares_with_welded_seam();
  Consolidate::default().apply(&mut mesh).unwrap();
  let area = mesh.surface_area();

  Solidify::new(0.0).apply(&mut mesh).unwrap();
  assert_relative_eq!(mesh.surface_area(), 2.0 * area, epsilon = 1e-5);
}

#[test]
fn nearest_vertex_at_exact_position() {
  let mesh = unit_square();
  let position = mesh.get_position(3);
  assert_eq!(mesh.closest_vertex(&position), Some(3));
}

#[test]
fn export_single_triangle() {
  let mesh = HalfEdge::from_triangles(
    &[
      Vertex::new(0.0, 0.0, 0.0),
      Vertex::new(1.0, 0.0, 0.0),
      Vertex::new(0.0, 1.0, 0.0),
    ],
    &[0, 1, 2],
  )
  .unwrap();

  let dir = tempfile::tempdir().unwrap();
  let path = ObjWriter::default()
    .save(&mesh, dir.path(), "triangle")
    .unwrap();
  let text = std::fs::read_to_string(path).unwrap();

  let faces: Vec<&str> =
    text.lines().filter(|line| line.starts_with("f ")).collect();
  assert_eq!(faces, vec!["f 1/1/1 2/2/2 3/3/3"]);
}

#[test]
fn rebuild_from_indexed_vertices() {
  let mut mesh = squares_with_welded_seam();
  Consolidate::new(1e-4).apply(&mut mesh).unwrap();

  let (positions, indices) = mesh.indexed_vertices();
  let rebuilt = HalfEdge::from_triangles(&positions, &indices).unwrap();

  assert_eq!(rebuilt.num_faces(), mesh.num_faces());
  assert_relative_eq!(rebuilt.surface_area(), mesh.surface_area());
}

#[test]
fn pinched_strip_pipeline() {
  let envelope = Envelope::new(0.0, 0.3, 0.7, 1.0);
  let strip = GeometryStrip::sheet(4, 6, 1.0, 5.0, -0.5, Some(&envelope));
  let mut mesh = TriangleSoup::from(&strip).build().unwrap();
  assert_eq!(mesh.num_faces(), 30);

  let removed = Consolidate::new(1e-3).apply(&mut mesh).unwrap();

  // both pinched rows weld into a single point each
  assert_eq!(removed, 6);
  assert_eq!(mesh.num_vertices(), 18);
  assert_eq!(mesh.num_faces(), 24);
  assert_eq!(mesh.boundary_edge_count(), 10);
  mesh.check_topology().unwrap();

  Solidify::new(0.05).apply(&mut mesh).unwrap();

  assert!(mesh.is_closed());
  assert_eq!(mesh.num_vertices(), 36);
  assert_eq!(mesh.num_faces(), 2 * 24 + 2 * 10);
  mesh.check_topology().unwrap();

  let buffer = mesh.make_render_buffer();
  assert_eq!(buffer.vertices.len(), 36);
  assert_eq!(buffer.indices.len(), 3 * mesh.num_faces());
}

#[test]
fn solidify_twice_is_an_error() {
  let mut mesh = unit_square();
  Solidify::new(0.1).apply(&mut mesh).unwrap();
  assert!(matches!(
    Solidify::new(0.1).apply(&mut mesh),
    Err(MeshError::ClosedMesh)
  ));
}
