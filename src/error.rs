//! Error types for mesh construction, repair and export.

use std::path::PathBuf;
use thiserror::Error;

use crate::data_structure::IndexType;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors returned by the mesh engine.
#[derive(Error, Debug)]
pub enum MeshError {
  /// The index list does not describe whole triangles.
  #[error("index count {count} is not a multiple of 3")]
  IndexCount {
    /// Length of the index list.
    count: usize,
  },

  /// A triangle references a vertex that does not exist.
  #[error("face {face} references invalid vertex index {vertex}")]
  InvalidVertexIndex {
    /// Triangle number in the input.
    face: usize,
    /// The out of range index.
    vertex: IndexType,
  },

  /// A triangle uses the same vertex twice.
  #[error("face {face} is degenerate (has duplicate vertices)")]
  DegenerateFace {
    /// Triangle number in the input.
    face: usize,
  },

  /// More than one triangle uses the same directed edge.
  #[error("directed edge ({from}, {to}) is shared by more than one face")]
  NonManifoldEdge {
    /// Tail vertex of the edge.
    from: IndexType,
    /// Head vertex of the edge.
    to: IndexType,
  },

  /// The operation needs an open sheet but the mesh has no boundary.
  #[error("mesh is closed")]
  ClosedMesh,

  /// The operation needs exactly one boundary loop.
  #[error(
    "mesh has {boundary_edges} boundary half-edges but the anchored loop \
     only has {loop_edges}"
  )]
  MultipleBoundaryLoops {
    /// Number of boundary half-edges in the mesh.
    boundary_edges: usize,
    /// Number of boundary half-edges reachable from the boundary anchor.
    loop_edges: usize,
  },

  /// A parameter is outside of its valid range.
  #[error("invalid parameter: {name} = {value} ({reason})")]
  InvalidParameter {
    /// Parameter name.
    name: &'static str,
    /// The rejected value.
    value: String,
    /// Why it was rejected.
    reason: &'static str,
  },

  /// A validation pass found a broken invariant.
  #[error("topology check failed: {0}")]
  Topology(#[from] TopologyError),

  /// File I/O error.
  #[error("I/O error on {path}: {source}")]
  Io {
    /// File that was being read or written.
    path: PathBuf,
    /// Underlying error.
    #[source]
    source: std::io::Error,
  },

  /// The OBJ loader rejected the input.
  #[error("failed to load {path}: {source}")]
  Load {
    /// File that was being read.
    path: PathBuf,
    /// Underlying error.
    #[source]
    source: tobj::LoadError,
  },
}

impl MeshError {
  /// Create an invalid parameter error.
  pub fn invalid_param<T: std::fmt::Display>(
    name: &'static str,
    value: T,
    reason: &'static str,
  ) -> Self {
    MeshError::InvalidParameter {
      name,
      value: value.to_string(),
      reason,
    }
  }
}

/// Invariant violations reported by
/// [`HalfEdge::check_topology`](crate::HalfEdge::check_topology).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
  #[error("half-edge {0} has an unresolved link")]
  Unlinked(IndexType),

  #[error("half-edge {0} references a removed element")]
  Dangling(IndexType),

  #[error("half-edge {0} is not the opposite of its opposite")]
  OppositeMismatch(IndexType),

  #[error("half-edge {0} cannot be reached from its own previous half-edge")]
  PreviousMismatch(IndexType),

  #[error("boundary half-edge {0} is followed by a face half-edge")]
  BoundaryChain(IndexType),

  #[error("boundary half-edge {0} is not the anchor of its tail vertex")]
  BoundaryAnchor(IndexType),

  #[error("face {0} is not a triangle cycle")]
  FaceCycle(IndexType),

  #[error("vertex {0} has no valid outgoing anchor")]
  VertexAnchor(IndexType),

  #[error("vertex {0} is referenced but removed")]
  RemovedVertex(IndexType),

  #[error("the mesh boundary anchor {0} is not a boundary half-edge")]
  MeshAnchor(IndexType),
}
