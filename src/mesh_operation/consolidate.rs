use std::collections::HashSet;

use clap::Args;
use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::data_structure::HalfEdge;
use crate::data_structure::IndexType;
use crate::error::MeshError;
use crate::error::Result;
use crate::mesh_operation::Operation;

/// Merges edge-adjacent vertices that lie closer than `tolerance` to each
/// other by collapsing the edge between them.
///
/// Only vertices connected by an edge are considered: two coincident
/// vertices of separate patches stay apart. When several vertices are
/// mutually within tolerance the one visited first (lowest id) survives and
/// keeps its position.
#[derive(Args, Debug, Clone)]
pub struct Consolidate {
  /// Vertices closer than this (strictly) are merged
  #[arg(long, default_value_t = Consolidate::DEFAULT_TOLERANCE)]
  pub tolerance: f32,
}

impl Consolidate {
  pub const DEFAULT_TOLERANCE: f32 = 0.01;

  pub fn new(tolerance: f32) -> Self {
    Consolidate { tolerance }
  }
}

impl Default for Consolidate {
  fn default() -> Self {
    Consolidate::new(Consolidate::DEFAULT_TOLERANCE)
  }
}

impl Operation for Consolidate {
  /// Number of vertices removed.
  type Output = usize;

  fn apply(&self, mesh: &mut HalfEdge) -> Result<usize> {
    if !self.tolerance.is_finite() || self.tolerance < 0.0 {
      return Err(MeshError::invalid_param(
        "tolerance",
        self.tolerance,
        "must be a finite, non-negative distance",
      ));
    }

    let before = mesh.num_vertices();
    let removed = mesh.consolidate_vertices(self.tolerance);

    info!(
      "consolidated vertices within {}: {} of {} removed",
      self.tolerance, removed, before
    );

    Ok(removed)
  }
}

// One face beside a collapsing edge x -> y, with apex z.
struct Wing {
  // x -> y, y -> z, z -> x
  half_edges: [IndexType; 3],
  face: IndexType,
  apex: IndexType,
  // z -> y, opposite of y -> z
  from_apex: IndexType,
  // x -> z, opposite of z -> x
  to_apex: IndexType,
  // both sides are on the boundary, so the apex hangs off this face only
  dangling: bool,
}

impl Wing {
  fn new(mesh: &HalfEdge, half_edge: IndexType) -> Option<Wing> {
    let face = mesh.face(half_edge)?;
    let second = mesh.next(half_edge);
    let third = mesh.next(second);
    let from_apex = mesh.opposite(second);
    let to_apex = mesh.opposite(third);

    Some(Wing {
      half_edges: [half_edge, second, third],
      face,
      apex: mesh.head(second),
      from_apex,
      to_apex,
      dangling: mesh.is_boundary(from_apex) && mesh.is_boundary(to_apex),
    })
  }
}

impl HalfEdge {
  pub(crate) fn consolidate_vertices(&mut self, tolerance: f32) -> usize {
    let tolerance_sq = tolerance * tolerance;
    let mut ring = Vec::new();

    // a merge can make a pair skipped earlier in the sweep collapsible
    let mut merged = true;
    while merged {
      merged = false;

      for vertex in self.vertex_keys() {
        if self.vertex_refs[vertex as usize].removed {
          continue;
        }

        let mut start = match self.vertex_half_edge(vertex) {
          Some(half_edge_idx) => half_edge_idx,
          None => continue,
        };

        let position = self.get_position(vertex);

        loop {
          self.ring_from(start, &mut ring);

          let doomed = ring.iter().copied().find(|&half_edge_idx| {
            let diff = self.get_position(self.head(half_edge_idx)) - position;
            diff.norm_squared() < tolerance_sq
              && self.is_collapse_ok(half_edge_idx)
          });

          match doomed {
            Some(half_edge_idx) => {
              trace!(
                "merging vertex {} into vertex {}",
                self.head(half_edge_idx),
                vertex
              );
              start = self.collapse_edge(half_edge_idx);
              merged = true;
            }
            None => break,
          }
        }
      }
    }

    let removed = self.vertex_refs.iter().filter(|v| v.removed).count();

    if removed > 0 {
      self.compact();
    } else {
      self.update_boundary_edge_pointer();
    }

    debug!(
      "{} vertices, {} faces and {} half-edges after consolidation",
      self.num_vertices(),
      self.num_faces(),
      self.num_half_edges()
    );

    self.verify_topology();

    removed
  }

  /// Whether collapsing `v_n` keeps the mesh manifold.
  fn is_collapse_ok(&self, v_n: IndexType) -> bool {
    let n_v = self.opposite(v_n);
    let v = self.head(n_v);
    let n = self.head(v_n);

    let top = Wing::new(self, v_n);
    let bottom = Wing::new(self, n_v);

    let top_gone = top.as_ref().map_or(true, |w| w.dangling);
    let bottom_gone = bottom.as_ref().map_or(true, |w| w.dangling);

    // the collapse would swallow a whole component
    if top_gone && bottom_gone {
      return false;
    }

    let mut apexes: Vec<IndexType> =
      top.iter().chain(bottom.iter()).map(|w| w.apex).collect();

    if apexes.len() == 2 {
      if apexes[0] == apexes[1] {
        return false;
      }

      // an interior edge between two boundary vertices would pinch the
      // boundary, unless one side is an ear that goes away with it
      if self.is_boundary_vertex(v)
        && self.is_boundary_vertex(n)
        && !top_gone
        && !bottom_gone
      {
        return false;
      }
    }

    // link condition: v and n may only share the apexes of the removed faces
    let mut neighbors = Vec::new();
    self.get_vertex_neighbors(v, &mut neighbors);
    let v_neighbors: HashSet<IndexType> = neighbors.iter().copied().collect();

    self.get_vertex_neighbors(n, &mut neighbors);
    let mut common: Vec<IndexType> = neighbors
      .iter()
      .copied()
      .filter(|neighbor| v_neighbors.contains(neighbor))
      .collect();

    common.sort_unstable();
    common.dedup();
    apexes.sort_unstable();

    common == apexes
  }

  /// Collapses `v_n`, merging its head into its tail.
  ///
  /// Returns an outgoing half-edge of the surviving vertex from which its
  /// one-ring walk can continue.
  fn collapse_edge(&mut self, v_n: IndexType) -> IndexType {
    let n_v = self.opposite(v_n);
    let v = self.head(n_v);
    let n = self.head(v_n);

    let top = Wing::new(self, v_n);
    let bottom = Wing::new(self, n_v);

    let resume = match &top {
      None => self.next(v_n),
      Some(wing) => wing.to_apex,
    };

    // boundary half-edges that disappear with the collapse
    let mut doomed_boundary = Vec::with_capacity(4);
    for (wing, half_edge_idx) in [(&top, v_n), (&bottom, n_v)] {
      match wing {
        None => doomed_boundary.push(half_edge_idx),
        Some(wing) if wing.dangling => {
          doomed_boundary.push(wing.to_apex);
          doomed_boundary.push(wing.from_apex);
        }
        Some(_) => {}
      }
    }

    // chain each boundary loop around the doomed half-edges, computed on
    // the intact graph
    let relinks: Vec<(IndexType, IndexType)> = doomed_boundary
      .iter()
      .filter_map(|&doomed| {
        let previous = self.previous(doomed);
        if doomed_boundary.contains(&previous) {
          return None;
        }
        let mut successor = self.next(doomed);
        while doomed_boundary.contains(&successor) {
          successor = self.next(successor);
        }
        Some((previous, successor))
      })
      .collect();

    let mut incoming = Vec::new();
    let mut doomed_incoming = self.opposite(self.next(v_n));
    while doomed_incoming != v_n {
      incoming.push(doomed_incoming);
      doomed_incoming = self.opposite(self.next(doomed_incoming));
    }

    for half_edge_idx in incoming {
      self.half_edge_mut(half_edge_idx).head_idx = v;
    }

    for wing in top.iter().chain(bottom.iter()) {
      self.half_edge_mut(wing.from_apex).opposite_idx = wing.to_apex;
      self.half_edge_mut(wing.to_apex).opposite_idx = wing.from_apex;

      for &half_edge_idx in &wing.half_edges {
        self.half_edge_mut(half_edge_idx).removed = true;
      }
      self.face_refs[wing.face as usize].removed = true;

      if wing.dangling {
        self.half_edge_mut(wing.from_apex).removed = true;
        self.half_edge_mut(wing.to_apex).removed = true;
        let apex = &mut self.vertex_refs[wing.apex as usize];
        apex.removed = true;
        apex.half_edge_idx = None;
      } else if self.vertex_half_edge(wing.apex) == Some(wing.half_edges[2]) {
        self.vertex_refs[wing.apex as usize].half_edge_idx =
          Some(wing.from_apex);
      }
    }

    self.half_edge_mut(v_n).removed = true;
    self.half_edge_mut(n_v).removed = true;

    for (previous, successor) in relinks {
      self.half_edge_mut(previous).next_idx = successor;
    }

    let doomed_vertex = &mut self.vertex_refs[n as usize];
    doomed_vertex.removed = true;
    doomed_vertex.half_edge_idx = None;

    // re-anchor v, on its outgoing boundary half-edge if it has one
    let mut candidates = vec![self.vertex_half_edge(v)];
    for (wing, half_edge_idx) in [(&top, v_n), (&bottom, n_v)] {
      candidates.push(match wing {
        Some(wing) => Some(wing.to_apex),
        None => Some(self.next(half_edge_idx)),
      });
    }

    let seed = candidates.into_iter().flatten().find(|&half_edge_idx| {
      !self.half_edge_refs[half_edge_idx as usize].removed
    });

    let mut anchor = None;
    if let Some(seed) = seed {
      let mut ring = Vec::new();
      self.ring_from(seed, &mut ring);
      anchor = ring
        .iter()
        .copied()
        .find(|&half_edge_idx| self.is_boundary(half_edge_idx))
        .or(Some(seed));
    }
    self.vertex_refs[v as usize].half_edge_idx = anchor;

    if self.half_edge_refs[resume as usize].removed {
      anchor.unwrap_or(resume)
    } else {
      resume
    }
  }
}
