use crate::data_structure::HalfEdge;
use crate::data_structure::Vertex;
use crate::error::MeshError;
use crate::error::Result;
use crate::mesh_operation::Operation;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use clap::Args;
use tracing::debug;

/// Displaces every vertex along its normal by a normally distributed amount.
///
/// Run before consolidation this turns exactly coincident seams into
/// near-duplicates, the way independently generated strips come out.
#[derive(Args, Debug, Clone)]
pub struct Noise {
  /// Standard deviation of the displacement
  #[arg(long = "noise", default_value_t = 0.0)]
  pub sigma: f32,
  /// Seed for reproducible noise
  #[arg(long)]
  pub seed: Option<u64>,
}

impl Noise {
  pub fn new(sigma: f32, seed: Option<u64>) -> Self {
    Noise { sigma, seed }
  }
}

impl Operation for Noise {
  type Output = ();

  fn apply(&self, mesh: &mut HalfEdge) -> Result<()> {
    let invalid = || {
      MeshError::invalid_param(
        "sigma",
        self.sigma,
        "must be a finite, non-negative deviation",
      )
    };

    if !self.sigma.is_finite() || self.sigma < 0.0 {
      return Err(invalid());
    }
    let dist = Normal::new(0.0, self.sigma).map_err(|_| invalid())?;

    let mut rng = match self.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };

    // sample against the unperturbed normals
    let displaced: Vec<Vertex> = mesh
      .vertex_keys()
      .map(|vertex_idx| {
        let normal = mesh.vertex_normal(vertex_idx);
        mesh.get_position(vertex_idx) + normal * dist.sample(&mut rng)
      })
      .collect();

    for (vertex_idx, position) in mesh.vertex_keys().zip(displaced.iter()) {
      mesh.set_position(vertex_idx, position);
    }

    debug!(
      "perturbed {} vertices with sigma {}",
      mesh.num_vertices(),
      self.sigma
    );

    Ok(())
  }
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
  fn same_seed_same_noise() {
    let mut first = unit_square();
    let mut second = unit_square();
    Noise::new(0.1, Some(7)).apply(&mut first).unwrap();
    Noise::new(0.1, Some(7)).apply(&mut second).unwrap();

    for vertex in first.vertex_keys() {
      assert_eq!(first.get_position(vertex), second.get_position(vertex));
    }
  }

  #[test]
  fn flat_sheet_moves_along_z_only() {
    let mut mesh = unit_square();
    Noise::new(0.1, Some(3)).apply(&mut mesh).unwrap();

    assert_eq!(mesh.get_position(2).x, 1.0);
    assert_eq!(mesh.get_position(2).y, 1.0);
    assert!(mesh.vertex_keys().any(|v| mesh.get_position(v).z != 0.0));
    mesh.check_topology().unwrap();
  }

  #[test]
  fn zero_sigma_keeps_positions() {
    let mut mesh = unit_square();
    Noise::new(0.0, Some(1)).apply(&mut mesh).unwrap();
    assert_eq!(mesh.get_position(2), Vertex::new(1.0, 1.0, 0.0));
  }

  #[test]
  fn rejects_negative_sigma() {
    let mut mesh = unit_square();
    assert!(Noise::new(-1.0, None).apply(&mut mesh).is_err());
  }
}
