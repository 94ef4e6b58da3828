use crate::data_structure::HalfEdge;
use crate::error::Result;

pub trait Operation {
  type Output;

  fn apply(&self, mesh: &mut HalfEdge) -> Result<Self::Output>;
}

mod consolidate;
mod noise;
mod solidify;

pub use consolidate::Consolidate;
pub use noise::Noise;
pub use solidify::Solidify;
