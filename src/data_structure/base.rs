use nalgebra::base::Vector3;

pub type IndexType = u32;

pub type Vertex = Vector3<f32>;
pub type Face = [IndexType; 3];

// marks a next/opposite link that the builder has not resolved yet
pub(crate) const UNSET: IndexType = IndexType::MAX;
