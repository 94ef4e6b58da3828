mod base;
pub use base::Face;
pub use base::IndexType;
pub use base::Vertex;
pub(crate) use base::UNSET;

mod builder;
mod half_edge;
mod query;
pub use half_edge::HalfEdge;
pub(crate) use half_edge::FaceRef;
pub(crate) use half_edge::HalfEdgeRef;
pub(crate) use half_edge::VertexRef;
