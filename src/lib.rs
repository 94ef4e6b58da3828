pub mod data_structure;
pub mod error;
pub mod export;
pub mod mesh_operation;
pub mod soup;
pub mod strip;
mod utils;

pub use data_structure::HalfEdge;
pub use data_structure::IndexType;
pub use data_structure::Vertex;

pub use error::MeshError;
pub use error::Result;
pub use error::TopologyError;

pub use export::ObjWriter;
pub use export::RenderBuffer;
pub use export::RenderVertex;

pub use mesh_operation::Operation;

pub use mesh_operation::Consolidate;
pub use mesh_operation::Noise;
pub use mesh_operation::Solidify;

pub use soup::TriangleSoup;
pub use strip::Envelope;
pub use strip::GeometryStrip;
