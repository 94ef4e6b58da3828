use crate::data_structure::Vertex;

// unnormalized; its length is twice the triangle's area
pub fn get_normal(vertices: [Vertex; 3]) -> Vertex {
  (vertices[1] - vertices[0]).cross(&(vertices[2] - vertices[0]))
}

pub fn normalize_or_zero(vector: Vertex) -> Vertex {
  vector.try_normalize(f32::EPSILON).unwrap_or_else(Vertex::zeros)
}
