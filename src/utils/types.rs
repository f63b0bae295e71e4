// Type aliases for data values.
pub type Vertex2 = [f64; 2];

// Type aliases for data indices.
pub type VertexIdx = usize;

// Type aliases for data structure indices.
// This is to know, when a function accepts or returns a usize, what it is for.
pub type HedgeIteratorIdx = usize;
pub type TriIteratorIdx = usize;

/// Marks a missing neighbor, i.e. a triangle edge on the mesh boundary.
pub const NO_NEIGHBOR: TriIteratorIdx = u32::MAX as usize;
/// Marks a missing vertex.
pub const NO_VERTEX: VertexIdx = u32::MAX as usize;
