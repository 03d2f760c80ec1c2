//! Export of the reconstructed surface as a 2-D triangulation data
//! structure, plus boundary iteration.
//!
//! The exported [`Tds2`] is self-contained: vertices are re-indexed densely
//! with index `0` reserved for a sentinel, surface facets become oriented
//! faces, and every open border half-edge `u → v` becomes a *hole face*
//! `(v, u, sentinel)` so the face graph is watertight and holes stay
//! traversable. Faces are wired to their edge-neighbors through directed
//! edge matching.

use crate::core::collections::{FastHashMap, FastHashSet};
use crate::core::triangulation_data_structure::VertexKey;
use crate::geometry::point::Point;
use crate::reconstruction::border::VertexState;
use crate::reconstruction::front::{AdvancingFrontSurfaceReconstruction, SelectedFacet};

// =============================================================================
// EXPORTED STRUCTURE
// =============================================================================

/// A vertex of the exported surface.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceVertex {
    point: Point,
    /// Key in the source triangulation; `None` for the sentinel.
    key: Option<VertexKey>,
}

impl SurfaceVertex {
    /// Position of the vertex (the sentinel sits at the origin).
    #[must_use]
    pub const fn point(&self) -> &Point {
        &self.point
    }

    /// Key of the originating triangulation vertex, `None` for the sentinel.
    #[must_use]
    pub const fn key(&self) -> Option<VertexKey> {
        self.key
    }
}

/// A face of the exported surface: three vertex indices, the neighbor across
/// each edge (the edge opposite the slot), and the surface/hole tag.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceFace {
    vertices: [usize; 3],
    neighbors: [Option<usize>; 3],
    surface: bool,
}

impl SurfaceFace {
    /// The three vertex indices, counter-clockwise seen from outside.
    #[must_use]
    pub const fn vertices(&self) -> [usize; 3] {
        self.vertices
    }

    /// Neighbor face across the edge opposite vertex slot `i`.
    #[must_use]
    pub fn neighbor(&self, i: usize) -> Option<usize> {
        self.neighbors[i]
    }

    /// Whether this is a real surface face (hole faces contain the sentinel).
    #[must_use]
    pub const fn is_surface(&self) -> bool {
        self.surface
    }
}

/// The exported 2-D triangulation data structure.
#[derive(Clone, Debug, Default)]
pub struct Tds2 {
    vertices: Vec<SurfaceVertex>,
    faces: Vec<SurfaceFace>,
    index_of: FastHashMap<VertexKey, usize>,
}

impl Tds2 {
    /// An export with only the sentinel vertex.
    fn with_sentinel() -> Self {
        Self {
            vertices: vec![SurfaceVertex {
                point: Point::new([0.0; 3]),
                key: None,
            }],
            faces: Vec::new(),
            index_of: FastHashMap::default(),
        }
    }

    /// Index of the sentinel vertex.
    #[must_use]
    pub const fn sentinel(&self) -> usize {
        0
    }

    /// Number of real (non-sentinel) vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Number of faces, hole faces included.
    #[must_use]
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of surface faces.
    #[must_use]
    pub fn number_of_surface_faces(&self) -> usize {
        self.faces.iter().filter(|f| f.surface).count()
    }

    /// Whether vertex index `i` is a real surface vertex.
    #[must_use]
    pub fn is_on_surface(&self, i: usize) -> bool {
        i != 0 && i < self.vertices.len()
    }

    /// The vertex at index `i`, if any.
    #[must_use]
    pub fn vertex(&self, i: usize) -> Option<&SurfaceVertex> {
        self.vertices.get(i)
    }

    /// The face at index `i`, if any.
    #[must_use]
    pub fn face(&self, i: usize) -> Option<&SurfaceFace> {
        self.faces.get(i)
    }

    /// Export index of a triangulation vertex, if it is on the surface.
    #[must_use]
    pub fn vertex_index(&self, key: VertexKey) -> Option<usize> {
        self.index_of.get(&key).copied()
    }

    /// Iterates over all vertices, sentinel first.
    pub fn vertices(&self) -> impl Iterator<Item = &SurfaceVertex> {
        self.vertices.iter()
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = &SurfaceFace> {
        self.faces.iter()
    }

    /// Iterates over the surface faces as point triples.
    pub fn surface_triangles(&self) -> impl Iterator<Item = [&Point; 3]> {
        self.faces.iter().filter(|f| f.surface).map(move |f| {
            f.vertices.map(|i| self.vertices[i].point())
        })
    }

    fn intern(&mut self, key: VertexKey, point: Point) -> usize {
        if let Some(&i) = self.index_of.get(&key) {
            return i;
        }
        let i = self.vertices.len();
        self.vertices.push(SurfaceVertex {
            point,
            key: Some(key),
        });
        self.index_of.insert(key, i);
        i
    }

    fn push_face(&mut self, vertices: [usize; 3], surface: bool) {
        self.faces.push(SurfaceFace {
            vertices,
            neighbors: [None; 3],
            surface,
        });
    }

    /// Wires every face to its neighbor across each edge by directed-edge
    /// matching. Slot `i` faces the edge opposite vertex `i`.
    fn wire_neighbors(&mut self) {
        let mut by_edge: FastHashMap<(usize, usize), (usize, usize)> = FastHashMap::default();
        for (fi, face) in self.faces.iter().enumerate() {
            let [x, y, z] = face.vertices;
            by_edge.insert((y, z), (fi, 0));
            by_edge.insert((z, x), (fi, 1));
            by_edge.insert((x, y), (fi, 2));
        }
        for fi in 0..self.faces.len() {
            let [x, y, z] = self.faces[fi].vertices;
            for (slot, (a, b)) in [(0, (y, z)), (1, (z, x)), (2, (x, y))] {
                self.faces[fi].neighbors[slot] = by_edge.get(&(b, a)).map(|&(nf, _)| nf);
            }
        }
    }
}

// =============================================================================
// BOUNDARY ITERATION
// =============================================================================

/// One closed boundary loop; the entry vertex appears both first and last.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundaryLoop {
    vertices: Vec<VertexKey>,
}

impl BoundaryLoop {
    /// The loop's vertices in border order, entry vertex repeated at the end.
    #[must_use]
    pub fn vertices(&self) -> &[VertexKey] {
        &self.vertices
    }

    /// Number of distinct vertices (= number of border edges) on the loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Whether the loop is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over the open boundary loops of a reconstruction.
#[derive(Clone, Debug)]
pub struct Boundaries {
    loops: std::vec::IntoIter<Vec<VertexKey>>,
}

impl Iterator for Boundaries {
    type Item = BoundaryLoop;

    fn next(&mut self) -> Option<Self::Item> {
        self.loops.next().map(|vertices| BoundaryLoop { vertices })
    }
}

// =============================================================================
// EXPORT
// =============================================================================

impl AdvancingFrontSurfaceReconstruction {
    /// Builds the exported [`Tds2`] from the selected facets and the
    /// remaining border edges. Runs once, at the end of the driver.
    pub(crate) fn export_surface(&mut self) {
        let mut tds2 = Tds2::with_sentinel();
        let mut facets: Vec<SelectedFacet> = self.selected.values().copied().collect();
        facets.sort_by_key(|s| s.seq);
        for sel in facets {
            let idx = sel.oriented.map(|v| tds2.intern(v, *self.point(v)));
            tds2.push_face(idx, true);
        }
        for (_, elt) in &self.borders {
            let u = tds2.intern(elt.source, *self.point(elt.source));
            let v = tds2.intern(elt.target, *self.point(elt.target));
            tds2.push_face([v, u, 0], false);
        }
        tds2.wire_neighbors();
        self.tds2 = tds2;
    }

    /// Iterates over the open boundary loops. Each loop yields its vertices
    /// in border order with the entry vertex visited twice (first and last).
    #[must_use]
    pub fn boundaries(&self) -> Boundaries {
        let mut visited: FastHashSet<VertexKey> = FastHashSet::default();
        let mut loops: Vec<Vec<VertexKey>> = Vec::new();
        for (_, elt) in &self.borders {
            let start = elt.source;
            if visited.contains(&start) {
                continue;
            }
            visited.insert(start);
            let mut cycle = vec![start];
            let mut current = elt.target;
            let cap = self.borders.len() + 1;
            for _ in 0..cap {
                cycle.push(current);
                if current == start {
                    break;
                }
                visited.insert(current);
                match self
                    .state
                    .get(current)
                    .and_then(VertexState::first_border_successor)
                {
                    Some(next) => current = next,
                    None => break,
                }
            }
            if cycle.len() > 1 && cycle.last() == Some(&start) {
                loops.push(cycle);
            } else {
                eprintln!("advancing front: open border chain does not close");
            }
        }
        Boundaries {
            loops: loops.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point_generation::fibonacci_sphere;
    use crate::reconstruction::options::AfsrOptions;

    #[test]
    fn closed_surface_exports_without_hole_faces() {
        let points = fibonacci_sphere(60, 1.0, [0.0; 3]);
        let afs =
            AdvancingFrontSurfaceReconstruction::new(&points, AfsrOptions::default()).unwrap();
        assert_eq!(afs.number_of_border_edges(), 0);
        let tds2 = afs.tds_2();
        assert_eq!(tds2.number_of_vertices(), afs.number_of_vertices());
        assert_eq!(tds2.number_of_surface_faces(), afs.number_of_facets());
        assert_eq!(tds2.number_of_faces(), tds2.number_of_surface_faces());
        // Closed orientable surface: Euler characteristic 2, every face
        // wired to three neighbors.
        let v = tds2.number_of_vertices() as i64;
        let f = tds2.number_of_surface_faces() as i64;
        let e = 3 * f / 2;
        assert_eq!(v - e + f, 2);
        for face in tds2.faces() {
            for i in 0..3 {
                assert!(face.neighbor(i).is_some());
            }
        }
        assert!(afs.boundaries().next().is_none());
    }

    #[test]
    fn sentinel_is_not_on_surface() {
        let points = fibonacci_sphere(30, 1.0, [0.0; 3]);
        let afs =
            AdvancingFrontSurfaceReconstruction::new(&points, AfsrOptions::default()).unwrap();
        let tds2 = afs.tds_2();
        assert!(!tds2.is_on_surface(tds2.sentinel()));
        assert!(tds2.is_on_surface(1));
        assert!(tds2.vertex(0).unwrap().key().is_none());
        assert!(tds2.vertex(1).unwrap().key().is_some());
    }
}
