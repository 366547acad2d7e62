//! Parent search from the root, used by copy/paste and "reveal in schema"
//! navigation in the editor.
use petgraph::graph::NodeIndex;
use petgraph::visit::Bfs;

use crate::graph::{GraphError, SchemaGraph};
use crate::vertex::VertexId;

/// A parent of some vertex that also carries a same-named edge to another
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingParent {
    /// The parent vertex.
    pub parent: VertexId,
    /// Name of the edge from `parent` to the searched vertex.
    pub name: String,
    /// Target of the other edge with the same name.
    pub sibling: VertexId,
}

impl SchemaGraph {
    /// Breadth-first walk from the root handing each visited identifier to
    /// `inspect`, stopping early when it returns `Some`.
    fn search_from_root<T>(
        &self,
        mut inspect: impl FnMut(VertexId) -> Result<Option<T>, GraphError>,
    ) -> Result<Option<T>, GraphError> {
        let mut bfs = Bfs::new(&self.graph, NodeIndex::from(self.root()));
        while let Some(node) = bfs.next(&self.graph) {
            if let Some(found) = inspect(VertexId::from(node))? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Every vertex reachable from the root with an edge targeting `vertex`.
    ///
    /// Parents are returned in breadth-first discovery order, each once.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `vertex` is not live.
    pub fn parent_vertices(&self, vertex: VertexId) -> Result<Vec<VertexId>, GraphError> {
        self.check_id(vertex)?;
        let mut parents: Vec<VertexId> = Vec::new();
        self.search_from_root::<()>(|current| {
            if self
                .emanating_edges(current)?
                .iter()
                .any(|edge| edge.target() == vertex)
            {
                parents.push(current);
            }
            Ok(None)
        })?;
        Ok(parents)
    }

    /// The first parent of `vertex`, in breadth-first order from the root,
    /// that has a second edge with the same name pointing at an identifier.
    ///
    /// Recovers the structurally equivalent location of a vertex after a
    /// shared identifier was copied or linked elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidReference`] if `vertex` is not live.
    pub fn matching_parent(&self, vertex: VertexId) -> Result<Option<MatchingParent>, GraphError> {
        self.check_id(vertex)?;
        self.search_from_root(|current| {
            let edges = self.emanating_edges(current)?;
            for (position, edge) in edges.iter().enumerate() {
                if edge.target() != vertex {
                    continue;
                }
                for (other_position, other) in edges.iter().enumerate() {
                    if other_position == position
                        || other.name() != edge.name()
                        || other.target() == vertex
                    {
                        continue;
                    }
                    if self.vertex(other.target())?.is_identifier() {
                        return Ok(Some(MatchingParent {
                            parent: current,
                            name: edge.name().to_owned(),
                            sibling: other.target(),
                        }));
                    }
                }
            }
            Ok(None)
        })
    }
}
