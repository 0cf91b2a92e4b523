use parking_lot::Mutex;

use crate::{
    errors::GraphError,
    graph::{EdgeDirection, Graph, VertexId},
    registry::Handle,
    scoring::VertexScores,
    set::{LongSet, SetCursor},
};

/// One value produced by a [`HandleIterator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Element {
    Long(i64),
    Pair(i64, i64),
    Double(f64),
}

impl Element {
    fn kind(&self) -> &'static str {
        match self {
            Element::Long(_) => "long",
            Element::Pair(..) => "pair",
            Element::Double(_) => "double",
        }
    }
}

/// Object an iterator reads from, resolved by the registry on every step.
#[derive(Clone, Copy)]
pub enum IterSource<'a> {
    Graph(&'a Graph),
    Set(&'a LongSet),
    Map(&'a VertexScores),
    Detached,
}

impl IterSource<'_> {
    fn version(&self) -> Option<u64> {
        match self {
            IterSource::Graph(g) => Some(g.version()),
            IterSource::Set(s) => Some(s.version()),
            IterSource::Map(m) => Some(m.version()),
            IterSource::Detached => None,
        }
    }
}

#[derive(Debug)]
enum Cursor {
    Vertices(usize),
    Edges(usize),
    Incident {
        vertex: VertexId,
        direction: EdgeDirection,
        pos: usize,
    },
    Set(SetCursor),
    Owned(std::vec::IntoIter<Element>),
}

#[derive(Debug)]
struct CursorState {
    cursor: Cursor,
    peeked: Option<Element>,
    exhausted: bool,
}

/// Single-pass cursor stamped with the version of the object it reads.
///
/// Graph and set cursors are lazy: they re-resolve their position against
/// the live source on each step, so any mutation of the source after
/// creation surfaces as `ConcurrentModification`. Once `next` has run past
/// the end the iterator stays exhausted.
#[derive(Debug)]
pub struct HandleIterator {
    origin: Option<Handle>,
    stamp: u64,
    state: Mutex<CursorState>,
}

impl HandleIterator {
    fn with_cursor(origin: Option<Handle>, stamp: u64, cursor: Cursor) -> Self {
        Self {
            origin,
            stamp,
            state: Mutex::new(CursorState {
                cursor,
                peeked: None,
                exhausted: false,
            }),
        }
    }

    pub fn vertices(origin: Handle, graph: &Graph) -> Self {
        Self::with_cursor(Some(origin), graph.version(), Cursor::Vertices(0))
    }

    pub fn edges(origin: Handle, graph: &Graph) -> Self {
        Self::with_cursor(Some(origin), graph.version(), Cursor::Edges(0))
    }

    pub fn incident_edges(
        origin: Handle,
        graph: &Graph,
        vertex: VertexId,
        direction: EdgeDirection,
    ) -> Result<Self, GraphError> {
        if !graph.contains_vertex(vertex) {
            return Err(GraphError::UnknownVertex(vertex));
        }
        Ok(Self::with_cursor(
            Some(origin),
            graph.version(),
            Cursor::Incident {
                vertex,
                direction,
                pos: 0,
            },
        ))
    }

    pub fn set(origin: Handle, set: &LongSet) -> Self {
        Self::with_cursor(Some(origin), set.version(), Cursor::Set(set.cursor()))
    }

    /// Keys of a score map, snapshotted but still checked against the
    /// map's version.
    pub fn map_keys(origin: Handle, map: &VertexScores) -> Self {
        let keys: Vec<Element> = map.keys().map(Element::Long).collect();
        Self::with_cursor(Some(origin), map.version(), Cursor::Owned(keys.into_iter()))
    }

    /// Iterator over a computed sequence with no live source.
    pub fn owned(elements: Vec<Element>) -> Self {
        Self::with_cursor(None, 0, Cursor::Owned(elements.into_iter()))
    }

    pub fn origin(&self) -> Option<Handle> {
        self.origin
    }

    pub fn has_next(&self, source: IterSource<'_>) -> Result<bool, GraphError> {
        let mut state = self.state.lock();
        if state.exhausted {
            return Ok(false);
        }
        self.check_version(source)?;
        self.fill(&mut state, source)?;
        Ok(state.peeked.is_some())
    }

    pub fn next(&self, source: IterSource<'_>) -> Result<Element, GraphError> {
        let mut state = self.state.lock();
        if state.exhausted {
            return Err(GraphError::NoSuchElement);
        }
        self.check_version(source)?;
        self.fill(&mut state, source)?;
        state.peeked.take().ok_or(GraphError::NoSuchElement)
    }

    pub fn next_long(&self, source: IterSource<'_>) -> Result<i64, GraphError> {
        match self.next_matching(source, |e| matches!(e, Element::Long(_)))? {
            Element::Long(v) => Ok(v),
            other => Err(type_mismatch("long", &other)),
        }
    }

    pub fn next_pair(&self, source: IterSource<'_>) -> Result<(i64, i64), GraphError> {
        match self.next_matching(source, |e| matches!(e, Element::Pair(..)))? {
            Element::Pair(a, b) => Ok((a, b)),
            other => Err(type_mismatch("pair", &other)),
        }
    }

    pub fn next_double(&self, source: IterSource<'_>) -> Result<f64, GraphError> {
        match self.next_matching(source, |e| matches!(e, Element::Double(_)))? {
            Element::Double(v) => Ok(v),
            other => Err(type_mismatch("double", &other)),
        }
    }

    /// Takes the next element only if `accept` holds; a rejected element
    /// stays queued.
    fn next_matching(
        &self,
        source: IterSource<'_>,
        accept: impl Fn(&Element) -> bool,
    ) -> Result<Element, GraphError> {
        let mut state = self.state.lock();
        if state.exhausted {
            return Err(GraphError::NoSuchElement);
        }
        self.check_version(source)?;
        self.fill(&mut state, source)?;
        match state.peeked {
            Some(element) if accept(&element) => {
                state.peeked = None;
                Ok(element)
            }
            Some(element) => Ok(element),
            None => Err(GraphError::NoSuchElement),
        }
    }

    fn check_version(&self, source: IterSource<'_>) -> Result<(), GraphError> {
        match source.version() {
            Some(current) if current != self.stamp => Err(GraphError::concurrent_modification(
                format!("source changed from version {} to {current}", self.stamp),
            )),
            _ => Ok(()),
        }
    }

    fn fill(&self, state: &mut CursorState, source: IterSource<'_>) -> Result<(), GraphError> {
        if state.peeked.is_some() {
            return Ok(());
        }
        let next = match (&mut state.cursor, source) {
            (Cursor::Owned(elements), _) => elements.next(),
            (Cursor::Vertices(pos), IterSource::Graph(graph)) => {
                graph.vertex_at_or_after(*pos).map(|v| {
                    *pos = v as usize + 1;
                    Element::Long(v)
                })
            }
            (Cursor::Edges(pos), IterSource::Graph(graph)) => {
                graph.edge_at_or_after(*pos).map(|e| {
                    *pos = e as usize + 1;
                    Element::Long(e)
                })
            }
            (
                Cursor::Incident {
                    vertex,
                    direction,
                    pos,
                },
                IterSource::Graph(graph),
            ) => graph
                .incident_edge_at(*vertex, *direction, *pos)?
                .map(|(edge, resume)| {
                    *pos = resume;
                    Element::Long(edge)
                }),
            (Cursor::Set(cursor), IterSource::Set(set)) => set.advance(cursor).map(Element::Long),
            _ => {
                return Err(GraphError::invalid_handle(
                    "iterator source has the wrong kind",
                ));
            }
        };
        match next {
            Some(element) => state.peeked = Some(element),
            None => state.exhausted = true,
        }
        Ok(())
    }
}

fn type_mismatch(wanted: &str, found: &Element) -> GraphError {
    GraphError::illegal_argument(format!(
        "iterator yields {} elements, not {wanted}",
        found.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_iterator_exhausts_permanently() {
        let it = HandleIterator::owned(vec![Element::Long(1), Element::Pair(2, 3)]);
        assert_eq!(it.next_long(IterSource::Detached), Ok(1));
        assert!(it.next_long(IterSource::Detached).is_err());
        assert_eq!(it.next_pair(IterSource::Detached), Ok((2, 3)));
        assert_eq!(it.has_next(IterSource::Detached), Ok(false));
        assert_eq!(it.next(IterSource::Detached), Err(GraphError::NoSuchElement));
        assert_eq!(it.next(IterSource::Detached), Err(GraphError::NoSuchElement));
    }
}
