use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::{Key, KeyData, SlotMap, new_key_type};
use tracing::trace;

use crate::{
    codec::EdgeList,
    errors::GraphError,
    graph::Graph,
    iterator::{Element, HandleIterator, IterSource},
    matching::Matching,
    planarity::{KuratowskiSubdivision, PlanarEmbedding},
    scoring::VertexScores,
    set::LongSet,
};

new_key_type! {
    pub struct HandleKey;
}

/// Opaque token naming one live object in a [`HandleRegistry`].
///
/// The raw value packs slot index and generation, so a handle to a destroyed
/// object never resolves again even after its slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    fn key(self) -> HandleKey {
        KeyData::from_ffi(self.0).into()
    }
}

impl From<HandleKey> for Handle {
    fn from(key: HandleKey) -> Self {
        Self(key.data().as_ffi())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Graph,
    Set,
    Map,
    Iterator,
    Matching,
    Embedding,
    Kuratowski,
    EdgeList,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Graph => "graph",
            ObjectKind::Set => "set",
            ObjectKind::Map => "map",
            ObjectKind::Iterator => "iterator",
            ObjectKind::Matching => "matching",
            ObjectKind::Embedding => "planar embedding",
            ObjectKind::Kuratowski => "kuratowski subdivision",
            ObjectKind::EdgeList => "edge list",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum NativeObject {
    Graph(Graph),
    Set(LongSet),
    Map(VertexScores),
    Iterator(HandleIterator),
    Matching(Matching),
    Embedding(PlanarEmbedding),
    Kuratowski(KuratowskiSubdivision),
    EdgeList(EdgeList),
}

impl NativeObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            NativeObject::Graph(_) => ObjectKind::Graph,
            NativeObject::Set(_) => ObjectKind::Set,
            NativeObject::Map(_) => ObjectKind::Map,
            NativeObject::Iterator(_) => ObjectKind::Iterator,
            NativeObject::Matching(_) => ObjectKind::Matching,
            NativeObject::Embedding(_) => ObjectKind::Embedding,
            NativeObject::Kuratowski(_) => ObjectKind::Kuratowski,
            NativeObject::EdgeList(_) => ObjectKind::EdgeList,
        }
    }

    /// Edge or vertex set exposed by this object, if it has one.
    pub fn long_set(&self) -> Option<&LongSet> {
        match self {
            NativeObject::Set(set) => Some(set),
            NativeObject::Matching(matching) => Some(matching.edges()),
            NativeObject::Kuratowski(subdivision) => Some(subdivision.edges()),
            _ => None,
        }
    }
}

fn wrong_kind(handle: Handle, expected: ObjectKind, found: ObjectKind) -> GraphError {
    GraphError::invalid_handle(format!("handle {handle} is a {found}, expected a {expected}"))
}

macro_rules! typed_access {
    ($($get:ident, $get_mut:ident => $variant:ident($ty:ty);)*) => {
        $(
            pub fn $get(&self, handle: Handle) -> Result<&$ty, GraphError> {
                match self.get(handle)? {
                    NativeObject::$variant(obj) => Ok(obj),
                    other => Err(wrong_kind(handle, ObjectKind::$variant, other.kind())),
                }
            }

            pub fn $get_mut(&mut self, handle: Handle) -> Result<&mut $ty, GraphError> {
                match self.get_mut(handle)? {
                    NativeObject::$variant(obj) => Ok(obj),
                    other => {
                        let found = other.kind();
                        Err(wrong_kind(handle, ObjectKind::$variant, found))
                    }
                }
            }
        )*
    };
}

/// Sole owner of every object reachable through a [`Handle`].
#[derive(Debug, Default)]
pub struct HandleRegistry {
    objects: SlotMap<HandleKey, NativeObject>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: NativeObject) -> Handle {
        let kind = object.kind();
        let handle = Handle::from(self.objects.insert(object));
        trace!(%handle, %kind, "handle created");
        handle
    }

    /// Frees the object. A second call with the same handle is
    /// `InvalidHandle`.
    pub fn destroy(&mut self, handle: Handle) -> Result<(), GraphError> {
        match self.objects.remove(handle.key()) {
            Some(object) => {
                trace!(%handle, kind = %object.kind(), "handle destroyed");
                Ok(())
            }
            None => Err(GraphError::invalid_handle(format!(
                "handle {handle} is not live"
            ))),
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(handle.key())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn kind_of(&self, handle: Handle) -> Result<ObjectKind, GraphError> {
        Ok(self.get(handle)?.kind())
    }

    pub fn get(&self, handle: Handle) -> Result<&NativeObject, GraphError> {
        self.objects
            .get(handle.key())
            .ok_or_else(|| GraphError::invalid_handle(format!("handle {handle} is not live")))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut NativeObject, GraphError> {
        self.objects
            .get_mut(handle.key())
            .ok_or_else(|| GraphError::invalid_handle(format!("handle {handle} is not live")))
    }

    typed_access! {
        graph, graph_mut => Graph(Graph);
        set, set_mut => Set(LongSet);
        map, map_mut => Map(VertexScores);
        iterator, iterator_mut => Iterator(HandleIterator);
        matching, matching_mut => Matching(Matching);
        embedding, embedding_mut => Embedding(PlanarEmbedding);
        kuratowski, kuratowski_mut => Kuratowski(KuratowskiSubdivision);
        edge_list, edge_list_mut => EdgeList(EdgeList);
    }

    /// Read access to any set-like object: plain sets, matchings and
    /// Kuratowski subdivisions.
    pub fn long_set(&self, handle: Handle) -> Result<&LongSet, GraphError> {
        let object = self.get(handle)?;
        object
            .long_set()
            .ok_or_else(|| wrong_kind(handle, ObjectKind::Set, object.kind()))
    }

    /// Write access to a plain set; result objects are read-only.
    pub fn long_set_mut(&mut self, handle: Handle) -> Result<&mut LongSet, GraphError> {
        match self.get_mut(handle)? {
            NativeObject::Set(set) => Ok(set),
            NativeObject::Matching(_) | NativeObject::Kuratowski(_) => Err(
                GraphError::unsupported(format!("set behind handle {handle} is read-only")),
            ),
            other => {
                let found = other.kind();
                Err(wrong_kind(handle, ObjectKind::Set, found))
            }
        }
    }

    pub fn iterator_has_next(&self, handle: Handle) -> Result<bool, GraphError> {
        let iterator = self.iterator(handle)?;
        iterator.has_next(self.iter_source(iterator)?)
    }

    pub fn iterator_next(&self, handle: Handle) -> Result<Element, GraphError> {
        let iterator = self.iterator(handle)?;
        iterator.next(self.iter_source(iterator)?)
    }

    pub fn iterator_next_long(&self, handle: Handle) -> Result<i64, GraphError> {
        let iterator = self.iterator(handle)?;
        iterator.next_long(self.iter_source(iterator)?)
    }

    pub fn iterator_next_pair(&self, handle: Handle) -> Result<(i64, i64), GraphError> {
        let iterator = self.iterator(handle)?;
        iterator.next_pair(self.iter_source(iterator)?)
    }

    pub fn iterator_next_double(&self, handle: Handle) -> Result<f64, GraphError> {
        let iterator = self.iterator(handle)?;
        iterator.next_double(self.iter_source(iterator)?)
    }

    fn iter_source(&self, iterator: &HandleIterator) -> Result<IterSource<'_>, GraphError> {
        let Some(origin) = iterator.origin() else {
            return Ok(IterSource::Detached);
        };
        let object = self.objects.get(origin.key()).ok_or_else(|| {
            GraphError::concurrent_modification(format!(
                "iterator source {origin} was destroyed"
            ))
        })?;
        match object {
            NativeObject::Graph(graph) => Ok(IterSource::Graph(graph)),
            NativeObject::Map(map) => Ok(IterSource::Map(map)),
            other => other
                .long_set()
                .map(IterSource::Set)
                .ok_or_else(|| wrong_kind(origin, ObjectKind::Set, other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;

    #[test]
    fn reused_slot_rejects_stale_handle() {
        let mut registry = HandleRegistry::new();
        let first = registry.insert(NativeObject::Set(LongSet::linked()));
        registry.destroy(first).expect("destroy");
        let second = registry.insert(NativeObject::Graph(Graph::new(GraphConfig::default())));
        assert_ne!(first, second);
        assert!(registry.get(first).is_err());
        assert!(registry.graph(second).is_ok());
    }

    #[test]
    fn wrong_kind_is_invalid_handle() {
        let mut registry = HandleRegistry::new();
        let set = registry.insert(NativeObject::Set(LongSet::linked()));
        let err = registry.graph(set).expect_err("kind mismatch");
        assert!(matches!(err, GraphError::InvalidHandle(_)));
    }
}
