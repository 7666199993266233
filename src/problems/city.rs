//! Named cities joined by roads.
//!
//! A thin layer over `WeightedGraph` that looks vertices up by name. Road
//! lengths and heuristics are in kilometres.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::node::SearchNode;
use crate::problems::graph::GraphCost;
use crate::problems::graph::GraphNode;
use crate::problems::graph::VertexId;
use crate::problems::graph::WeightedGraph;

pub type CityId = VertexId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CityMapError {
    #[error("Unknown city '{0}'")]
    UnknownCity(String),
    #[error("City '{0}' was already added")]
    DuplicateCity(String),
}

#[derive(Clone, Debug, Default)]
pub struct CityMap {
    graph: WeightedGraph,
    names: Vec<String>,
    ids: FxHashMap<String, CityId>,
}

impl CityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Adds a city with its straight-line distance to the destination.
    pub fn add_city(&mut self, name: &str, h: GraphCost) -> Result<CityId, CityMapError> {
        if self.ids.contains_key(name) {
            return Err(CityMapError::DuplicateCity(name.to_string()));
        }
        let id = self.graph.add_vertex();
        self.graph.set_heuristic(id, h);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Adds a two-way road.
    pub fn add_road(&mut self, a: &str, b: &str, km: GraphCost) -> Result<&mut Self, CityMapError> {
        let a = self.id(a)?;
        let b = self.id(b)?;
        self.graph.add_undirected_edge(a, b, km);
        Ok(self)
    }

    pub fn id(&self, name: &str) -> Result<CityId, CityMapError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| CityMapError::UnknownCity(name.to_string()))
    }

    pub fn name(&self, id: CityId) -> &str {
        &self.names[id]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn graph(&self) -> &WeightedGraph {
        &self.graph
    }

    pub fn city(&self, name: &str) -> Result<CityNode<'_>, CityMapError> {
        Ok(CityNode {
            map: self,
            node: self.graph.node(self.id(name)?),
        })
    }

    /// Roads of south-west Germany, with the straight-line distances to
    /// Würzburg as heuristic.
    ///
    /// ```
    /// use astar::problems::city::CityMap;
    /// let map = CityMap::southwest_germany();
    /// assert_eq!(map.len(), 7);
    /// assert!(map.city("Würzburg").is_ok());
    /// ```
    pub fn southwest_germany() -> Self {
        const CITIES: [(&str, GraphCost); 7] = [
            ("Saarbrücken", 222),
            ("Kaiserslautern", 158),
            ("Karlsruhe", 140),
            ("Frankfurt", 96),
            ("Ludwigshafen", 108),
            ("Heilbronn", 87),
            ("Würzburg", 0),
        ];
        const ROADS: [(&str, &str, GraphCost); 8] = [
            ("Saarbrücken", "Kaiserslautern", 70),
            ("Saarbrücken", "Karlsruhe", 145),
            ("Kaiserslautern", "Frankfurt", 103),
            ("Kaiserslautern", "Ludwigshafen", 53),
            ("Karlsruhe", "Heilbronn", 84),
            ("Ludwigshafen", "Würzburg", 183),
            ("Frankfurt", "Würzburg", 116),
            ("Heilbronn", "Würzburg", 102),
        ];

        match Self::from_tables(&CITIES, &ROADS) {
            Ok(map) => map,
            Err(e) => unreachable!("The built-in road map is broken: {e}"),
        }
    }

    /// Builds a map out of `(name, h)` cities and `(a, b, km)` roads.
    pub fn from_tables(
        cities: &[(&str, GraphCost)],
        roads: &[(&str, &str, GraphCost)],
    ) -> Result<Self, CityMapError> {
        let mut map = Self::new();
        for &(name, h) in cities {
            map.add_city(name, h)?;
        }
        for &(a, b, km) in roads {
            map.add_road(a, b, km)?;
        }
        Ok(map)
    }
}

/// A city of a `CityMap`.
///
/// Equality only looks at the city.
#[derive(Copy, Clone)]
pub struct CityNode<'m> {
    map: &'m CityMap,
    node: GraphNode<'m>,
}

impl PartialEq for CityNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}
impl Eq for CityNode<'_> {}

impl std::hash::Hash for CityNode<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node.hash(state)
    }
}

impl<'m> CityNode<'m> {
    pub fn id(&self) -> CityId {
        self.node.id()
    }
    pub fn name(&self) -> &'m str {
        self.map.name(self.node.id())
    }
}

impl std::fmt::Display for CityNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Debug for CityNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl SearchNode for CityNode<'_> {
    type Cost = GraphCost;

    fn successors(&self) -> Vec<Self> {
        self.node
            .successors()
            .into_iter()
            .map(|node| CityNode { node, ..*self })
            .collect()
    }
    fn cost(&self, to: &Self) -> GraphCost {
        self.node.cost(&to.node)
    }
    fn h(&self) -> GraphCost {
        self.node.h()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let map = CityMap::southwest_germany();
        let sb = map.city("Saarbrücken").unwrap();
        assert_eq!(sb.name(), "Saarbrücken");
        assert_eq!(sb.h(), 222);

        let next: Vec<&str> = sb.successors().iter().map(|c| c.name()).collect();
        assert_eq!(next, vec!["Kaiserslautern", "Karlsruhe"]);
        assert_eq!(sb.cost(&map.city("Karlsruhe").unwrap()), 145);

        assert_eq!(
            map.city("Berlin").unwrap_err(),
            CityMapError::UnknownCity("Berlin".to_string())
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut map = CityMap::new();
        assert_eq!(map.add_city("Mainz", 10), Ok(0));
        assert_eq!(
            map.add_city("Mainz", 12),
            Err(CityMapError::DuplicateCity("Mainz".to_string()))
        );
        assert!(map.add_road("Mainz", "Trier", 5).is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn tables_with_typos_are_rejected() {
        let cities = [("Frankfurt", 96), ("Würzburg", 0)];

        let map = CityMap::from_tables(&cities, &[("Frankfurt", "Würzburg", 116)]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.graph().edge_cost(0, 1), Some(116));

        assert_eq!(
            CityMap::from_tables(&cities, &[("Frankfurt", "Wurzburg", 116)]).unwrap_err(),
            CityMapError::UnknownCity("Wurzburg".to_string())
        );
        assert_eq!(
            CityMap::from_tables(&[("Mainz", 1), ("Mainz", 2)], &[]).unwrap_err(),
            CityMapError::DuplicateCity("Mainz".to_string())
        );
    }
}
