use crate::Network;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Bus graph: buses are nodes, lines and links are (undirected) edges.
pub struct BusGraph {
    pub graph: UnGraph<String, String>,
    pub index: HashMap<String, NodeIndex>,
}

/// Island summary reported by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    pub bus_count: usize,
    /// First bus of the island in table order
    pub representative: String,
}

/// Degree and island statistics of the bus graph.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyStats {
    pub bus_count: usize,
    pub edge_count: usize,
    pub islands: Vec<IslandSummary>,
    pub max_degree: usize,
}

/// Build the bus graph. Edges to unknown buses are skipped; `validate` reports them.
pub fn bus_graph(network: &Network) -> BusGraph {
    let mut graph = UnGraph::new_undirected();
    let mut index = HashMap::with_capacity(network.buses.len());
    for bus in network.buses.names() {
        index.insert(bus.to_string(), graph.add_node(bus.to_string()));
    }
    let edges = network
        .lines
        .iter()
        .map(|l| (l.name.as_str(), l.bus0.as_str(), l.bus1.as_str()))
        .chain(
            network
                .links
                .iter()
                .map(|l| (l.name.as_str(), l.bus0.as_str(), l.bus1.as_str())),
        );
    for (name, bus0, bus1) in edges {
        if let (Some(&a), Some(&b)) = (index.get(bus0), index.get(bus1)) {
            graph.add_edge(a, b, name.to_string());
        }
    }
    BusGraph { graph, index }
}

/// Label connected components breadth-first, in bus table order.
pub fn find_islands(network: &Network) -> Vec<IslandSummary> {
    let BusGraph { graph, .. } = bus_graph(network);
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    for start in graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::from([start]);
        let mut members = 0;
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members += 1;
            for neighbor in graph.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        islands.push(IslandSummary {
            island_id: islands.len(),
            bus_count: members,
            representative: graph[start].clone(),
        });
    }
    islands
}

pub fn topology_stats(network: &Network) -> TopologyStats {
    let bus_graph = bus_graph(network);
    let max_degree = bus_graph
        .graph
        .node_indices()
        .map(|node| bus_graph.graph.neighbors(node).count())
        .max()
        .unwrap_or(0);
    TopologyStats {
        bus_count: bus_graph.graph.node_count(),
        edge_count: bus_graph.graph.edge_count(),
        islands: find_islands(network),
        max_degree,
    }
}
