//! Module-local import graph and cycle detection

use crate::module::{Package, PackageLoader};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

/// A cycle as a closed node path: the first node is repeated at the end
pub type Cycle = Vec<String>;

/// Package import path to the sorted set of module-local packages it imports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Graph from explicit `(from, to)` pairs
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Self::default();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    /// Subgraph reachable from `root`, following module-local imports of non-test files
    pub fn build(loader: &PackageLoader, root: &Package) -> Result<Self> {
        let mut graph = Self::default();
        let mut seen = BTreeSet::from([root.import_path.clone()]);
        let mut queue = VecDeque::new();

        graph.add_package(loader, root, &mut seen, &mut queue);
        while let Some(path) = queue.pop_front() {
            if let Some(pkg) = loader.load_import(&path)? {
                graph.add_package(loader, &pkg, &mut seen, &mut queue);
            }
        }
        Ok(graph)
    }

    /// Graph over every given package
    pub fn from_packages(loader: &PackageLoader, packages: &[Arc<Package>]) -> Self {
        let mut graph = Self::default();
        for pkg in packages {
            graph.edges.entry(pkg.import_path.clone()).or_default();
            for import in pkg.imports.iter().filter(|i| loader.is_local(i)) {
                graph.add_edge(&pkg.import_path, import);
            }
        }
        graph
    }

    fn add_package(
        &mut self,
        loader: &PackageLoader,
        pkg: &Package,
        seen: &mut BTreeSet<String>,
        queue: &mut VecDeque<String>,
    ) {
        self.edges.entry(pkg.import_path.clone()).or_default();
        for import in pkg.imports.iter().filter(|i| loader.is_local(i)) {
            self.add_edge(&pkg.import_path, import);
            if seen.insert(import.clone()) {
                queue.push_back(import.clone());
            }
        }
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn successors(&self, node: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(node)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Cycles reachable from `start`
    pub fn find_cycles(&self, start: &str) -> Vec<Cycle> {
        let mut search = CycleSearch::new(self);
        if let Some((node, _)) = self.edges.get_key_value(start) {
            search.visit(node);
        }
        search.cycles
    }

    /// Cycles anywhere in the graph, searching from each node in sorted order
    pub fn find_all_cycles(&self) -> Vec<Cycle> {
        let mut search = CycleSearch::new(self);
        for node in self.nodes() {
            if !search.visited.contains(node) {
                search.visit(node);
            }
        }
        search.cycles
    }
}

/// Depth-first search keeping a permanent visited set and the current path
struct CycleSearch<'g> {
    graph: &'g DependencyGraph,
    visited: HashSet<&'g str>,
    path: Vec<&'g str>,
    on_path: HashSet<&'g str>,
    cycles: Vec<Cycle>,
}

impl<'g> CycleSearch<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            visited: HashSet::new(),
            path: Vec::new(),
            on_path: HashSet::new(),
            cycles: Vec::new(),
        }
    }

    fn visit(&mut self, node: &'g str) {
        self.visited.insert(node);
        self.path.push(node);
        self.on_path.insert(node);

        let graph = self.graph;
        for next in graph.successors(node) {
            if self.on_path.contains(next) {
                if let Some(index) = self.path.iter().position(|n| *n == next) {
                    let mut cycle: Cycle = self.path[index..].iter().map(|n| n.to_string()).collect();
                    cycle.push(next.to_string());
                    self.cycles.push(cycle);
                }
            } else if !self.visited.contains(next) {
                self.visit(next);
            }
        }

        self.path.pop();
        self.on_path.remove(node);
    }
}

/// Edge strings `"a -> b"` of all cycles, de-duplicated in first-seen order
pub fn cycle_edges<F>(cycles: &[Cycle], label: F) -> Vec<String>
where
    F: Fn(&str) -> String,
{
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for cycle in cycles {
        for pair in cycle.windows(2) {
            let edge = format!("{} -> {}", label(&pair[0]), label(&pair[1]));
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }
    }
    edges
}
