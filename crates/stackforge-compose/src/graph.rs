//! Dependency graph management using `petgraph`.
//!
//! Orders service descriptors so every dependency starts before the
//! services that depend on it, and reports dangling references and
//! cycles with enough context to fix them.

use std::collections::HashSet;

use indexmap::IndexMap;
use petgraph::graph::NodeIndex;
use stackforge_common::error::{Result, StackforgeError};

use crate::descriptor::{ReadinessCondition, ServiceDescriptor};

/// Traversal state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    /// Not reached yet.
    #[default]
    Unvisited,
    /// On the current traversal path.
    InProgress,
    /// Emitted, with all of its dependencies.
    Done,
}

/// What the traversal does when it reaches a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Recurse into the node's dependencies.
    Descend,
    /// Already emitted; nothing to do.
    Skip,
    /// The node is on the current path: a cycle closes here.
    Cycle,
}

impl VisitState {
    /// Decides what reaching a node in this state means.
    #[must_use]
    pub const fn on_enter(self) -> Visit {
        match self {
            Self::Unvisited => Visit::Descend,
            Self::InProgress => Visit::Cycle,
            Self::Done => Visit::Skip,
        }
    }
}

/// A dependency graph of services.
///
/// Edges point from a dependent to its dependency and carry the
/// readiness condition the dependent waits for.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: petgraph::Graph<String, ReadinessCondition>,
    index: IndexMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            index: IndexMap::new(),
        }
    }

    /// Builds the graph of a descriptor set.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names and on references to unknown services.
    pub fn from_descriptors(descriptors: &[ServiceDescriptor]) -> Result<Self> {
        validate_dependencies(descriptors)?;

        let mut graph = Self::new();
        for descriptor in descriptors {
            let _ = graph.add_service(&descriptor.name);
        }
        for descriptor in descriptors {
            for (dependency, condition) in &descriptor.depends_on {
                graph.add_dependency(&descriptor.name, dependency, *condition)?;
            }
        }
        Ok(graph)
    }

    /// Adds a service node, returning the existing node for a known name.
    pub fn add_service(&mut self, name: impl Into<String>) -> NodeIndex {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        let _ = self.index.insert(name, idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`StackforgeError::MissingDependency`] if either end is not
    /// a known service.
    pub fn add_dependency(
        &mut self,
        dependent: &str,
        dependency: &str,
        condition: ReadinessCondition,
    ) -> Result<()> {
        let missing = || StackforgeError::MissingDependency {
            service: dependent.to_string(),
            dependency: dependency.to_string(),
        };
        let from = *self.index.get(dependent).ok_or_else(missing)?;
        let to = *self.index.get(dependency).ok_or_else(missing)?;
        let _ = self.graph.add_edge(from, to, condition);
        Ok(())
    }

    /// Number of services in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no services.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of a node, in the order they were added.
    fn dependencies_of(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph walks edges newest first.
        let mut deps: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        deps.reverse();
        deps
    }

    /// Returns service names in startup order.
    ///
    /// Dependencies come before their dependents. Services with no
    /// ordering constraint keep their insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StackforgeError::CircularDependency`] with the traversal
    /// path, closed by the repeated service, if the graph has a cycle.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        let mut states = vec![VisitState::Unvisited; self.graph.node_count()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.graph.node_count());

        for node in self.graph.node_indices() {
            self.visit(node, &mut states, &mut path, &mut order)?;
        }

        Ok(order
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    fn visit(
        &self,
        node: NodeIndex,
        states: &mut [VisitState],
        path: &mut Vec<NodeIndex>,
        order: &mut Vec<NodeIndex>,
    ) -> Result<()> {
        match states[node.index()].on_enter() {
            Visit::Skip => return Ok(()),
            Visit::Cycle => {
                let mut cycle: Vec<String> =
                    path.iter().map(|&idx| self.graph[idx].clone()).collect();
                cycle.push(self.graph[node].clone());
                return Err(StackforgeError::CircularDependency { cycle });
            }
            Visit::Descend => {}
        }

        states[node.index()] = VisitState::InProgress;
        path.push(node);
        for dependency in self.dependencies_of(node) {
            self.visit(dependency, states, path, order)?;
        }
        let _ = path.pop();
        states[node.index()] = VisitState::Done;
        order.push(node);
        Ok(())
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that names are unique and every `depends_on` key exists.
///
/// Runs no traversal, so missing references surface before any cycle
/// search.
///
/// # Errors
///
/// Returns [`StackforgeError::Config`] for a duplicate name and
/// [`StackforgeError::MissingDependency`] for a dangling reference.
pub fn validate_dependencies(descriptors: &[ServiceDescriptor]) -> Result<()> {
    let mut names = HashSet::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !names.insert(descriptor.name.as_str()) {
            return Err(StackforgeError::config(format!(
                "duplicate service name \"{}\"",
                descriptor.name
            )));
        }
    }

    for descriptor in descriptors {
        for dependency in descriptor.depends_on.keys() {
            if !names.contains(dependency.as_str()) {
                return Err(StackforgeError::MissingDependency {
                    service: descriptor.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Sorts descriptors into startup order.
///
/// Roots are visited in input order and each root's dependencies are
/// emitted right before it, so a dependency is pulled ahead of any
/// earlier service that does not need it: `[a -> c, b, c]` sorts to
/// `c, a, b`. Services with no ordering relationship keep their input
/// order otherwise.
///
/// # Errors
///
/// Propagates validation failures, then cycle errors.
pub fn sort_by_dependencies(descriptors: &[ServiceDescriptor]) -> Result<Vec<ServiceDescriptor>> {
    let graph = DependencyGraph::from_descriptors(descriptors).inspect_err(|e| {
        tracing::error!(error = %e, "dependency validation failed");
    })?;
    let order = graph.resolve_order().inspect_err(|e| {
        tracing::error!(error = %e, "dependency resolution failed");
    })?;

    let mut by_name: IndexMap<&str, &ServiceDescriptor> = descriptors
        .iter()
        .map(|d| (d.name.as_str(), d))
        .collect();
    let sorted: Vec<ServiceDescriptor> = order
        .iter()
        .filter_map(|name| by_name.swap_remove(name.as_str()).cloned())
        .collect();

    tracing::debug!(order = ?order, "resolved startup order");
    Ok(sorted)
}

/// Returns each service's direct dependencies, in input order.
#[must_use]
pub fn dependency_graph(descriptors: &[ServiceDescriptor]) -> IndexMap<String, Vec<String>> {
    descriptors
        .iter()
        .map(|d| (d.name.clone(), d.depends_on.keys().cloned().collect()))
        .collect()
}

/// Whether the descriptors contain a dependency cycle.
///
/// Dangling references are ignored here; only a closed loop counts.
#[must_use]
pub fn has_circular_dependencies(descriptors: &[ServiceDescriptor]) -> bool {
    let mut graph = DependencyGraph::new();
    for descriptor in descriptors {
        let _ = graph.add_service(&descriptor.name);
    }
    for descriptor in descriptors {
        for (dependency, condition) in &descriptor.depends_on {
            if graph.index.contains_key(dependency) {
                // Both ends are known, so this cannot fail.
                let _ = graph.add_dependency(&descriptor.name, dependency, *condition);
            }
        }
    }
    matches!(
        graph.resolve_order(),
        Err(StackforgeError::CircularDependency { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Origin;

    fn svc(name: &str, deps: &[&str]) -> ServiceDescriptor {
        deps.iter().fold(
            ServiceDescriptor::new(name, Origin::Image(format!("{name}:latest"))),
            |svc, dep| svc.depends_on(*dep, ReadinessCondition::Healthy),
        )
    }

    fn names(sorted: &[ServiceDescriptor]) -> Vec<&str> {
        sorted.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn visit_state_transitions() {
        assert_eq!(VisitState::default(), VisitState::Unvisited);
        assert_eq!(VisitState::Unvisited.on_enter(), Visit::Descend);
        assert_eq!(VisitState::InProgress.on_enter(), Visit::Cycle);
        assert_eq!(VisitState::Done.on_enter(), Visit::Skip);
    }

    #[test]
    fn empty_input_sorts_to_empty() {
        let sorted = sort_by_dependencies(&[]).expect("should resolve");
        assert!(sorted.is_empty());
    }

    #[test]
    fn dependencies_come_first() {
        let input = vec![
            svc("api", &["postgres", "redis"]),
            svc("postgres", &[]),
            svc("redis", &[]),
        ];
        let sorted = sort_by_dependencies(&input).expect("should resolve");
        assert_eq!(names(&sorted), vec!["postgres", "redis", "api"]);
    }

    #[test]
    fn every_edge_is_respected() {
        let input = vec![
            svc("a", &["b", "c"]),
            svc("b", &["d"]),
            svc("c", &["d"]),
            svc("d", &[]),
            svc("e", &["a"]),
        ];
        let sorted = sort_by_dependencies(&input).expect("should resolve");
        let order = names(&sorted);
        let pos = |name: &str| order.iter().position(|n| *n == name).expect(name);
        for descriptor in &input {
            for dep in descriptor.depends_on.keys() {
                assert!(
                    pos(dep) < pos(&descriptor.name),
                    "{dep} should precede {}: {order:?}",
                    descriptor.name
                );
            }
        }
        assert_eq!(order.len(), input.len());
    }

    #[test]
    fn sorting_is_deterministic() {
        let input = vec![svc("x", &["z"]), svc("y", &[]), svc("z", &[])];
        let first = sort_by_dependencies(&input).expect("first");
        let second = sort_by_dependencies(&input).expect("second");
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn independent_services_keep_input_order() {
        let input = vec![svc("gamma", &[]), svc("alpha", &[]), svc("beta", &[])];
        let sorted = sort_by_dependencies(&input).expect("should resolve");
        assert_eq!(names(&sorted), vec!["gamma", "alpha", "beta"]);
    }

    #[test]
    fn dependency_is_pulled_ahead_of_earlier_independent_service() {
        let input = vec![svc("a", &["c"]), svc("b", &[]), svc("c", &[])];
        let sorted = sort_by_dependencies(&input).expect("should resolve");
        assert_eq!(names(&sorted), vec!["c", "a", "b"]);
    }

    #[test]
    fn missing_dependency_names_both_sides() {
        let input = vec![svc("api", &["ghost"])];
        let err = sort_by_dependencies(&input).expect_err("should fail");
        match err {
            StackforgeError::MissingDependency { service, dependency } => {
                assert_eq!(service, "api");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_dependency_wins_over_cycle() {
        let input = vec![svc("a", &["b"]), svc("b", &["a", "nope"])];
        let err = sort_by_dependencies(&input).expect_err("should fail");
        assert!(
            matches!(err, StackforgeError::MissingDependency { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn two_node_cycle_closes_the_loop() {
        let input = vec![svc("a", &["b"]), svc("b", &["a"])];
        let err = sort_by_dependencies(&input).expect_err("should fail");
        match &err {
            StackforgeError::CircularDependency { cycle } => {
                assert_eq!(cycle, &vec!["a", "b", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("a -> b -> a"), "got: {err}");
    }

    #[test]
    fn three_node_cycle_path_has_four_entries() {
        let input = vec![svc("x", &["y"]), svc("y", &["z"]), svc("z", &["x"])];
        let err = sort_by_dependencies(&input).expect_err("should fail");
        match err {
            StackforgeError::CircularDependency { cycle } => {
                assert_eq!(cycle, vec!["x", "y", "z", "x"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let input = vec![svc("loop", &["loop"])];
        let err = sort_by_dependencies(&input).expect_err("should fail");
        assert!(err.to_string().contains("loop -> loop"), "got: {err}");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let input = vec![svc("api", &[]), svc("api", &[])];
        let err = validate_dependencies(&input).expect_err("should fail");
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }

    #[test]
    fn adjacency_keeps_declaration_order() {
        let input = vec![svc("api", &["redis", "postgres"]), svc("redis", &[]), svc("postgres", &[])];
        let adjacency = dependency_graph(&input);
        assert_eq!(adjacency["api"], vec!["redis", "postgres"]);
        assert!(adjacency["redis"].is_empty());
    }

    #[test]
    fn cycle_probe_ignores_dangling_references() {
        assert!(has_circular_dependencies(&[svc("a", &["b"]), svc("b", &["a"])]));
        assert!(!has_circular_dependencies(&[svc("a", &["missing"])]));
        assert!(!has_circular_dependencies(&[svc("a", &["b"]), svc("b", &[])]));
    }

    #[test]
    fn graph_reports_size() {
        let graph = DependencyGraph::from_descriptors(&[svc("a", &[]), svc("b", &["a"])])
            .expect("should build");
        assert_eq!(graph.len(), 2);
        assert!(!graph.is_empty());
        assert!(DependencyGraph::new().is_empty());
    }
}
