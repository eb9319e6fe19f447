//! Task dependency management
//!
//! Tasks and their prerequisites form a directed graph (task -> prerequisite).
//! Resolution walks it depth-first in declared prerequisite order so each task
//! runs after everything it depends on, and at most once per invocation.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::tasks::TaskCatalog;
use crate::types::{FastkitError, FastkitResult};

/// Build the dependency graph: one node per task, edge from a task to each prerequisite
pub fn build_task_graph(catalog: &TaskCatalog) -> FastkitResult<DiGraph<String, ()>> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    for task in catalog.tasks() {
        let node_index = graph.add_node(task.name.clone());
        node_indices.insert(task.name.clone(), node_index);
    }

    for task in catalog.tasks() {
        let from_node = node_indices[&task.name];
        for dep in &task.dependencies {
            let Some(&to_node) = node_indices.get(dep) else {
                return Err(FastkitError::Task(format!(
                    "Dependency '{}' not found for task '{}'",
                    dep, task.name
                )));
            };
            graph.add_edge(from_node, to_node, ());
        }
    }

    Ok(graph)
}

/// Find dependency cycles using strongly connected components
pub fn find_cycles(graph: &DiGraph<String, ()>) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if graph.contains_edge(node, node) {
                    Some(vec![graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

/// Resolve the canonical task names to run for `target`, prerequisites first
pub fn resolve_execution_order(catalog: &TaskCatalog, target: &str) -> FastkitResult<Vec<String>> {
    let target = catalog.resolve(target)?;
    let graph = build_task_graph(catalog)?;

    let name_to_node: HashMap<&str, NodeIndex> = graph
        .node_indices()
        .map(|index| (graph[index].as_str(), index))
        .collect();

    // Everything reachable from the target
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([name_to_node[target.name.as_str()]]);
    while let Some(node_index) = queue.pop_front() {
        if !reachable.insert(graph[node_index].clone()) {
            continue;
        }
        queue.extend(graph.neighbors(node_index));
    }

    let relevant_cycles: Vec<Vec<String>> = find_cycles(&graph)
        .into_iter()
        .filter(|cycle| cycle.iter().any(|name| reachable.contains(name)))
        .collect();

    if !relevant_cycles.is_empty() {
        let message = relevant_cycles
            .into_iter()
            .map(|mut cycle| {
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                cycle.join(" -> ")
            })
            .collect::<Vec<_>>()
            .join("; ");

        return Err(FastkitError::Task(format!(
            "Circular dependency detected: {}",
            message
        )));
    }

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    visit(catalog, &target.name, &mut visited, &mut order);
    Ok(order)
}

/// Post-order walk; the graph is known to be acyclic here
fn visit(catalog: &TaskCatalog, name: &str, visited: &mut HashSet<String>, order: &mut Vec<String>) {
    if !visited.insert(name.to_string()) {
        return;
    }

    if let Some(task) = catalog.get(name) {
        for dep in &task.dependencies {
            visit(catalog, dep, visited, order);
        }
    }

    order.push(name.to_string());
}
