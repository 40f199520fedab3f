//! Target graph construction and dependency resolution
//!
//! The [`TargetGraph`] is built once from a targets file and never changes
//! afterwards. Resolution walks prerequisites depth-first in the order each
//! target lists them and yields a post-order, so every target appears after
//! all of its prerequisites.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::configs::targets::{Command, TargetsFileConfig};
use crate::types::{MarshalError, MarshalResult};

/// A named unit of work
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    /// Absolute paths of plain file prerequisites
    pub inputs: Vec<PathBuf>,
    /// Absolute path of the file this target produces
    pub output: Option<PathBuf>,
    pub commands: Vec<Command>,
}

impl Target {
    /// Phony targets have no output file and always run when reached
    pub fn is_phony(&self) -> bool {
        self.output.is_none()
    }
}

#[derive(Debug)]
pub struct TargetGraph {
    root: PathBuf,
    targets: Vec<Target>,
    index: HashMap<String, usize>,
    default_target: Option<String>,
    variables: BTreeMap<String, String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl TargetGraph {
    /// Build the graph from a parsed targets file. Relative paths are
    /// resolved against `root`.
    pub fn from_config(config: &TargetsFileConfig, root: &Path) -> MarshalResult<Self> {
        let mut targets = Vec::with_capacity(config.targets.len());
        let mut index = HashMap::new();

        for target_config in &config.targets {
            let name = target_config.name.trim();
            if name.is_empty() {
                return Err(MarshalError::Config(
                    "Target names must not be empty".to_string(),
                ));
            }
            if index.insert(name.to_string(), targets.len()).is_some() {
                return Err(MarshalError::Config(format!(
                    "Target '{}' is defined more than once",
                    name
                )));
            }

            targets.push(Target {
                name: name.to_string(),
                description: target_config.description.clone(),
                dependencies: target_config
                    .dependencies
                    .iter()
                    .flatten()
                    .map(|dep| dep.trim().to_string())
                    .collect(),
                inputs: target_config
                    .inputs
                    .iter()
                    .flatten()
                    .map(|input| root.join(input))
                    .collect(),
                output: target_config.output.as_ref().map(|output| root.join(output)),
                commands: target_config.commands.clone().unwrap_or_default(),
            });
        }

        let default_target = match config.default.as_deref().map(str::trim) {
            Some(name) if !index.contains_key(name) => {
                return Err(MarshalError::Config(format!(
                    "Default target '{}' is not defined",
                    name
                )));
            }
            Some(name) => Some(name.to_string()),
            None => targets.first().map(|t| t.name.clone()),
        };

        Ok(Self {
            root: root.to_path_buf(),
            targets,
            index,
            default_target,
            variables: config.variables.clone().unwrap_or_default(),
        })
    }

    /// Directory commands run in and relative paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Targets in declaration order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.index.get(name).map(|&i| &self.targets[i])
    }

    pub fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    fn lookup(&self, name: &str, required_by: Option<&str>) -> MarshalResult<&Target> {
        self.get(name).ok_or_else(|| MarshalError::UnknownTarget {
            name: name.to_string(),
            required_by: required_by.map(str::to_string),
        })
    }

    /// Resolve `name` and its transitive prerequisites into execution order.
    ///
    /// Targets in `satisfied` (and everything only reachable through them)
    /// are left out. Unknown targets and cycles are reported before anything
    /// is returned, so callers never start work on a broken graph.
    pub fn resolve(&self, name: &str, satisfied: &HashSet<String>) -> MarshalResult<Vec<&Target>> {
        let root = self.lookup(name, None)?;
        if satisfied.contains(name) {
            return Ok(Vec::new());
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut order = Vec::new();
        let mut path: Vec<(&Target, usize)> = vec![(root, 0)];
        marks.insert(root.name.as_str(), Mark::Visiting);

        while let Some(&(target, next)) = path.last() {
            let Some(dep_name) = target.dependencies.get(next) else {
                path.pop();
                marks.insert(target.name.as_str(), Mark::Done);
                order.push(target);
                continue;
            };

            if let Some(top) = path.last_mut() {
                top.1 += 1;
            }

            if satisfied.contains(dep_name) {
                continue;
            }

            match marks.get(dep_name.as_str()) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    let start = path
                        .iter()
                        .position(|(t, _)| t.name == *dep_name)
                        .unwrap_or(0);
                    let mut cycle: Vec<&str> =
                        path[start..].iter().map(|(t, _)| t.name.as_str()).collect();
                    cycle.push(dep_name);
                    return Err(MarshalError::CyclicDependency {
                        cycle: cycle.join(" -> "),
                    });
                }
                None => {
                    let dep = self.lookup(dep_name, Some(target.name.as_str()))?;
                    tracing::debug!("Resolved '{}' as prerequisite of '{}'", dep.name, target.name);
                    marks.insert(dep.name.as_str(), Mark::Visiting);
                    path.push((dep, 0));
                }
            }
        }

        Ok(order)
    }

    /// Prerequisite names that do not refer to any target, as (target, missing) pairs
    pub fn undefined_dependencies(&self) -> Vec<(String, String)> {
        self.targets
            .iter()
            .flat_map(|target| {
                target
                    .dependencies
                    .iter()
                    .filter(|dep| !self.index.contains_key(dep.as_str()))
                    .map(|dep| (target.name.clone(), dep.clone()))
            })
            .collect()
    }

    /// Petgraph view with an edge from each target to each of its prerequisites
    pub fn to_dependency_graph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::<String, ()>::new();
        let nodes: Vec<NodeIndex> = self
            .targets
            .iter()
            .map(|target| graph.add_node(target.name.clone()))
            .collect();

        for (from, target) in self.targets.iter().enumerate() {
            for dep in &target.dependencies {
                if let Some(&to) = self.index.get(dep) {
                    graph.add_edge(nodes[from], nodes[to], ());
                }
            }
        }

        graph
    }

    /// Every cycle in the graph, one sorted name list per strongly connected component
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let graph = self.to_dependency_graph();

        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
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
}
