// src/resolver.rs

//! Dependency resolution
//!
//! Turns a list of requested package names into an ordered plan:
//!
//! - `resolve_install_order` walks the dependency closure depth-first and
//!   emits every package after all of its dependencies, tagged `Install`
//!   or `Update` depending on the installed version (current packages are
//!   left out).
//! - `resolve_uninstall_order` removes exactly the requested packages,
//!   refusing when an installed package outside the request still depends
//!   on one of them.
//!
//! Manifests come from a caller-supplied lookup function, so the resolver
//! knows nothing about where package definitions live. Installed state is
//! a read-only name → version snapshot.

use crate::error::{Error, Result};
use crate::packages::{Manifest, Operation, Plan};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Depth-first traversal state for one `resolve_install_order` call
struct Closure<F> {
    lookup: F,
    manifests: HashMap<String, Manifest>,
    /// Names currently being expanded, outermost first
    in_progress: Vec<String>,
    done: HashSet<String>,
    order: Vec<String>,
}

impl<F> Closure<F>
where
    F: FnMut(&str) -> Result<Manifest>,
{
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            manifests: HashMap::new(),
            in_progress: Vec::new(),
            done: HashSet::new(),
            order: Vec::new(),
        }
    }

    fn visit(&mut self, name: &str) -> Result<()> {
        if self.done.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.in_progress.iter().position(|n| n == name) {
            let mut path = self.in_progress[start..].to_vec();
            path.push(name.to_string());
            return Err(Error::DependencyCycle {
                name: name.to_string(),
                path,
            });
        }

        self.in_progress.push(name.to_string());

        if !self.manifests.contains_key(name) {
            let manifest = (self.lookup)(name)?;
            self.manifests.insert(name.to_string(), manifest);
        }
        let dependencies = self.manifests[name].dependencies().to_vec();
        for dependency in &dependencies {
            self.visit(dependency)?;
        }

        self.in_progress.pop();
        self.done.insert(name.to_string());
        self.order.push(name.to_string());
        Ok(())
    }
}

/// Plan the install/update of `targets` and their transitive dependencies
///
/// `lookup` is called at most once per distinct name; its errors are
/// returned unchanged. A dependency cycle (including a package depending on
/// itself) is `Error::DependencyCycle`. Packages whose installed version
/// equals the manifest version are omitted, so an empty plan means
/// everything is already current.
pub fn resolve_install_order<T, F>(
    targets: &[T],
    lookup: F,
    installed: &BTreeMap<String, String>,
) -> Result<Plan>
where
    T: AsRef<str>,
    F: FnMut(&str) -> Result<Manifest>,
{
    let mut closure = Closure::new(lookup);
    for target in targets {
        closure.visit(target.as_ref())?;
    }

    let mut plan = Plan::new();
    for name in &closure.order {
        let Some(manifest) = closure.manifests.remove(name) else {
            continue;
        };
        match installed.get(name) {
            None => plan.push((manifest, Operation::Install)),
            Some(version) if version != manifest.version() => {
                plan.push((manifest, Operation::Update))
            }
            Some(_) => debug!("{} is up to date", name),
        }
    }

    debug!(
        "Resolved {} package(s) into {} plan entries",
        closure.order.len(),
        plan.len()
    );
    Ok(plan)
}

/// Plan the removal of exactly `targets` (no automatic removal of dependencies)
///
/// Every installed package's manifest is loaded to find reverse
/// dependencies. An installed package whose definition can no longer be
/// loaded is treated as having no dependencies, and a warning is logged
/// because its own dependents check is skipped. Targets are removed only
/// after every other target that depends on them; targets that are not
/// installed are left out of the plan.
pub fn resolve_uninstall_order<T, F>(
    targets: &[T],
    mut lookup: F,
    installed: &BTreeMap<String, String>,
) -> Result<Plan>
where
    T: AsRef<str>,
    F: FnMut(&str) -> Result<Manifest>,
{
    let mut graph: BTreeMap<String, Manifest> = BTreeMap::new();
    for (name, version) in installed {
        let manifest = match lookup(name) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(
                    "Cannot load definition of installed package {} ({}); treating it as having no dependencies",
                    name, e
                );
                Manifest::placeholder(name, version)?
            }
        };
        graph.insert(name.clone(), manifest);
    }

    let removal_order = {
        let target_set: HashSet<&str> = targets.iter().map(|t| t.as_ref()).collect();

        let mut dependents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (name, manifest) in &graph {
            for dependency in manifest.dependencies() {
                if graph.contains_key(dependency) {
                    dependents
                        .entry(dependency.as_str())
                        .or_default()
                        .insert(name.as_str());
                }
            }
        }

        for target in targets {
            let target = target.as_ref();
            let Some(users) = dependents.get(target) else {
                continue;
            };
            if let Some(dependent) = users
                .iter()
                .find(|user| !target_set.contains(*user) && installed.contains_key(**user))
            {
                return Err(Error::RequiredBy {
                    target: target.to_string(),
                    dependent: dependent.to_string(),
                });
            }
        }

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for target in targets {
            visit_within(target.as_ref(), &graph, &target_set, &mut visited, &mut order);
        }
        order.reverse();
        order
    };

    let mut plan = Plan::new();
    for name in removal_order {
        if !installed.contains_key(&name) {
            continue;
        }
        if let Some(manifest) = graph.remove(&name) {
            plan.push((manifest, Operation::Uninstall));
        }
    }
    Ok(plan)
}

/// Post-order walk restricted to `scope`, appending each name after its in-scope dependencies
fn visit_within(
    name: &str,
    graph: &BTreeMap<String, Manifest>,
    scope: &HashSet<&str>,
    visited: &mut HashSet<String>,
    order: &mut Vec<String>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    if let Some(manifest) = graph.get(name) {
        for dependency in manifest.dependencies() {
            if scope.contains(dependency.as_str()) {
                visit_within(dependency, graph, scope, visited, order);
            }
        }
    }
    order.push(name.to_string());
}
