// ABOUTME: Service topology: the services deployed together and their startup edges.
// ABOUTME: Validates names, dependencies and acyclicity; computes startup order.

mod compose;

pub use compose::render_compose;

use crate::config::RestartPolicy;
use crate::types::{ArtifactKind, ImageRef, ServiceName};
use nonempty::NonEmpty;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

/// Errors in a declared topology.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("topology declares no services")]
    Empty,

    #[error("service '{0}' is declared more than once")]
    DuplicateService(ServiceName),

    #[error("service '{service}' depends on undeclared service '{dependency}'")]
    UnknownDependency {
        service: ServiceName,
        dependency: ServiceName,
    },

    #[error("service '{0}' depends on itself")]
    SelfDependency(ServiceName),

    #[error("dependency cycle between services: {}", format_names(.0))]
    Cycle(Vec<ServiceName>),

    #[error("service '{0}' needs either an image or an artifact")]
    MissingImage(ServiceName),

    #[error("service '{0}' declares both an image and an artifact")]
    AmbiguousImage(ServiceName),
}

fn format_names(names: &[ServiceName]) -> String {
    names
        .iter()
        .map(ServiceName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One deployed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: ServiceName,
    pub image: ImageRef,
    /// Set when the image is produced by the pipeline.
    pub artifact: Option<ArtifactKind>,
    pub build_context: Option<PathBuf>,
    pub depends_on: Vec<ServiceName>,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub restart: RestartPolicy,
}

impl Service {
    /// Named volumes this service mounts (bind mounts excluded).
    pub fn named_volumes(&self) -> impl Iterator<Item = &str> {
        self.volumes.iter().filter_map(|spec| {
            let (source, _) = spec.split_once(':')?;
            let is_path = source.starts_with(['.', '/', '~']) || source.contains('/');
            (!source.is_empty() && !is_path).then_some(source)
        })
    }
}

/// Validated set of services deployed as one compose project.
///
/// Services keep declaration order; dependencies are known and acyclic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTopology {
    project: ServiceName,
    services: NonEmpty<Service>,
}

impl ServiceTopology {
    pub fn new(project: ServiceName, services: NonEmpty<Service>) -> Result<Self, TopologyError> {
        let mut seen = HashSet::new();
        for service in &services {
            if !seen.insert(&service.name) {
                return Err(TopologyError::DuplicateService(service.name.clone()));
            }
        }

        for service in &services {
            for dependency in &service.depends_on {
                if dependency == &service.name {
                    return Err(TopologyError::SelfDependency(service.name.clone()));
                }
                if !seen.contains(dependency) {
                    return Err(TopologyError::UnknownDependency {
                        service: service.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        let topology = Self { project, services };
        topology.compute_startup_order()?;
        Ok(topology)
    }

    pub fn project(&self) -> &ServiceName {
        &self.project
    }

    pub fn services(&self) -> &NonEmpty<Service> {
        &self.services
    }

    pub fn service(&self, name: &ServiceName) -> Option<&Service> {
        self.services.iter().find(|s| &s.name == name)
    }

    /// Named volumes used by any service.
    pub fn named_volumes(&self) -> BTreeSet<&str> {
        self.services
            .iter()
            .flat_map(Service::named_volumes)
            .collect()
    }

    /// Dependencies before dependents; ties keep declaration order.
    pub fn startup_order(&self) -> Vec<&ServiceName> {
        // Acyclicity is checked in `new`.
        self.compute_startup_order().unwrap_or_default()
    }

    fn compute_startup_order(&self) -> Result<Vec<&ServiceName>, TopologyError> {
        let mut remaining: HashMap<&ServiceName, usize> = self
            .services
            .iter()
            .map(|s| (&s.name, s.depends_on.len()))
            .collect();
        let mut order = Vec::with_capacity(self.services.len());

        while order.len() < self.services.len() {
            // First declared service whose dependencies have all started.
            let next = self
                .services
                .iter()
                .find(|s| remaining.get(&s.name) == Some(&0))
                .map(|s| &s.name);

            let Some(next) = next else {
                let mut stuck: Vec<ServiceName> =
                    remaining.keys().map(|name| (*name).clone()).collect();
                stuck.sort();
                return Err(TopologyError::Cycle(stuck));
            };

            remaining.remove(next);
            for service in &self.services {
                if service.depends_on.contains(next)
                    && let Some(count) = remaining.get_mut(&service.name)
                {
                    *count -= 1;
                }
            }
            order.push(next);
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, deps: &[&str]) -> Service {
        Service {
            name: ServiceName::new(name).unwrap(),
            image: ImageRef::parse(&format!("{}:1", name)).unwrap(),
            artifact: None,
            build_context: None,
            depends_on: deps.iter().map(|d| ServiceName::new(d).unwrap()).collect(),
            ports: vec![],
            volumes: vec![],
            environment: BTreeMap::new(),
            restart: RestartPolicy::default(),
        }
    }

    fn topology(services: Vec<Service>) -> Result<ServiceTopology, TopologyError> {
        ServiceTopology::new(
            ServiceName::new("app").unwrap(),
            NonEmpty::from_vec(services).unwrap(),
        )
    }

    #[test]
    fn startup_order_puts_dependencies_first() {
        let topo = topology(vec![
            service("frontend", &["backend"]),
            service("backend", &["mongo"]),
            service("mongo", &[]),
        ])
        .unwrap();

        let order: Vec<&str> = topo.startup_order().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(order, vec!["mongo", "backend", "frontend"]);
    }

    #[test]
    fn independent_services_keep_declaration_order() {
        let topo = topology(vec![service("b", &[]), service("a", &[])]).unwrap();
        let order: Vec<&str> = topo.startup_order().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let err = topology(vec![
            service("a", &["c"]),
            service("b", &["a"]),
            service("c", &["b"]),
        ])
        .unwrap_err();
        assert!(matches!(err, TopologyError::Cycle(ref names) if names.len() == 3));
        assert!(err.to_string().contains("a, b, c"));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = topology(vec![service("backend", &["redis"])]).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownDependency { .. }));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let err = topology(vec![service("a", &["a"])]).unwrap_err();
        assert_eq!(err, TopologyError::SelfDependency(ServiceName::new("a").unwrap()));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = topology(vec![service("a", &[]), service("a", &[])]).unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateService(_)));
    }

    #[test]
    fn named_volumes_exclude_bind_mounts() {
        let mut db = service("mongo", &[]);
        db.volumes = vec![
            "mongo-data:/data/db".to_string(),
            "./init:/docker-entrypoint-initdb.d:ro".to_string(),
            "/var/log:/logs".to_string(),
        ];
        let topo = topology(vec![db]).unwrap();
        assert_eq!(topo.named_volumes().into_iter().collect::<Vec<_>>(), vec!["mongo-data"]);
    }
}
