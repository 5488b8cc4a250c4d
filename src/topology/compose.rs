// ABOUTME: Renders a service topology as a compose file.
// ABOUTME: Services keep declaration order; named volumes are declared at top level.

use super::{Service, ServiceTopology};
use crate::config::RestartPolicy;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::collections::BTreeMap;

#[derive(Serialize)]
struct ComposeFile<'a> {
    name: &'a str,
    services: OrderedServices<'a>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    volumes: BTreeMap<&'a str, serde_yaml::Mapping>,
}

/// Service map that serializes in declaration order.
struct OrderedServices<'a>(Vec<(&'a str, ComposeService<'a>)>);

impl Serialize for OrderedServices<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, service) in &self.0 {
            map.serialize_entry(name, service)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct ComposeService<'a> {
    image: String,
    restart: &'a RestartPolicy,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    environment: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    ports: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    volumes: &'a [String],
}

impl<'a> From<&'a Service> for ComposeService<'a> {
    fn from(service: &'a Service) -> Self {
        Self {
            image: service.image.to_string(),
            restart: &service.restart,
            depends_on: service.depends_on.iter().map(|d| d.as_str()).collect(),
            environment: &service.environment,
            ports: &service.ports,
            volumes: &service.volumes,
        }
    }
}

/// Compose YAML for a topology.
///
/// Services reference images only; the pipeline builds and pushes them
/// beforehand, so compose never builds.
pub fn render_compose(topology: &ServiceTopology) -> Result<String, serde_yaml::Error> {
    let file = ComposeFile {
        name: topology.project().as_str(),
        services: OrderedServices(
            topology
                .services()
                .iter()
                .map(|s| (s.name.as_str(), ComposeService::from(s)))
                .collect(),
        ),
        volumes: topology
            .named_volumes()
            .into_iter()
            .map(|v| (v, serde_yaml::Mapping::new()))
            .collect(),
    };

    serde_yaml::to_string(&file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageRef, ServiceName};
    use nonempty::NonEmpty;

    fn stack() -> ServiceTopology {
        let mongo = Service {
            name: ServiceName::new("mongo").unwrap(),
            image: ImageRef::parse("mongo:6").unwrap(),
            artifact: None,
            build_context: None,
            depends_on: vec![],
            ports: vec![],
            volumes: vec!["mongo-data:/data/db".to_string()],
            environment: BTreeMap::new(),
            restart: RestartPolicy::Always,
        };
        let mut backend = mongo.clone();
        backend.name = ServiceName::new("backend").unwrap();
        backend.image = ImageRef::parse("team/backend").unwrap();
        backend.depends_on = vec![mongo.name.clone()];
        backend.volumes = vec![];
        backend.environment.insert("PORT".to_string(), "8080".to_string());
        backend.restart = RestartPolicy::UnlessStopped;

        ServiceTopology::new(
            ServiceName::new("mean").unwrap(),
            NonEmpty::from((mongo, vec![backend])),
        )
        .unwrap()
    }

    #[test]
    fn renders_services_in_declaration_order() {
        let yaml = render_compose(&stack()).unwrap();
        let mongo = yaml.find("  mongo:").unwrap();
        let backend = yaml.find("  backend:").unwrap();
        assert!(mongo < backend, "unexpected order:\n{}", yaml);
    }

    #[test]
    fn rendered_file_parses_back() {
        let yaml = render_compose(&stack()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["name"], "mean");
        assert_eq!(value["services"]["backend"]["image"], "team/backend:latest");
        assert_eq!(value["services"]["backend"]["depends_on"][0], "mongo");
        assert_eq!(value["services"]["backend"]["environment"]["PORT"], "8080");
        assert_eq!(value["services"]["mongo"]["restart"], "always");
        assert!(value["volumes"]["mongo-data"].is_mapping());
        assert!(value["services"]["backend"].get("ports").is_none());
    }
}
