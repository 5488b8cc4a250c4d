// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a shipline.yml describing the database/backend/frontend stack.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ServiceName;

use super::CONFIG_FILENAME;

const PROJECT_PLACEHOLDER: &str = "mean-app";

pub(super) const TEMPLATE: &str = r#"project: mean-app

# Credentials are read from the environment when the pipeline runs.
registry:
  # server: registry.example.com
  username:
    env: SHIPLINE_REGISTRY_USER
  password:
    env: SHIPLINE_REGISTRY_PASSWORD

images:
  backend:
    context: ./backend
    image: my-org/mean-app-backend:latest
  frontend:
    context: ./frontend
    image: my-org/mean-app-frontend:latest

compose_file: .shipline/compose.yml

services:
  - name: mongo
    image: mongo:6
    volumes:
      - mongo-data:/data/db
  - name: backend
    artifact: backend
    depends_on: [mongo]
    environment:
      PORT: "8080"
      MONGO_URL: mongodb://mongo:27017/app
  - name: frontend
    artifact: frontend
    depends_on: [backend]
    ports:
      - "80:80"

proxy:
  prefix: /api
  service: backend
  port: 8080
"#;

pub fn init_config(dir: &Path, project: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = match project {
        Some(name) => {
            let name = ServiceName::new(name).map_err(|e| Error::InvalidConfig(e.to_string()))?;
            TEMPLATE.replace(PROJECT_PLACEHOLDER, name.as_str())
        }
        None => TEMPLATE.to_string(),
    };

    std::fs::write(&config_path, yaml)?;
    tracing::info!("wrote {}", config_path.display());

    Ok(())
}
