// ABOUTME: On-disk project fixture with backend and frontend build contexts.
// ABOUTME: Writes shipline.yml into a temp directory and loads it.

use shipline::config::Config;
use shipline::types::Credential;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const BACKEND_IMAGE: &str = "registry.example.com/team/backend:1.0";
pub const FRONTEND_IMAGE: &str = "registry.example.com/team/frontend:latest";

pub const CONFIG_YAML: &str = r#"
project: mean-app
registry:
  server: registry.example.com
  username: ci-bot
  password:
    env: SHIPLINE_TEST_PASSWORD
    default: hunter2
images:
  backend:
    context: ./backend
    image: registry.example.com/team/backend:1.0
  frontend:
    context: ./frontend
    image: registry.example.com/team/frontend
services:
  - name: mongo
    image: "mongo:6"
    volumes: ["mongo-data:/data/db"]
  - name: backend
    artifact: backend
    depends_on: [mongo]
    environment:
      PORT: "8080"
  - name: frontend
    artifact: frontend
    depends_on: [backend]
    ports: ["80:80"]
state_dir: .state
"#;

pub struct Project {
    pub dir: TempDir,
}

impl Project {
    /// A project with both build contexts and their Dockerfiles.
    pub fn new() -> Self {
        Self::with_config(CONFIG_YAML)
    }

    pub fn with_config(yaml: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for context in ["backend", "frontend"] {
            let path = dir.path().join(context);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join("Dockerfile"), "FROM scratch\n").unwrap();
        }
        fs::write(dir.path().join("shipline.yml"), yaml).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> Config {
        Config::load(&self.path().join("shipline.yml")).unwrap()
    }

    pub fn compose_file(&self) -> PathBuf {
        self.path().join(".shipline/compose.yml")
    }

    pub fn remove(&self, relative: &str) {
        let path = self.path().join(relative);
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
    }
}

pub fn credential() -> Credential {
    Credential::new("ci-bot", "hunter2")
}
