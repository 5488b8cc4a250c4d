// ABOUTME: Status command implementation.
// ABOUTME: Lists the containers of the compose project next to the declared services.

use super::runtime_connection::connect_to_runtime;
use shipline::config::Config;
use shipline::error::Result;
use shipline::output::Output;
use shipline::runtime::{ContainerFilters, ContainerOps};

pub async fn status(config: &Config, output: &Output) -> Result<()> {
    let topology = config.topology()?;
    let runtime = connect_to_runtime(config, output).await?;

    let containers = runtime
        .list_containers(&ContainerFilters::for_project(config.project.as_str()))
        .await?;

    println!("Project: {}", config.project);
    for name in topology.startup_order() {
        let matching: Vec<_> = containers
            .iter()
            .filter(|c| c.service() == Some(name.as_str()))
            .collect();

        if matching.is_empty() {
            println!("  {:<12} not running", name.as_str());
        }
        for container in matching {
            println!(
                "  {:<12} {:<10} {} ({})",
                name.as_str(),
                container.state,
                container.status,
                container.image
            );
        }
    }

    let orphans: Vec<_> = containers
        .iter()
        .filter(|c| {
            c.service().is_none_or(|service| {
                topology
                    .services()
                    .iter()
                    .all(|s| s.name.as_str() != service)
            })
        })
        .collect();
    for container in orphans {
        output.warning(&format!(
            "container {} is not declared in services",
            container.name
        ));
    }

    Ok(())
}
