// ABOUTME: Plan command implementation.
// ABOUTME: Lists each stage with the commands a run would execute, executing none.

use serde::Serialize;
use shipline::config::Config;
use shipline::error::Result;
use shipline::output::{Output, OutputMode};
use shipline::pipeline::StageName;
use shipline::runtime::{
    BuildRequest, ComposeProject, build_args, compose_pull_args, compose_up_args,
    inspect_tags_args, login_args, logout_args, prune_args, push_args,
};
use shipline::types::ArtifactKind;

#[derive(Serialize)]
struct PlanStep {
    stage: StageName,
    commands: Vec<String>,
}

pub fn plan(config: &Config, output: &Output) -> Result<()> {
    let topology = config.topology()?;
    let steps = steps(config);

    if output.mode() == OutputMode::Json {
        for step in &steps {
            println!("{}", serde_json::to_string(step)?);
        }
        return Ok(());
    }

    println!("Pipeline for {}", config.project);
    for (index, step) in steps.iter().enumerate() {
        println!("  {}. {}", index + 1, step.stage);
        for command in &step.commands {
            println!("       {command}");
        }
    }

    let order: Vec<&str> = topology
        .startup_order()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    println!("Startup order: {}", order.join(" → "));

    println!("Services:");
    for service in topology.services() {
        match (service.artifact, &service.build_context) {
            (Some(kind), Some(context)) => println!(
                "  {}: {} ({} image built from {})",
                service.name,
                service.image,
                kind,
                context.display()
            ),
            _ => println!("  {}: {}", service.name, service.image),
        }
    }
    Ok(())
}

fn steps(config: &Config) -> Vec<PlanStep> {
    let docker =
        |args: Vec<String>| format!("{} {}", config.docker.binary.display(), args.join(" "));
    let server = config.registry.server.as_deref();

    let mut steps: Vec<PlanStep> = config
        .images
        .iter()
        .map(|(kind, artifact)| {
            let request = BuildRequest {
                context: config.context_path(kind),
                dockerfile: config.dockerfile_path(kind),
                image: artifact.image.clone(),
            };
            PlanStep {
                stage: StageName::Build(kind),
                commands: vec![
                    docker(build_args(&request)),
                    docker(inspect_tags_args(&request.image)),
                ],
            }
        })
        .collect();

    // The username is shown by source; the secret only ever travels on stdin.
    let mut publish = vec![docker(login_args(server, &config.registry.username.source()))];
    publish.extend(
        ArtifactKind::ORDER
            .into_iter()
            .map(|kind| docker(push_args(&config.images.get(kind).image))),
    );
    publish.push(docker(logout_args(server)));
    steps.push(PlanStep {
        stage: StageName::Publish,
        commands: publish,
    });

    let project = ComposeProject {
        name: config.project.clone(),
        file: config.compose_path(),
    };
    steps.push(PlanStep {
        stage: StageName::Deploy,
        commands: vec![
            format!("write {}", project.file.display()),
            docker(compose_pull_args(&project)),
            docker(compose_up_args(&project, true)),
            docker(prune_args()),
        ],
    });

    steps
}
