// ABOUTME: Integration tests for the build → publish → deploy pipeline.
// ABOUTME: Runs every stage against a recording fake runtime and checks gating.

mod support;

use shipline::diagnostics::{Diagnostics, WarningKind};
use shipline::pipeline::*;
use shipline::types::ArtifactKind;
use support::fake_runtime::{Call, Failure, FakeRuntime};
use support::fixture::{BACKEND_IMAGE, CONFIG_YAML, FRONTEND_IMAGE, Project, credential};

const SERVER: Option<&str> = Some("registry.example.com");

async fn run(project: &Project, runtime: &FakeRuntime) -> PipelineReport {
    support::init_tracing();
    let config = project.config();
    let mut diag = Diagnostics::default();
    run_pipeline(&config, runtime, &credential(), &mut diag, &mut ()).await
}

fn failed_stage(report: &PipelineReport) -> StageName {
    report.failure().expect("run should have failed").stage
}

mod happy_path {
    use super::*;

    #[tokio::test]
    async fn every_stage_runs_in_order() {
        let project = Project::new();
        let runtime = FakeRuntime::new();

        let report = run(&project, &runtime).await;

        assert!(report.succeeded());
        assert_eq!(report.stages(), StageName::ALL.to_vec());
        assert_eq!(
            runtime.calls(),
            vec![
                Call::Build(BACKEND_IMAGE.to_string()),
                Call::InspectTags(BACKEND_IMAGE.to_string()),
                Call::Build(FRONTEND_IMAGE.to_string()),
                Call::InspectTags(FRONTEND_IMAGE.to_string()),
                Call::Login {
                    server: SERVER.map(str::to_string),
                    username: "ci-bot".to_string(),
                },
                Call::Push(BACKEND_IMAGE.to_string()),
                Call::Push(FRONTEND_IMAGE.to_string()),
                Call::Logout(SERVER.map(str::to_string)),
                Call::Pull("mean-app".to_string()),
                Call::Up {
                    project: "mean-app".to_string(),
                    remove_orphans: true,
                },
                Call::Prune,
            ]
        );
    }

    #[tokio::test]
    async fn compose_file_uses_published_images() {
        let project = Project::new();
        let runtime = FakeRuntime::new();

        let report = run(&project, &runtime).await;
        assert!(report.succeeded());

        let compose = std::fs::read_to_string(project.compose_file()).unwrap();
        assert!(compose.contains(BACKEND_IMAGE), "compose:\n{}", compose);
        assert!(compose.contains(FRONTEND_IMAGE), "compose:\n{}", compose);
        assert!(compose.contains("mongo:6"));
        assert!(compose.contains("mongo-data"));
    }

    #[tokio::test]
    async fn no_warnings_when_cleanup_succeeds() {
        let project = Project::new();
        let report = run(&project, &FakeRuntime::new()).await;
        assert!(report.warnings().is_empty());
    }
}

mod build_stage {
    use super::*;

    #[tokio::test]
    async fn frontend_build_failure_halts_before_publish() {
        let project = Project::new();
        let runtime =
            FakeRuntime::new().failing(Failure::Build("registry.example.com/team/frontend"));

        let report = run(&project, &runtime).await;

        assert!(!report.succeeded());
        assert_eq!(failed_stage(&report), StageName::Build(ArtifactKind::Frontend));
        assert_eq!(
            report.stages(),
            vec![
                StageName::Build(ArtifactKind::Backend),
                StageName::Build(ArtifactKind::Frontend)
            ]
        );
        assert!(runtime.pushes().is_empty());
        assert!(!runtime.called(|c| matches!(c, Call::Login { .. })));
        assert!(!project.compose_file().exists());
    }

    #[tokio::test]
    async fn backend_build_failure_skips_frontend_build() {
        let project = Project::new();
        let runtime =
            FakeRuntime::new().failing(Failure::Build("registry.example.com/team/backend"));

        let report = run(&project, &runtime).await;

        assert_eq!(failed_stage(&report), StageName::Build(ArtifactKind::Backend));
        assert!(!runtime.called(|c| *c == Call::Build(FRONTEND_IMAGE.to_string())));
        let diagnostic = report.failure().unwrap().diagnostic.clone().unwrap();
        assert!(diagnostic.contains("npm ci"), "diagnostic: {}", diagnostic);
    }

    #[tokio::test]
    async fn missing_context_fails_without_building() {
        let project = Project::new();
        project.remove("backend");
        let runtime = FakeRuntime::new();

        let err = Pipeline::new(&project.config())
            .build_backend(&runtime)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StageErrorKind::MissingContext);
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_dockerfile_fails_without_building() {
        let project = Project::new();
        project.remove("backend/Dockerfile");
        let runtime = FakeRuntime::new();

        let err = Pipeline::new(&project.config())
            .build_backend(&runtime)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StageErrorKind::MissingInstructions);
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn wrong_tag_after_build_is_fatal() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::WrongTag);

        let err = Pipeline::new(&project.config())
            .build_backend(&runtime)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StageErrorKind::TagMismatch);
        assert!(err.to_string().contains("team/backend:stale"));
    }

    #[tokio::test]
    async fn built_image_is_tagged_as_requested() {
        let project = Project::new();
        let runtime = FakeRuntime::new();

        let config = project.config();

        let built = Pipeline::new(&config)
            .build_backend(&runtime)
            .await
            .unwrap()
            .build_frontend(&runtime)
            .await
            .unwrap();

        assert_eq!(built.images().backend.to_string(), BACKEND_IMAGE);
        assert_eq!(built.images().frontend.to_string(), FRONTEND_IMAGE);
    }

    #[tokio::test]
    async fn docker_hub_image_verifies_against_short_tag() {
        let project = Project::with_config(
            &CONFIG_YAML.replace(BACKEND_IMAGE, "docker.io/team/backend:1.0"),
        );
        let runtime = FakeRuntime::new().reporting_short_tags();
        let config = project.config();

        let result = Pipeline::new(&config).build_backend(&runtime).await;

        assert!(result.is_ok(), "short-form tag should verify: {:?}", result.err());
        assert_eq!(
            runtime.calls()[1],
            Call::InspectTags("docker.io/team/backend:1.0".to_string())
        );
    }
}

mod publish_stage {
    use super::*;

    #[tokio::test]
    async fn rejected_login_pushes_nothing() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::Login);

        let report = run(&project, &runtime).await;

        assert!(!report.succeeded());
        assert_eq!(failed_stage(&report), StageName::Publish);
        assert!(runtime.pushes().is_empty());
        assert!(runtime.called(|c| matches!(c, Call::Logout(_))));
        assert!(!runtime.called(|c| matches!(c, Call::Pull(_))));
    }

    #[tokio::test]
    async fn failed_push_skips_remaining_pushes_and_logs_out() {
        let project = Project::new();
        let runtime =
            FakeRuntime::new().failing(Failure::Push("registry.example.com/team/backend"));

        let report = run(&project, &runtime).await;

        assert_eq!(failed_stage(&report), StageName::Publish);
        assert_eq!(runtime.pushes(), vec![BACKEND_IMAGE.to_string()]);
        assert_eq!(
            runtime.calls().last(),
            Some(&Call::Logout(SERVER.map(str::to_string)))
        );
    }

    #[tokio::test]
    async fn logout_follows_successful_pushes() {
        let project = Project::new();
        let runtime = FakeRuntime::new();

        run(&project, &runtime).await;

        let calls = runtime.calls();
        let last_push = calls
            .iter()
            .rposition(|c| matches!(c, Call::Push(_)))
            .unwrap();
        assert_eq!(calls[last_push + 1], Call::Logout(SERVER.map(str::to_string)));
    }

    #[tokio::test]
    async fn logout_failure_is_only_a_warning() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::Logout);

        let report = run(&project, &runtime).await;

        assert!(report.succeeded());
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.warnings()[0].kind, WarningKind::Logout);
    }

    #[tokio::test]
    async fn logout_failure_does_not_mask_login_failure() {
        let project = Project::new();
        let runtime = FakeRuntime::new()
            .failing(Failure::Login)
            .failing(Failure::Logout);

        let report = run(&project, &runtime).await;

        assert_eq!(failed_stage(&report), StageName::Publish);
        let diagnostic = report.failure().unwrap().diagnostic.clone().unwrap();
        assert!(diagnostic.contains("login"), "diagnostic: {}", diagnostic);
        assert_eq!(report.warnings()[0].kind, WarningKind::Logout);
    }
}

mod deploy_stage {
    use super::*;

    #[tokio::test]
    async fn failed_pull_recreates_nothing() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::Pull);

        let report = run(&project, &runtime).await;

        assert!(!report.succeeded());
        assert_eq!(failed_stage(&report), StageName::Deploy);
        assert_eq!(runtime.pushes().len(), 2);
        assert!(!runtime.called(|c| matches!(c, Call::Up { .. })));
        assert!(!runtime.called(|c| *c == Call::Prune));
    }

    #[tokio::test]
    async fn failed_recreate_is_fatal() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::Up);

        let report = run(&project, &runtime).await;

        assert_eq!(failed_stage(&report), StageName::Deploy);
        let diagnostic = report.failure().unwrap().diagnostic.clone().unwrap();
        assert!(diagnostic.contains("already allocated"), "diagnostic: {}", diagnostic);
    }

    #[tokio::test]
    async fn prune_failure_is_only_a_warning() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::Prune);

        let report = run(&project, &runtime).await;

        assert!(report.succeeded());
        assert!(runtime.called(|c| *c == Call::Prune));
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.warnings()[0].kind, WarningKind::Prune);
    }
}

mod observer {
    use super::*;

    #[derive(Default)]
    struct Recording {
        events: Vec<String>,
    }

    impl StageObserver for Recording {
        fn stage_started(&mut self, stage: StageName) {
            self.events.push(format!("start {}", stage));
        }

        fn stage_finished(&mut self, result: &StageResult) {
            self.events
                .push(format!("{} {:?}", result.stage, result.outcome));
        }
    }

    #[tokio::test]
    async fn observer_sees_each_stage_start_and_finish() {
        let project = Project::new();
        let runtime = FakeRuntime::new().failing(Failure::Login);
        let config = project.config();
        let mut diag = Diagnostics::default();
        let mut observer = Recording::default();

        run_pipeline(&config, &runtime, &credential(), &mut diag, &mut observer).await;

        assert_eq!(
            observer.events,
            vec![
                "start build:backend",
                "build:backend Success",
                "start build:frontend",
                "build:frontend Success",
                "start publish",
                "publish Failure",
            ]
        );
    }
}
