// ABOUTME: Tests for rollback to an earlier commit.
// ABOUTME: Verifies the working tree is restored on success and on every failure path.

mod support;

use std::time::Duration;

use ferry::deploy::{self, DeployErrorKind, Stage};
use ferry::diagnostics::{Diagnostics, WarningKind};
use ferry::output::{Output, OutputMode};
use ferry::types::RevisionSpec;
use support::fakes::{Event, Fakes, OLD_COMMIT, WaitBehavior, deploy_settings, existing_definition};

const OLD_IMAGE: &str = "acct.dkr.ecr.us-east-1.amazonaws.com/bia:deadbee";

fn quiet() -> Output {
    Output::new(OutputMode::Quiet)
}

fn position(events: &[Event], pred: impl Fn(&Event) -> bool) -> usize {
    events.iter().position(pred).unwrap()
}

fn target() -> RevisionSpec {
    RevisionSpec::parse("deadbee")
}

#[tokio::test]
async fn rollback_deploys_target_and_restores_branch() {
    support::init_tracing();
    let mut fakes = Fakes::new();
    fakes.cloud = fakes.cloud.with_definition(existing_definition());
    let mut diag = Diagnostics::default();

    let outcome = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap();

    assert_eq!(outcome.deploy.revision.full(), OLD_COMMIT);
    assert_eq!(outcome.deploy.image.to_string(), OLD_IMAGE);
    assert_eq!(outcome.restored, "main");
    assert_eq!(fakes.source.current(), "main");
    assert!(!diag.has_warnings());

    let checkouts: Vec<Event> = fakes
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Checkout(_)))
        .collect();
    assert_eq!(
        checkouts,
        vec![
            Event::Checkout(OLD_COMMIT.into()),
            Event::Checkout("main".into())
        ]
    );
}

#[tokio::test]
async fn checkout_happens_before_build_and_restore_after_wait() {
    let fakes = Fakes::new();
    let mut diag = Diagnostics::default();

    deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap();

    let events = fakes.events();
    let checkout = position(&events, |e| *e == Event::Checkout(OLD_COMMIT.into()));
    let build = position(&events, |e| matches!(e, Event::Build(_)));
    let wait = position(&events, |e| matches!(e, Event::Wait(_)));
    let restore = position(&events, |e| *e == Event::Checkout("main".into()));

    assert!(checkout < build);
    assert!(wait < restore);
    assert_eq!(restore, events.len() - 1);
}

#[tokio::test]
async fn registration_failure_still_restores_branch() {
    let mut fakes = Fakes::new();
    fakes.cloud = fakes.cloud.rejecting_registration();
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Registration);
    assert_eq!(fakes.source.current(), "main");
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn stabilization_timeout_still_restores_branch() {
    let mut fakes = Fakes::new();
    fakes.cloud = fakes.cloud.waiting(WaitBehavior::Fails);
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap_err();

    assert_eq!(err.stage, Stage::RollingOut);
    assert_eq!(err.kind(), DeployErrorKind::StabilizationTimeout);
    assert_eq!(fakes.source.current(), "main");
    assert_eq!(fakes.events().last(), Some(&Event::Checkout("main".into())));
}

#[tokio::test]
async fn local_wait_bound_still_restores_branch() {
    let mut fakes = Fakes::new();
    fakes.cloud = fakes.cloud.waiting(WaitBehavior::Hangs);
    let mut settings = deploy_settings();
    settings.rollout.wait_timeout = Duration::from_millis(50);
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(fakes.collaborators(), &settings, &target(), &quiet(), &mut diag)
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::RollingOut);
    assert_eq!(err.kind(), DeployErrorKind::StabilizationTimeout);
    assert!(err.to_string().contains("not stable after 50ms"));
    assert_eq!(fakes.source.current(), "main");
    assert_eq!(fakes.events().last(), Some(&Event::Checkout("main".into())));
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn unknown_target_touches_nothing() {
    let fakes = Fakes::new();
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &RevisionSpec::parse("0000000"),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::UnknownRevision);
    assert!(!fakes.saw(|e| matches!(e, Event::Checkout(_) | Event::Build(_))));
    assert_eq!(fakes.source.current(), "main");
}

#[tokio::test]
async fn failed_restore_after_success_is_an_error() {
    let mut fakes = Fakes::new();
    fakes.source = fakes.source.fail_checkout_of("main");
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap_err();

    assert_eq!(err.stage, Stage::Restoring);
    assert_eq!(err.kind(), DeployErrorKind::Restore);
    assert!(fakes.saw(|e| matches!(e, Event::Wait(_))));
}

#[tokio::test]
async fn failed_restore_after_failure_keeps_pipeline_error() {
    let mut fakes = Fakes::new();
    fakes.source = fakes.source.fail_checkout_of("main");
    fakes.cloud = fakes.cloud.waiting(WaitBehavior::Fails);
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::StabilizationTimeout);
    assert_eq!(diag.warnings().len(), 1);
    assert_eq!(diag.warnings()[0].kind, WarningKind::RestoreFailed);
    assert!(diag.warnings()[0].message.contains("main"));
}

#[tokio::test]
async fn failed_target_checkout_is_reported_and_restore_attempted() {
    let mut fakes = Fakes::new();
    fakes.source = fakes.source.fail_checkout_of(OLD_COMMIT);
    let mut diag = Diagnostics::default();

    let err = deploy::rollback(
        fakes.collaborators(),
        &deploy_settings(),
        &target(),
        &quiet(),
        &mut diag,
    )
    .await
    .unwrap_err();

    assert_eq!(err.stage, Stage::CheckingOut);
    assert_eq!(err.kind(), DeployErrorKind::Checkout);
    assert!(!fakes.saw(|e| matches!(e, Event::Build(_))));
    assert_eq!(fakes.events().last(), Some(&Event::Checkout("main".into())));
}
