use std::sync::{Arc, Mutex};
use std::time::Duration;

use movli_model::{ErrorKind, Identity, Message};
use movli_test_backend::{FakeBackend, FakeTokenProvider};
use tokio::time::{sleep, timeout};

use super::*;

fn alice() -> Identity {
    Identity::new("alice")
}

fn bob() -> Identity {
    Identity::new("bob")
}

fn signed_in(backend: &FakeBackend) -> ChatController {
    ChatControllerBuilder::with_backend(backend.clone())
        .with_identity(Some(alice()))
        .build()
}

async fn wait_for(
    controller: &ChatController,
    pred: impl Fn(&Snapshot) -> bool,
) -> Snapshot {
    timeout(Duration::from_millis(500), async {
        loop {
            let snapshot = controller.snapshot().await.unwrap();
            if pred(&snapshot) {
                return snapshot;
            }
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("controller did not reach the expected state")
}

async fn wait_idle(controller: &ChatController) -> Snapshot {
    wait_for(controller, |s| s.status == SessionStatus::Idle).await
}

/// Lets spawned requests finish and their results reach the controller.
async fn settle() {
    sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn test_hydrates_history() {
    let backend = FakeBackend::default();
    backend.push_history(vec![Message::user("hi"), Message::assistant("hello")]);

    let controller = signed_in(&backend);
    let snapshot = wait_idle(&controller).await;
    assert_eq!(
        snapshot.messages,
        vec![Message::user("hi"), Message::assistant("hello")]
    );
    assert!(!snapshot.pending);
    assert_eq!(snapshot.identity, Some(alice()));
    assert_eq!(backend.history_calls(), 1);
}

#[tokio::test]
async fn test_history_failure_is_not_fatal() {
    let backend = FakeBackend::default();
    backend.push_history_failure(ErrorKind::Network);
    backend.push_reply("Try Paddington 2.");

    let controller = signed_in(&backend);
    let snapshot = wait_idle(&controller).await;
    assert_eq!(
        snapshot.messages,
        vec![Message::assistant(HISTORY_UNAVAILABLE)]
    );

    let outcome = controller.send_message("something cozy").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);
    let snapshot = wait_idle(&controller).await;
    assert_eq!(
        snapshot.messages,
        vec![
            Message::assistant(HISTORY_UNAVAILABLE),
            Message::user("something cozy"),
            Message::assistant("Try Paddington 2."),
        ]
    );
}

#[tokio::test]
async fn test_replies_follow_their_prompts() {
    let backend = FakeBackend::default();
    backend.set_delay(Duration::from_millis(2));
    backend.push_reply("one");
    backend.push_reply("two");

    let controller = signed_in(&backend);
    wait_idle(&controller).await;

    for prompt in ["first", "second"] {
        let outcome = controller.send_message(prompt).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
        wait_idle(&controller).await;
    }

    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(
        snapshot.messages,
        vec![
            Message::user("first"),
            Message::assistant("one"),
            Message::user("second"),
            Message::assistant("two"),
        ]
    );
    assert_eq!(backend.prompts(), vec!["first", "second"]);
}

#[tokio::test]
async fn test_send_failure_keeps_user_message() {
    let backend = FakeBackend::default();
    backend.push_history(vec![Message::user("hi"), Message::assistant("hello")]);
    backend.push_reply_failure(ErrorKind::Network);

    let controller = signed_in(&backend);
    wait_idle(&controller).await;

    let outcome = controller.send_message("recommend a comedy").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);

    let snapshot = wait_idle(&controller).await;
    assert_eq!(
        snapshot.messages[2..],
        [
            Message::user("recommend a comedy"),
            Message::assistant(CONNECTION_TROUBLE),
        ]
    );
    assert!(!snapshot.pending);
    assert_ne!(CONNECTION_TROUBLE, HISTORY_UNAVAILABLE);
}

#[tokio::test]
async fn test_user_message_is_optimistic() {
    let backend = FakeBackend::default();
    let gate = backend.hold_reply();

    let controller = signed_in(&backend);
    wait_idle(&controller).await;

    controller.send_message("anything by Varda?").await.unwrap();
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Sending);
    assert!(snapshot.pending);
    assert_eq!(snapshot.messages, vec![Message::user("anything by Varda?")]);

    gate.succeed("Cléo from 5 to 7.".to_owned());
    let snapshot = wait_idle(&controller).await;
    assert_eq!(snapshot.messages.len(), 2);
}

#[tokio::test]
async fn test_submit_without_identity() {
    let backend = FakeBackend::default();
    let controller = ChatControllerBuilder::with_backend(backend.clone()).build();

    let outcome = controller.send_message("hello?").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::NoIdentity);

    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::LoggedOut);
    assert!(snapshot.messages.is_empty());
    assert!(backend.prompts().is_empty());
    assert_eq!(backend.history_calls(), 0);
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let backend = FakeBackend::default();
    let controller = signed_in(&backend);
    wait_idle(&controller).await;

    for input in ["", "   ", "\n\t"] {
        let outcome = controller.send_message(input).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::EmptyInput);
    }
    let snapshot = controller.snapshot().await.unwrap();
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.status, SessionStatus::Idle);
    assert!(backend.prompts().is_empty());
}

#[tokio::test]
async fn test_one_request_at_a_time() {
    let backend = FakeBackend::default();
    let history_gate = backend.hold_history();
    let reply_gate = backend.hold_reply();

    let controller = signed_in(&backend);
    let outcome = controller.send_message("too early").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Busy);

    history_gate.succeed(vec![]);
    wait_idle(&controller).await;

    let outcome = controller.send_message("first").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);
    let outcome = controller.send_message("second").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Busy);
    assert_eq!(backend.prompts(), vec!["first"]);

    reply_gate.succeed("ok".to_owned());
    let snapshot = wait_idle(&controller).await;
    assert_eq!(
        snapshot.messages,
        vec![Message::user("first"), Message::assistant("ok")]
    );
}

#[tokio::test]
async fn test_draft_submission() {
    let backend = FakeBackend::default();
    let gate = backend.hold_reply();
    let controller = signed_in(&backend);
    wait_idle(&controller).await;

    controller.update_draft("  ").unwrap();
    assert_eq!(controller.submit().await.unwrap(), SubmitOutcome::EmptyInput);
    assert_eq!(controller.snapshot().await.unwrap().draft, "  ");

    controller.update_draft("a heist movie").unwrap();
    assert_eq!(controller.submit().await.unwrap(), SubmitOutcome::Accepted);
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.draft, "");
    assert_eq!(snapshot.messages, vec![Message::user("a heist movie")]);

    gate.succeed("Heat (1995).".to_owned());
    let snapshot = wait_idle(&controller).await;
    assert_eq!(snapshot.messages[1], Message::assistant("Heat (1995)."));
}

#[tokio::test]
async fn test_stale_history_after_logout() {
    let backend = FakeBackend::default();
    let gate = backend.hold_history();

    let controller = signed_in(&backend);
    controller.identity_changed(None).unwrap();
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::LoggedOut);

    gate.succeed(vec![Message::user("private")]);
    settle().await;

    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::LoggedOut);
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.pending);
}

#[tokio::test]
async fn test_stale_history_after_relogin() {
    let backend = FakeBackend::default();
    let first = backend.hold_history();
    let second = backend.hold_history();

    let controller = signed_in(&backend);
    controller.identity_changed(None).unwrap();
    controller.identity_changed(Some(alice())).unwrap();

    // The first request belongs to the earlier session of the same user.
    first.succeed(vec![Message::user("old")]);
    settle().await;
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::HydratingHistory);
    assert!(snapshot.messages.is_empty());

    second.succeed(vec![Message::user("new")]);
    let snapshot = wait_idle(&controller).await;
    assert_eq!(snapshot.messages, vec![Message::user("new")]);
    assert_eq!(backend.history_calls(), 2);
}

#[tokio::test]
async fn test_stale_reply_after_switching_identity() {
    let backend = FakeBackend::default();
    let reply_gate = backend.hold_reply();

    let controller = signed_in(&backend);
    wait_idle(&controller).await;
    controller.send_message("for alice").await.unwrap();

    backend.push_history(vec![Message::user("bob's history")]);
    controller.identity_changed(Some(bob())).unwrap();
    let snapshot = wait_idle(&controller).await;
    assert_eq!(snapshot.identity, Some(bob()));

    reply_gate.succeed("alice's answer".to_owned());
    settle().await;
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.messages, vec![Message::user("bob's history")]);
    assert_eq!(snapshot.status, SessionStatus::Idle);
}

#[tokio::test]
async fn test_stale_reply_after_logout() {
    let backend = FakeBackend::default();
    let reply_gate = backend.hold_reply();

    let controller = signed_in(&backend);
    wait_idle(&controller).await;
    controller.send_message("for alice").await.unwrap();
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Sending);

    controller.identity_changed(None).unwrap();
    wait_for(&controller, |s| s.status == SessionStatus::LoggedOut).await;

    reply_gate.succeed("alice's answer".to_owned());
    settle().await;
    let snapshot = controller.snapshot().await.unwrap();
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.status, SessionStatus::LoggedOut);
    assert!(!snapshot.pending);
}

#[tokio::test]
async fn test_same_identity_does_not_rehydrate() {
    let backend = FakeBackend::default();
    backend.push_reply("sure");
    let controller = signed_in(&backend);
    wait_idle(&controller).await;
    controller.send_message("hi").await.unwrap();
    wait_idle(&controller).await;

    controller.identity_changed(Some(alice())).unwrap();
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(backend.history_calls(), 1);
}

#[tokio::test]
async fn test_observe_identity() {
    let backend = FakeBackend::default();
    backend.push_history(vec![Message::assistant("welcome back")]);
    let tokens = FakeTokenProvider::default();

    let controller = ChatControllerBuilder::with_backend(backend.clone()).build();
    let task = controller.observe_identity(tokens.subscribe());

    tokens.sign_in(alice());
    let snapshot = wait_idle(&controller).await;
    assert_eq!(snapshot.messages, vec![Message::assistant("welcome back")]);

    tokens.sign_out();
    let snapshot =
        wait_for(&controller, |s| s.status == SessionStatus::LoggedOut).await;
    assert!(snapshot.messages.is_empty());

    drop(tokens);
    timeout(Duration::from_millis(500), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_change_notifications() {
    let backend = FakeBackend::default();
    backend.push_reply("Alien.");
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let idle_count = Arc::new(Mutex::new(0));

    let controller = ChatControllerBuilder::with_backend(backend)
        .with_identity(Some(alice()))
        .on_change({
            let statuses = Arc::clone(&statuses);
            move |snapshot| statuses.lock().unwrap().push(snapshot.status)
        })
        .on_idle({
            let idle_count = Arc::clone(&idle_count);
            move || *idle_count.lock().unwrap() += 1
        })
        .build();
    wait_idle(&controller).await;
    controller.send_message("space horror").await.unwrap();
    wait_for(&controller, |s| s.messages.len() == 2).await;

    assert_eq!(
        *statuses.lock().unwrap(),
        vec![
            SessionStatus::HydratingHistory,
            SessionStatus::Idle,
            SessionStatus::Sending,
            SessionStatus::Idle,
        ]
    );
    assert_eq!(*idle_count.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_shutdown() {
    let controller =
        ChatControllerBuilder::with_backend(FakeBackend::default()).build();
    controller.shutdown();
    settle().await;
    assert!(controller.snapshot().await.is_err());
    assert!(controller.send_message("anyone?").await.is_err());
}
