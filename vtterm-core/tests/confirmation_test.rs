//! Tests for the default-deny confirmation gate

mod common;

use common::{Script, SharedBuffer, Step};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vtterm_core::history::HistoryLog;
use vtterm_core::input::InputController;
use vtterm_core::ui::{ConfirmationRequest, Renderer};

async fn confirm_with_input(input: &str) -> (bool, String) {
    let output = SharedBuffer::default();
    let controller = InputController::non_interactive(
        Cursor::new(input.as_bytes().to_vec()),
        HistoryLog::in_memory(10),
    )
    .with_renderer(Renderer::with_writer(output.clone()));
    let request = ConfirmationRequest::new("rm -rf build")
        .dangerous("recursive delete")
        .with_description("Clean the build directory");
    let approved = controller.confirm(&request, &CancellationToken::new()).await;
    (approved, output.contents())
}

#[tokio::test]
async fn affirmative_answers_approve() {
    for answer in ["y\n", "Y\n", "yes\n", "YES\n", "Yes\n", "  yes  \n", "y"] {
        let (approved, _) = confirm_with_input(answer).await;
        assert!(approved, "{answer:?} should approve");
    }
}

#[tokio::test]
async fn everything_else_denies() {
    for answer in ["n\n", "no\n", "\n", "   \n", "maybe\n", "yep\n", ""] {
        let (approved, _) = confirm_with_input(answer).await;
        assert!(!approved, "{answer:?} should deny");
    }
}

#[tokio::test]
async fn renders_banner_description_command_then_prompt() {
    let (_, output) = confirm_with_input("n\n").await;
    assert_eq!(
        output,
        "⚠ DANGEROUS COMMAND: recursive delete\nClean the build directory\n  rm -rf build\nExecute? [y/N]: "
    );
}

#[tokio::test]
async fn cancelled_confirmation_denies() {
    let output = SharedBuffer::default();
    let controller = InputController::non_interactive(
        Cursor::new(b"yes\n".to_vec()),
        HistoryLog::in_memory(10),
    )
    .with_renderer(Renderer::with_writer(output.clone()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(!controller.confirm(&ConfirmationRequest::new("ls"), &cancel).await);
    assert!(output.contents().starts_with("Command to execute:\n  ls\n"));
}

fn interactive(script: &Arc<Script>) -> InputController {
    InputController::interactive(script.factory(), HistoryLog::in_memory(10))
        .with_renderer(Renderer::with_writer(std::io::sink()))
}

#[tokio::test]
async fn interactive_confirmation_uses_confirm_prompt_without_history() {
    let script = Script::lines(&["YES"]);
    let controller = interactive(&script);

    assert!(controller.confirm(&ConfirmationRequest::new("ls"), &CancellationToken::new()).await);
    assert_eq!(script.prompts(), vec!["Execute? [y/N]: "]);
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn interactive_end_of_input_denies() {
    let script = Script::new([Step::Eof]);
    let controller = interactive(&script);
    assert!(!controller.confirm(&ConfirmationRequest::new("ls"), &CancellationToken::new()).await);
}

#[tokio::test]
async fn cancelled_interactive_confirmation_denies_after_session_closes() {
    let script = Script::new([Step::Block]);
    let controller = interactive(&script);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let approved = tokio::time::timeout(
        Duration::from_secs(5),
        controller.confirm(&ConfirmationRequest::new("rm -rf build"), &cancel),
    )
    .await
    .expect("cancellation should unblock the confirmation");
    assert!(!approved);
    assert_eq!(script.closes_observed(), 1);
}
