//! # vtterm-core - Terminal interaction core for VTTerm
//!
//! `vtterm-core` sits between a human operator and an agent loop that runs
//! tools on the operator's behalf. It provides:
//!
//! - **Truncation** (`truncation`): head/tail reduction of large tool output,
//!   with a field-wise variant for `{stdout, stderr, exit_code}` records.
//! - **History** (`history`): bounded, consecutive-deduplicating command
//!   history mirrored to a plain text file.
//! - **Input control** (`input`): plain line reads for pipes and files, a
//!   crossterm line editor for real terminals, and cancellation of pending
//!   terminal reads through a `CancellationToken`.
//! - **Confirmation** (`ui::confirmation`): a default-deny `[y/N]` gate for
//!   destructive commands.
//! - **Configuration** (`config`): `vtterm.toml` discovery and typed sections.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use vtterm_core::history::HistoryLog;
//! use vtterm_core::input::InputController;
//! use vtterm_core::ui::ConfirmationRequest;
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = InputController::from_stdin(HistoryLog::new(None, 500));
//!     let cancel = CancellationToken::new();
//!
//!     while let Some(line) = controller.get_user_input(&cancel).await {
//!         let request = ConfirmationRequest::new(line.clone());
//!         if controller.confirm(&request, &cancel).await {
//!             println!("would run: {line}");
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod history;
pub mod input;
pub mod truncation;
pub mod ui;

pub use config::{ConfigManager, VTTermConfig};
pub use history::{HistoryError, HistoryLog};
pub use input::{InputController, InputError, InputMode, InputSource, PromptState};
pub use truncation::{
    StructuredToolRecord, TruncationOutcome, TruncationPolicy, truncate, truncate_structured_output,
};
pub use ui::{ConfirmationRequest, Renderer, ToolOutputView};
