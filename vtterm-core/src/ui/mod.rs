//! Display-side helpers: the message sink, confirmation rendering and tool output view

pub mod confirmation;
pub mod renderer;
pub mod tool_output;

pub use confirmation::{ConfirmationRequest, is_affirmative, render_confirmation};
pub use renderer::{ColorMode, MessageStyle, Renderer};
pub use tool_output::ToolOutputView;
