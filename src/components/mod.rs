mod confirm_dialog;
pub mod ui;

pub use confirm_dialog::ConfirmDialog;
