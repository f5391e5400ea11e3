//! Side panels, dialogs and notifications around the graph canvas.

mod delete_confirm;
mod linking_panel;
mod sidebar;
mod stats_panel;
mod toast;
mod user_form;

pub use delete_confirm::DeleteConfirmModal;
pub use linking_panel::LinkingPanel;
pub use sidebar::Sidebar;
pub use stats_panel::StatsPanel;
pub use toast::{Toast, ToastKind};
pub use user_form::{FormMode, UserFormModal};
