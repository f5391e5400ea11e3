mod component;
mod controller;
mod interaction;
mod projector;
mod render;
mod state;
mod types;

pub use component::{ATTRIBUTE_MIME, SocialGraphCanvas};
pub use controller::InteractionController;
pub use interaction::{Event, InteractionState, LinkingSession};
pub use projector::{Projection, overlay_provisional, project};
pub use types::GridLayout;
