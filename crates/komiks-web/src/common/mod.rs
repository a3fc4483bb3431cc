mod route;
pub use route::{Navigation, Route, CREATOR_ROLES};

mod cover;
pub use cover::Cover;

mod spinner;
pub use spinner::Spinner;

pub mod events;

mod model;
pub use model::*;

pub mod snackbar;

mod bottombar;
pub use bottombar::Bottombar;

mod profile;
pub use profile::Profile;
