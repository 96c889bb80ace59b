pub mod auth;
pub mod camera;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod identity;
pub mod lifecycle;
pub mod motion;
pub mod notice;
pub mod route;
pub mod scene;

pub use camera::*;
pub use constants::*;
pub use identity::{IdentityError, IdentityService, Session};
pub use lifecycle::*;
pub use motion::*;
pub use notice::*;
pub use route::*;
pub use scene::*;
