pub mod middleware;
mod stories;

pub use stories::{HttpState, build_router};
