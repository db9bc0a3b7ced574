/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository functions,
/// and returning a properly formatted response.

mod user_handlers;
mod profile_handlers;
mod item_handlers;
mod favorite_handlers;
mod comment_handlers;
mod tag_handlers;

// Re-export all handlers
pub use user_handlers::*;
pub use profile_handlers::*;
pub use item_handlers::*;
pub use favorite_handlers::*;
pub use comment_handlers::*;
pub use tag_handlers::*;
