pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::*;
pub use extract::*;
pub use handlers::*;
pub use routes::*;
pub use state::*;
