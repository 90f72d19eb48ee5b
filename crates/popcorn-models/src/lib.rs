pub mod movie;
pub mod watched;

pub use movie::{MovieDetails, MovieSummary};
pub use watched::{WatchedMovie, MAX_USER_RATING, MIN_USER_RATING};
