pub mod response;

pub use response::{DeletedResponse, DrinksResponse};
