pub mod api;
pub mod error;
pub mod http;
pub mod token;

pub use api::{AuthApi, EnergyApi};
pub use error::{ApiError, Result};
pub use http::HttpClient;
pub use token::{token_channel, BearerToken, TokenReader, TokenWriter};
