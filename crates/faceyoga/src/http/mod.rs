//! HTTP layer
//!
//! A provider trait over the backend, a single-attempt request builder that
//! speaks the table API's query conventions, and response parsing into
//! client errors. Retries live one level up, in the client.

pub use provider::HttpProvider;
pub use request::{Order, RequestBuilder};
pub use response::Response;
pub use supabase_provider::{SupabaseHttpProvider, SupabaseHttpProviderBuilder};

pub mod provider;
mod request;
mod response;
mod supabase_provider;

pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
