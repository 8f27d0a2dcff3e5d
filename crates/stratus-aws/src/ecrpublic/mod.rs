//! Amazon ECR Public

pub mod api;
pub mod repository_policy;

pub use api::EcrPublicApi;
pub use repository_policy::RepositoryPolicy;
