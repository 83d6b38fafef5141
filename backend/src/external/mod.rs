//! External API integrations

pub mod governance;
pub mod iam;
pub mod openscale;

pub use governance::{GovernanceClient, RemoteEvaluator};
pub use iam::IamAuthenticator;
pub use openscale::{MonitoringApi, OpenScaleClient};
