//! Application services - Business logic orchestration

pub mod command_service;
pub mod identity_service;
pub mod reward_service;
pub mod transfer_service;

pub use command_service::CommandService;
pub use identity_service::IdentityResolver;
pub use reward_service::RewardIssuer;
pub use transfer_service::TransferExecutor;
