//! Repository layer: one zero-sized repo type per aggregate.

mod approval_repo;
mod issue_repo;
mod label_repo;
mod member_repo;
mod milestone_repo;
mod plan_repo;
mod project_repo;
mod risk_repo;
mod task_repo;
mod token_repo;
mod user_repo;

pub use approval_repo::ApprovalRepo;
pub use issue_repo::IssueRepo;
pub use label_repo::LabelRepo;
pub use member_repo::MemberRepo;
pub use milestone_repo::MilestoneRepo;
pub use plan_repo::{PlanMilestoneRepo, PlanRepo, WbsTaskRepo};
pub use project_repo::ProjectRepo;
pub use risk_repo::RiskRepo;
pub use task_repo::{DependencyRepo, TaskCommentRepo, TaskRepo};
pub use token_repo::TokenRepo;
pub use user_repo::UserRepo;
