/// Use cases module containing application business logic orchestration
mod walk_dependencies;

pub use walk_dependencies::WalkDependenciesUseCase;
