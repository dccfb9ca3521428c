pub mod memory_prompt_repository;
pub mod pg_prompt_repository;
pub mod prompt_repository;

pub use memory_prompt_repository::InMemoryPromptRepository;
pub use pg_prompt_repository::PgPromptRepository;
pub use prompt_repository::PromptRepository;
