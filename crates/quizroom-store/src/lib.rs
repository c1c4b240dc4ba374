//! Quizroom Store: in-process implementation of `QuizRepository`.

pub mod memory_repository;

pub use memory_repository::MemoryRepository;
