pub mod memory;
pub mod repository;

pub use memory::InMemoryAccountRepository;
pub use repository::AccountRepository;
