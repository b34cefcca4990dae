//! Service implementations for the PluralKit API.

mod systems;

pub use systems::SystemsService;
