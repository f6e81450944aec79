pub mod admin;
pub mod cart;
pub mod events;
pub mod gallery;
pub mod host;
pub mod lazy_load;
pub mod memory;
pub mod quantity;
pub mod scroll;
pub mod search;
pub mod settings;
pub mod simulator;
mod storefront;
mod tooltips;
pub mod validation;

pub use events::{EventOutcome, EventType, Listener, ListenerTarget};
pub use host::{Browser, Document, ElementId, Host, Scheduler, TimerId, TimerTask};
pub use memory::MemoryPage;
pub use settings::{load_settings, Messages, Settings};
pub use simulator::Simulator;
pub use storefront::Storefront;
