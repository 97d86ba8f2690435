pub mod models;
pub mod manager;
pub mod events;
pub mod registry;
pub mod dispatcher;

pub use models::{Checkpoint, EdibilityStatus, Order, OrderStatus, Stage};
pub use manager::{Decision, OrderError, OrderStateMachine, Transition};
pub use events::ShipmentEvent;
pub use registry::{
    BoxError, ContractRegistry, InMemoryContractRegistry, InMemoryOrderRegistry, OrderRegistry,
    RegistryError,
};
pub use dispatcher::{DispatchError, Dispatched, EventDispatcher};
