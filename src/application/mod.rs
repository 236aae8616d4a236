pub mod fleet;
pub mod rental;

pub use fleet::{FleetRegistry, SharedFleetRegistry};
pub use rental::{rental_process, RentalChannel, RentalProcess};
