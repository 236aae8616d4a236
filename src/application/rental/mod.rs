pub mod process;

pub use process::{
    rental_process, OfflineRentalProcess, OnlineRentalProcess, RentalChannel, RentalProcess,
    SharedRentalProcess, DEFAULT_LOCK_TIMEOUT,
};
