// Hotel reservation manager: hotels, customers and reservations kept in JSON
// files, with a reservation system that keeps hotel room counts in step with
// reservations.

pub mod config;
pub mod customer;
pub mod error;
pub mod hotel;
pub mod reservation;
pub mod store;
pub mod system;
pub mod update;

// Re-export key types for convenience
pub use config::SystemConfig;
pub use customer::{Customer, CustomerManager, CustomerUpdate};
pub use error::{EntityKind, ReservationError, Result, StoreError};
pub use hotel::{Hotel, HotelManager, HotelUpdate};
pub use reservation::{Reservation, ReservationManager, ReservationStatus};
pub use store::{JsonStore, Record};
pub use system::{Booking, Discrepancy, HotelSync, ReservationSystem};
pub use update::Patch;
