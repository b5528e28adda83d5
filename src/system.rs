// The reservation system ties the three managers together.
//
// Creating or cancelling a reservation touches two files: the reservation
// record is committed first, then the hotel's room bookkeeping. The second
// step is never rolled back into the first; when it fails the outcome is
// reported through `HotelSync::Diverged` and can be found later with `audit`.

use std::fmt;

use tracing::{info, warn};

use crate::{
    config::SystemConfig,
    customer::{Customer, CustomerManager, CustomerUpdate},
    error::{EntityKind, ReservationError, Result},
    hotel::{Hotel, HotelManager, HotelUpdate},
    reservation::{Reservation, ReservationManager},
};

// Result of the hotel-side step of a create or cancel
#[derive(Debug)]
pub enum HotelSync {
    Applied,
    Diverged(ReservationError),
}

#[derive(Debug)]
pub struct Booking {
    pub reservation_id: String,
    pub hotel_id: String,
    pub hotel_sync: HotelSync,
}

impl Booking {
    pub fn is_consistent(&self) -> bool {
        matches!(self.hotel_sync, HotelSync::Applied)
    }
}

// A cross-reference between reservations and hotels that does not line up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    // active reservation without a room held at its hotel
    RoomNotHeld {
        reservation_id: String,
        hotel_id: String,
    },
    // active reservation pointing at a hotel that no longer exists
    MissingHotel {
        reservation_id: String,
        hotel_id: String,
    },
    // hotel holding a room for a reservation that is cancelled, unknown or
    // booked elsewhere
    StaleRoomHold {
        hotel_id: String,
        reservation_id: String,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::RoomNotHeld {
                reservation_id,
                hotel_id,
            } => write!(
                f,
                "active reservation '{reservation_id}' holds no room at hotel '{hotel_id}'"
            ),
            Discrepancy::MissingHotel {
                reservation_id,
                hotel_id,
            } => write!(
                f,
                "active reservation '{reservation_id}' refers to missing hotel '{hotel_id}'"
            ),
            Discrepancy::StaleRoomHold {
                hotel_id,
                reservation_id,
            } => write!(
                f,
                "hotel '{hotel_id}' holds a room for inactive reservation '{reservation_id}'"
            ),
        }
    }
}

#[derive(Debug)]
pub struct ReservationSystem {
    config: SystemConfig,
    hotels: HotelManager,
    customers: CustomerManager,
    reservations: ReservationManager,
}

impl ReservationSystem {
    pub fn open(config: SystemConfig) -> Self {
        info!(
            hotels = %config.hotels_path.display(),
            customers = %config.customers_path.display(),
            reservations = %config.reservations_path.display(),
            "opening reservation system"
        );

        Self {
            hotels: HotelManager::open(&config.hotels_path),
            customers: CustomerManager::open(&config.customers_path),
            reservations: ReservationManager::open(&config.reservations_path),
            config,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Re-reads all three backing files, dropping any unsaved in-memory state.
    pub fn reload(&mut self) {
        self.hotels.reload();
        self.customers.reload();
        self.reservations.reload();
    }

    pub fn hotels(&self) -> &HotelManager {
        &self.hotels
    }

    pub fn customers(&self) -> &CustomerManager {
        &self.customers
    }

    pub fn reservations(&self) -> &ReservationManager {
        &self.reservations
    }

    pub fn create_hotel(&mut self, hotel_id: &str, name: &str, location: &str, rooms: i64) -> Result<()> {
        self.hotels.create(hotel_id, name, location, rooms)
    }

    pub fn delete_hotel(&mut self, hotel_id: &str) -> Result<()> {
        self.hotels.delete(hotel_id)
    }

    pub fn display_hotel(&self, hotel_id: &str) -> Result<&Hotel> {
        self.hotels.display(hotel_id)
    }

    pub fn modify_hotel(&mut self, hotel_id: &str, update: HotelUpdate) -> Result<()> {
        self.hotels.modify(hotel_id, update)
    }

    pub fn create_customer(&mut self, customer_id: &str, name: &str, email: &str, phone: &str) -> Result<()> {
        self.customers.create(customer_id, name, email, phone)
    }

    pub fn delete_customer(&mut self, customer_id: &str) -> Result<()> {
        self.customers.delete(customer_id)
    }

    pub fn display_customer(&self, customer_id: &str) -> Result<&Customer> {
        self.customers.display(customer_id)
    }

    pub fn modify_customer(&mut self, customer_id: &str, update: CustomerUpdate) -> Result<()> {
        self.customers.modify(customer_id, update)
    }

    /// Creates an active reservation and holds a room for it.
    ///
    /// Fails without side effects when the customer or hotel is unknown, the
    /// id is taken or the dates are invalid. Once the reservation record is
    /// created the call succeeds; a failure to hold the room (for instance a
    /// full hotel) is returned as [`HotelSync::Diverged`].
    pub fn create_reservation(
        &mut self,
        reservation_id: &str,
        customer_id: &str,
        hotel_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<Booking> {
        if self.customers.get(customer_id).is_none() {
            return Err(ReservationError::not_found(EntityKind::Customer, customer_id));
        }
        if self.hotels.get(hotel_id).is_none() {
            return Err(ReservationError::not_found(EntityKind::Hotel, hotel_id));
        }

        self.reservations
            .create(reservation_id, customer_id, hotel_id, check_in, check_out)?;

        let hotel_sync = match self.hotels.reserve_room(hotel_id, reservation_id) {
            Ok(()) => HotelSync::Applied,
            Err(err) => {
                warn!(reservation_id, hotel_id, error = %err, "reservation created without a room");
                HotelSync::Diverged(err)
            }
        };

        Ok(Booking {
            reservation_id: reservation_id.to_string(),
            hotel_id: hotel_id.to_string(),
            hotel_sync,
        })
    }

    /// Cancels a reservation and releases its room.
    ///
    /// A failure to release the room does not fail the call; it is returned
    /// as [`HotelSync::Diverged`].
    pub fn cancel_reservation(&mut self, reservation_id: &str) -> Result<Booking> {
        let hotel_id = self
            .reservations
            .get(reservation_id)
            .map(|r| r.hotel_id.clone())
            .ok_or_else(|| ReservationError::not_found(EntityKind::Reservation, reservation_id))?;

        self.reservations.cancel(reservation_id)?;

        let hotel_sync = match self.hotels.cancel_reservation(&hotel_id, reservation_id) {
            Ok(()) => HotelSync::Applied,
            Err(err) => {
                warn!(reservation_id, hotel_id = %hotel_id, error = %err, "reservation cancelled without releasing a room");
                HotelSync::Diverged(err)
            }
        };

        Ok(Booking {
            reservation_id: reservation_id.to_string(),
            hotel_id,
            hotel_sync,
        })
    }

    pub fn display_reservation(&self, reservation_id: &str) -> Result<&Reservation> {
        self.reservations.display(reservation_id)
    }

    /// Lists every place where reservations and hotel room holds disagree.
    pub fn audit(&self) -> Vec<Discrepancy> {
        let mut found = Vec::new();

        for rsvp in self.reservations.iter().filter(|r| r.is_active()) {
            match self.hotels.get(&rsvp.hotel_id) {
                None => found.push(Discrepancy::MissingHotel {
                    reservation_id: rsvp.reservation_id.clone(),
                    hotel_id: rsvp.hotel_id.clone(),
                }),
                Some(hotel) if !hotel.holds(&rsvp.reservation_id) => {
                    found.push(Discrepancy::RoomNotHeld {
                        reservation_id: rsvp.reservation_id.clone(),
                        hotel_id: rsvp.hotel_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for hotel in self.hotels.iter() {
            for reservation_id in &hotel.reservations {
                let backed = self
                    .reservations
                    .get(reservation_id)
                    .is_some_and(|r| r.is_active() && r.hotel_id == hotel.hotel_id);
                if !backed {
                    found.push(Discrepancy::StaleRoomHold {
                        hotel_id: hotel.hotel_id.clone(),
                        reservation_id: reservation_id.clone(),
                    });
                }
            }
        }

        found
    }
}
