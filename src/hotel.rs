use std::{collections::HashSet, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{EntityKind, ReservationError, Result},
    store::{JsonStore, Record},
    update::Patch,
};

// A hotel and its room bookkeeping.
//
// `available_rooms` is persisted alongside `rooms` and `reservations` and must
// always equal `rooms - reservations.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub hotel_id: String,
    pub name: String,
    pub location: String,
    pub rooms: u32,
    pub available_rooms: u32,
    pub reservations: Vec<String>,
}

impl Hotel {
    fn new(hotel_id: &str, name: &str, location: &str, rooms: u32) -> Self {
        Self {
            hotel_id: hotel_id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            rooms,
            available_rooms: rooms,
            reservations: Vec::new(),
        }
    }

    pub fn holds(&self, reservation_id: &str) -> bool {
        self.reservations.iter().any(|r| r == reservation_id)
    }

    fn reserved(&self) -> usize {
        self.reservations.len()
    }

    fn reserve(&mut self, reservation_id: &str) -> Result<()> {
        if self.available_rooms == 0 {
            return Err(ReservationError::NoRoomsAvailable(self.hotel_id.clone()));
        }
        if self.holds(reservation_id) {
            return Err(ReservationError::AlreadyBooked {
                hotel_id: self.hotel_id.clone(),
                reservation_id: reservation_id.to_string(),
            });
        }

        self.reservations.push(reservation_id.to_string());
        self.available_rooms -= 1;
        Ok(())
    }

    fn release(&mut self, reservation_id: &str) -> Result<()> {
        let Some(pos) = self.reservations.iter().position(|r| r == reservation_id) else {
            return Err(ReservationError::NotBooked {
                hotel_id: self.hotel_id.clone(),
                reservation_id: reservation_id.to_string(),
            });
        };

        self.reservations.remove(pos);
        self.available_rooms += 1;
        Ok(())
    }
}

impl Record for Hotel {
    const KIND: EntityKind = EntityKind::Hotel;

    fn id(&self) -> &str {
        &self.hotel_id
    }

    fn check(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.reservations.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(format!("reservation '{dup}' is listed twice"));
        }
        if self.available_rooms as usize + self.reserved() != self.rooms as usize {
            return Err(format!(
                "available_rooms {} + {} reservations does not match {} rooms",
                self.available_rooms,
                self.reserved(),
                self.rooms
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hotel ID: {}", self.hotel_id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Location: {}", self.location)?;
        writeln!(f, "Total rooms: {}", self.rooms)?;
        writeln!(f, "Available rooms: {}", self.available_rooms)?;
        write!(f, "Active reservations: {}", self.reserved())
    }
}

// Fields a caller may change on an existing hotel.
// `rooms` is signed so that a negative request is rejected rather than
// unrepresentable.
#[derive(Debug, Clone, Default)]
pub struct HotelUpdate {
    pub name: Patch<String>,
    pub location: Patch<String>,
    pub rooms: Patch<i64>,
}

#[derive(Debug)]
pub struct HotelManager {
    store: JsonStore<Hotel>,
}

impl HotelManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::open(path),
        }
    }

    pub fn create(&mut self, hotel_id: &str, name: &str, location: &str, rooms: i64) -> Result<()> {
        if self.store.contains(hotel_id) {
            return Err(ReservationError::already_exists(EntityKind::Hotel, hotel_id));
        }
        let rooms = u32::try_from(rooms).map_err(|_| ReservationError::InvalidRooms(rooms))?;

        self.store.insert(Hotel::new(hotel_id, name, location, rooms));
        self.store.save()?;

        info!(hotel_id, rooms, "hotel created");
        Ok(())
    }

    /// Removes the hotel regardless of any rooms it still holds.
    pub fn delete(&mut self, hotel_id: &str) -> Result<()> {
        let hotel = self
            .store
            .remove(hotel_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Hotel, hotel_id))?;
        self.store.save()?;

        info!(hotel_id, outstanding = hotel.reservations.len(), "hotel deleted");
        Ok(())
    }

    /// Applies the supplied fields. A new room count below the number of
    /// rooms currently reserved is rejected before anything changes.
    pub fn modify(&mut self, hotel_id: &str, update: HotelUpdate) -> Result<()> {
        let hotel = self
            .store
            .get_mut(hotel_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Hotel, hotel_id))?;

        let rooms = match update.rooms {
            Patch::Keep => None,
            Patch::Set(requested) => {
                if requested < hotel.reserved() as i64 {
                    return Err(ReservationError::RoomsBelowReserved {
                        hotel_id: hotel_id.to_string(),
                        requested,
                        reserved: hotel.reserved(),
                    });
                }
                let rooms = u32::try_from(requested)
                    .map_err(|_| ReservationError::InvalidRooms(requested))?;
                Some(rooms)
            }
        };

        update.name.apply(&mut hotel.name);
        update.location.apply(&mut hotel.location);
        if let Some(rooms) = rooms {
            let delta = i64::from(rooms) - i64::from(hotel.rooms);
            // cannot go negative: rooms >= reserved and the invariant held before
            hotel.available_rooms = (i64::from(hotel.available_rooms) + delta) as u32;
            hotel.rooms = rooms;
        }
        self.store.save()?;

        info!(hotel_id, "hotel modified");
        Ok(())
    }

    /// Holds one room at `hotel_id` for `reservation_id`.
    pub fn reserve_room(&mut self, hotel_id: &str, reservation_id: &str) -> Result<()> {
        let hotel = self
            .store
            .get_mut(hotel_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Hotel, hotel_id))?;

        hotel.reserve(reservation_id)?;
        let available = hotel.available_rooms;
        self.store.save()?;

        debug!(hotel_id, reservation_id, available, "room reserved");
        Ok(())
    }

    /// Releases the room held at `hotel_id` for `reservation_id`.
    pub fn cancel_reservation(&mut self, hotel_id: &str, reservation_id: &str) -> Result<()> {
        let hotel = self
            .store
            .get_mut(hotel_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Hotel, hotel_id))?;

        hotel.release(reservation_id)?;
        let available = hotel.available_rooms;
        self.store.save()?;

        debug!(hotel_id, reservation_id, available, "room released");
        Ok(())
    }

    pub fn get(&self, hotel_id: &str) -> Option<&Hotel> {
        self.store.get(hotel_id)
    }

    pub fn display(&self, hotel_id: &str) -> Result<&Hotel> {
        let hotel = self
            .get(hotel_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Hotel, hotel_id))?;
        info!(
            hotel_id,
            name = %hotel.name,
            rooms = hotel.rooms,
            available = hotel.available_rooms,
            "hotel details"
        );
        Ok(hotel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hotel> {
        self.store.iter()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn reload(&mut self) {
        self.store.reload();
    }
}
