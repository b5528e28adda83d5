use std::{fmt, path::PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{EntityKind, ReservationError, Result},
    store::{JsonStore, Record},
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Active => f.write_str("active"),
            ReservationStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

// A booking of one room at one hotel by one customer.
// The customer and hotel ids are plain references; nothing here checks that
// they exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: String,
    pub customer_id: String,
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Length of stay.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    fn cancel(&mut self) -> Result<()> {
        if self.status == ReservationStatus::Cancelled {
            return Err(ReservationError::AlreadyCancelled(self.reservation_id.clone()));
        }
        self.status = ReservationStatus::Cancelled;
        Ok(())
    }
}

impl Record for Reservation {
    const KIND: EntityKind = EntityKind::Reservation;

    fn id(&self) -> &str {
        &self.reservation_id
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reservation ID: {}", self.reservation_id)?;
        writeln!(f, "Customer ID: {}", self.customer_id)?;
        writeln!(f, "Hotel ID: {}", self.hotel_id)?;
        writeln!(f, "Check-in: {}", self.check_in.format(DATE_FORMAT))?;
        writeln!(f, "Check-out: {}", self.check_out.format(DATE_FORMAT))?;
        write!(f, "Status: {}", self.status)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ReservationError::InvalidDate(raw.to_string()))
}

/// Parses both dates and checks that check-out falls strictly after check-in.
pub fn parse_stay(check_in: &str, check_out: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(check_in)?;
    let end = parse_date(check_out)?;
    if end <= start {
        return Err(ReservationError::InvalidDateRange {
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
        });
    }
    Ok((start, end))
}

#[derive(Debug)]
pub struct ReservationManager {
    store: JsonStore<Reservation>,
}

impl ReservationManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::open(path),
        }
    }

    pub fn create(
        &mut self,
        reservation_id: &str,
        customer_id: &str,
        hotel_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<()> {
        if self.store.contains(reservation_id) {
            return Err(ReservationError::already_exists(
                EntityKind::Reservation,
                reservation_id,
            ));
        }
        let (check_in, check_out) = parse_stay(check_in, check_out)?;

        self.store.insert(Reservation {
            reservation_id: reservation_id.to_string(),
            customer_id: customer_id.to_string(),
            hotel_id: hotel_id.to_string(),
            check_in,
            check_out,
            status: ReservationStatus::Active,
        });
        self.store.save()?;

        info!(reservation_id, customer_id, hotel_id, %check_in, %check_out, "reservation created");
        Ok(())
    }

    pub fn cancel(&mut self, reservation_id: &str) -> Result<()> {
        let reservation = self.store.get_mut(reservation_id).ok_or_else(|| {
            ReservationError::not_found(EntityKind::Reservation, reservation_id)
        })?;

        reservation.cancel()?;
        self.store.save()?;

        info!(reservation_id, "reservation cancelled");
        Ok(())
    }

    pub fn get(&self, reservation_id: &str) -> Option<&Reservation> {
        self.store.get(reservation_id)
    }

    pub fn display(&self, reservation_id: &str) -> Result<&Reservation> {
        let reservation = self.get(reservation_id).ok_or_else(|| {
            ReservationError::not_found(EntityKind::Reservation, reservation_id)
        })?;
        info!(
            reservation_id,
            hotel_id = %reservation.hotel_id,
            status = %reservation.status,
            "reservation details"
        );
        Ok(reservation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TempDir;

    fn manager(dir: &TempDir) -> ReservationManager {
        ReservationManager::open(dir.join("reservations.json"))
    }

    #[test]
    fn test_create_reservation() {
        let dir = TempDir::new("rsvp-create");
        let mut reservations = manager(&dir);

        reservations
            .create("R001", "C001", "H001", "2024-06-01", "2024-06-05")
            .unwrap();

        let rsvp = reservations.get("R001").unwrap();
        assert!(rsvp.is_active());
        assert_eq!(rsvp.check_in, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(rsvp.nights(), 4);
    }

    #[test]
    fn test_create_does_not_check_references() {
        let dir = TempDir::new("rsvp-standalone");
        let mut reservations = manager(&dir);

        reservations
            .create("R001", "nobody", "nowhere", "2024-06-01", "2024-06-02")
            .unwrap();
        assert_eq!(reservations.len(), 1);
    }

    #[test]
    fn test_create_reservation_duplicate() {
        let dir = TempDir::new("rsvp-dup");
        let mut reservations = manager(&dir);

        reservations
            .create("R001", "C001", "H001", "2024-06-01", "2024-06-05")
            .unwrap();
        let err = reservations
            .create("R001", "C002", "H002", "2024-07-01", "2024-07-05")
            .unwrap_err();

        assert!(matches!(err, ReservationError::AlreadyExists { .. }));
        assert_eq!(reservations.get("R001").unwrap().customer_id, "C001");
    }

    #[test]
    fn test_date_validation() {
        let dir = TempDir::new("rsvp-dates");
        let mut reservations = manager(&dir);

        let err = reservations
            .create("R1", "C001", "H001", "2024-06-05", "2024-06-01")
            .unwrap_err();
        assert!(matches!(err, ReservationError::InvalidDateRange { .. }));

        let err = reservations
            .create("R2", "C001", "H001", "2024-06-05", "2024-06-05")
            .unwrap_err();
        assert!(matches!(err, ReservationError::InvalidDateRange { .. }));

        for (check_in, check_out) in [
            ("06/01/2024", "2024-06-05"),
            ("2024-06-01", "tomorrow"),
            ("2024-02-30", "2024-03-02"),
            ("", "2024-06-05"),
        ] {
            let err = reservations
                .create("R3", "C001", "H001", check_in, check_out)
                .unwrap_err();
            assert!(matches!(err, ReservationError::InvalidDate(_)), "{check_in} {check_out}");
        }

        assert!(reservations.is_empty());
        assert!(!dir.join("reservations.json").exists());
    }

    #[test]
    fn test_cancel_reservation() {
        let dir = TempDir::new("rsvp-cancel");
        let mut reservations = manager(&dir);
        reservations
            .create("R001", "C001", "H001", "2024-06-01", "2024-06-05")
            .unwrap();

        reservations.cancel("R001").unwrap();
        assert_eq!(
            reservations.get("R001").unwrap().status,
            ReservationStatus::Cancelled
        );

        let err = reservations.cancel("R001").unwrap_err();
        assert!(matches!(err, ReservationError::AlreadyCancelled(_)));
    }

    #[test]
    fn test_cancel_reservation_not_exists() {
        let dir = TempDir::new("rsvp-cancel-missing");
        let mut reservations = manager(&dir);

        let err = reservations.cancel("R999").unwrap_err();
        assert!(matches!(err, ReservationError::NotFound { .. }));
    }

    #[test]
    fn test_display_reservation() {
        let dir = TempDir::new("rsvp-display");
        let mut reservations = manager(&dir);
        reservations
            .create("R001", "C001", "H001", "2024-06-01", "2024-06-05")
            .unwrap();

        let text = reservations.display("R001").unwrap().to_string();
        assert!(text.contains("Check-in: 2024-06-01"));
        assert!(text.contains("Status: active"));

        assert!(reservations.display("R999").is_err());
    }

    #[test]
    fn test_persisted_layout() {
        let dir = TempDir::new("rsvp-layout");
        let mut reservations = manager(&dir);
        reservations
            .create("R001", "C001", "H001", "2024-06-01", "2024-06-05")
            .unwrap();
        reservations.cancel("R001").unwrap();

        let raw = std::fs::read_to_string(dir.join("reservations.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["R001"]["check_in"], "2024-06-01");
        assert_eq!(value["R001"]["check_out"], "2024-06-05");
        assert_eq!(value["R001"]["status"], "cancelled");

        let reopened = manager(&dir);
        assert_eq!(reopened.get("R001"), reservations.get("R001"));
    }

    #[test]
    fn test_unknown_status_loads_empty() {
        let dir = TempDir::new("rsvp-bad-status");
        std::fs::write(
            dir.join("reservations.json"),
            r#"{"R001": {
                "reservation_id": "R001", "customer_id": "C001", "hotel_id": "H001",
                "check_in": "2024-06-01", "check_out": "2024-06-05", "status": "pending"
            }}"#,
        )
        .unwrap();

        assert!(manager(&dir).is_empty());
    }
}
