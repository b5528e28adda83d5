use std::{fmt, path::PathBuf};

use thiserror::Error;

// The three kinds of record the system manages, used to label errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Hotel,
    Customer,
    Reservation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Hotel => "hotel",
            EntityKind::Customer => "customer",
            EntityKind::Reservation => "reservation",
        };
        f.write_str(name)
    }
}

// Errors raised while reading or writing a backing file
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{}' does not contain an object keyed by id", path.display())]
    NotAnObject { path: PathBuf },

    #[error("record '{id}' in '{}' could not be loaded: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        id: String,
        reason: String,
    },
}

// Errors returned by the managers and the reservation system
#[derive(Error, Debug)]
pub enum ReservationError {
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    #[error("{kind} '{id}' does not exist")]
    NotFound { kind: EntityKind, id: String },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("room count must be a non-negative integer, got {0}")]
    InvalidRooms(i64),

    #[error("hotel '{hotel_id}' has {reserved} reserved rooms, cannot shrink to {requested}")]
    RoomsBelowReserved {
        hotel_id: String,
        requested: i64,
        reserved: usize,
    },

    #[error("no rooms available at hotel '{0}'")]
    NoRoomsAvailable(String),

    #[error("reservation '{reservation_id}' is already booked at hotel '{hotel_id}'")]
    AlreadyBooked {
        hotel_id: String,
        reservation_id: String,
    },

    #[error("reservation '{reservation_id}' is not booked at hotel '{hotel_id}'")]
    NotBooked {
        hotel_id: String,
        reservation_id: String,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange { check_in: String, check_out: String },

    #[error("reservation '{0}' is already cancelled")]
    AlreadyCancelled(String),

    #[error("failed to persist changes: {0}")]
    Persistence(#[from] StoreError),
}

impl ReservationError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        ReservationError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(kind: EntityKind, id: &str) -> Self {
        ReservationError::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }

    // True when the in-memory state may have diverged from the backing file
    pub fn is_persistence(&self) -> bool {
        matches!(self, ReservationError::Persistence(_))
    }
}

pub type Result<T> = std::result::Result<T, ReservationError>;
