// Walks through a small reservation scenario against a data directory.
//
// Usage: hotel_reservations [DATA_DIR]   (default: ./data)
// Individual files can be redirected with RESERVATIONS_HOTELS_FILE,
// RESERVATIONS_CUSTOMERS_FILE and RESERVATIONS_RESERVATIONS_FILE.

use std::path::PathBuf;

use anyhow::Context;
use hotel_reservations::{HotelSync, ReservationSystem, SystemConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    let config = SystemConfig::in_dir(&data_dir).apply_env_overrides();
    let mut system = ReservationSystem::open(config);

    // Existing records from an earlier run make the create calls fail;
    // that is reported and the walk-through carries on.
    for (id, name, email, phone) in [
        ("C001", "Juan Perez", "juan@example.com", "555-0101"),
        ("C002", "Maria Garcia", "maria@example.com", "555-0102"),
    ] {
        if let Err(err) = system.create_customer(id, name, email, phone) {
            warn!(error = %err, "skipping customer");
        }
    }
    for (id, name, location, rooms) in [
        ("H001", "Hotel Plaza", "Mexico City", 20),
        ("H002", "Hotel Beach", "Cancun", 15),
    ] {
        if let Err(err) = system.create_hotel(id, name, location, rooms) {
            warn!(error = %err, "skipping hotel");
        }
    }

    println!("{}\n", system.display_hotel("H001")?);
    println!("{}\n", system.display_customer("C001")?);

    for (id, customer, hotel, check_in, check_out) in [
        ("R001", "C001", "H001", "2024-06-01", "2024-06-05"),
        ("R002", "C002", "H002", "2024-06-10", "2024-06-15"),
    ] {
        match system.create_reservation(id, customer, hotel, check_in, check_out) {
            Ok(booking) => {
                if let HotelSync::Diverged(err) = &booking.hotel_sync {
                    warn!(reservation_id = id, error = %err, "room not held");
                }
            }
            Err(err) => warn!(reservation_id = id, error = %err, "reservation not created"),
        }
    }

    println!("{}\n", system.display_hotel("H001")?);
    println!("{}\n", system.display_reservation("R001")?);

    if let Err(err) = system.cancel_reservation("R001") {
        warn!(error = %err, "cancellation failed");
    }
    println!("{}\n", system.display_hotel("H001")?);

    for problem in system.audit() {
        warn!(%problem, "inconsistent state");
    }

    info!(data_dir = %data_dir.display(), "done");
    Ok(())
}
