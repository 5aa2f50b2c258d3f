//! Trip lifecycle, dispatch and booking engine for FastTrack.
//!
//! Every operation takes its ids as arguments and returns the rows it produced. There is
//! no selection state in here; whatever a caller has highlighted on screen arrives as a
//! `TripId` or `DriverId`.
//!
//! - [`TripLifecycle`] owns every status transition and its effect on the driver's
//!   availability flag.
//! - [`DispatchService`] serves the two operator views and binds one selected trip to
//!   one selected driver.
//! - [`BookingService`] creates a trip together with the payment that funds it.
//! - [`Registry`] manages customers and drivers and serves the trip listings.
//!
//! All services share one [`fasttrack_store::Store`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod booking;
pub mod dispatch;
pub mod lifecycle;
pub mod registry;

use std::sync::Arc;

use fasttrack_store::Store;

pub use booking::{Booking, BookingService};
pub use dispatch::{Assignment, DispatchService};
pub use lifecycle::TripLifecycle;
pub use registry::Registry;

/// All engine services over one store.
#[derive(Clone)]
pub struct Engine {
    /// Status transitions.
    pub lifecycle: TripLifecycle,
    /// Operator dispatch.
    pub dispatch: DispatchService,
    /// Booking and payments.
    pub booking: BookingService,
    /// Customer and driver administration.
    pub registry: Registry,
}

impl Engine {
    /// Build every service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        let lifecycle = TripLifecycle::new(Arc::clone(&store));
        Self {
            dispatch: DispatchService::new(Arc::clone(&store), lifecycle.clone()),
            booking: BookingService::new(Arc::clone(&store)),
            registry: Registry::new(store),
            lifecycle,
        }
    }
}
