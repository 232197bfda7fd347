pub mod availability;
pub mod booking;

pub use availability::AvailabilityChecker;
pub use booking::AppointmentBookingService;
