pub mod booking;
pub mod proposal;

pub use booking::{Booking, BookingPatch, BookingStatus};
pub use proposal::{Proposal, ProposalStatus};
