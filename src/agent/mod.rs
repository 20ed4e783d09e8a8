//! Field-device side of the SOS system: location capture, the cancellable
//! submission countdown, and the responder feed poller.

pub mod feed;
pub mod location;
pub mod submission;

pub use feed::AlertFeed;
pub use location::{FixedLocationProvider, LocationError, LocationProvider, ResolvedLocation};
pub use submission::{CountdownHandle, CountdownOutcome, FlowState, SubmissionError, SubmissionFlow};
