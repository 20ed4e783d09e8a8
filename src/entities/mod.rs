pub mod emergency_contact;
pub mod news_post;
pub mod sos_alert;

pub use emergency_contact::Entity as EmergencyContact;
pub use news_post::Entity as NewsPost;
pub use sos_alert::Entity as SosAlerts;

pub mod prelude;
