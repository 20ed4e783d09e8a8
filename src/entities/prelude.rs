pub use super::emergency_contact::Entity as EmergencyContact;
pub use super::news_post::Entity as NewsPost;
pub use super::sos_alert::Entity as SosAlerts;
