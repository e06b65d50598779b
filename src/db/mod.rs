pub mod db;
pub mod goaldb;
pub mod jobdb;
pub mod notificationdb;
pub mod paymentdb;
pub mod userdb;
