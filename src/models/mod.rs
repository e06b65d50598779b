pub mod goalmodel;
pub mod jobmodel;
pub mod notificationmodel;
pub mod paymentmodel;
pub mod usermodel;
