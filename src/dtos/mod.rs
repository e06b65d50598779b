pub mod jobdtos;
pub mod paymentdtos;
