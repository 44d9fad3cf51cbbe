pub mod any_date;
pub mod date_period;
