pub mod in_flight;
pub mod leads;
