pub mod consumption;
