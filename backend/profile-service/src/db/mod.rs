mod profiles;

pub use profiles::ProfileRepo;
