mod users;

pub use users::UserRepo;
