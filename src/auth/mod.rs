pub mod login;
pub mod password;

pub use login::{login, Credentials};
pub use password::{addslashes, Password, PasswordHasher};
