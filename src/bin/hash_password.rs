use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::thread_rng;
use std::env;

/// Prints an argon2 hash for seeding backoffice accounts by hand.
fn main() {
    let password = env::args()
        .nth(1)
        .expect("Usage: cargo run --bin hash_password <password>");
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hashing failed")
        .to_string();
    println!("{}", hash);
}
