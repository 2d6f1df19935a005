//! Generate the bcrypt hash for the shared upload password.
//!
//! Usage:
//!     cargo run --bin hash_password
//!
//! Put the printed value into `UPLOAD_PASSWORD_HASH` and set `SESSION_SECRET`.

use std::io::{self, Write};

fn prompt(label: &str) -> io::Result<String> {
    print!("{}\n> ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> io::Result<()> {
    println!("\nUpload password hash generator\n");

    let password = prompt("Enter the upload password:")?;
    if password.is_empty() {
        eprintln!("Error: password cannot be empty");
        std::process::exit(1);
    }

    let confirm = prompt("Confirm password:")?;
    if password != confirm {
        eprintln!("Error: passwords do not match");
        std::process::exit(1);
    }

    match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
        Ok(hash) => {
            println!("\nAdd this to your .env file:\n");
            println!("UPLOAD_PASSWORD_HASH='{}'", hash);
            println!("SESSION_SECRET='<a long random string>'\n");
        }
        Err(e) => {
            eprintln!("Error: failed to hash password: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
