//! The `hash` command.

use anyhow::Context;

/// Prompts for a password on stdin and prints its bcrypt hash.
pub fn run_hash() -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Enter Password: ")
        .context("cannot read password from stdin")?;
    let hashed = bcrypt::hash(password.as_bytes(), bcrypt::DEFAULT_COST)
        .context("cannot hash password")?;
    println!("{hashed}");
    Ok(())
}
