//! Login, registration, and the stored credential.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password};
use ragline_core::{
    ApiClient, CredentialStore, LoginRequest, RaglineConfig, RegisterRequest, StoredCredentials,
};

use super::{notice_ok, print_json, unauthed_client};

pub async fn register(config: &RaglineConfig, store: &CredentialStore) -> Result<()> {
    let client = unauthed_client(config)?;

    let email: String = Input::new().with_prompt("email").interact_text()?;
    let first_name: String = Input::new()
        .with_prompt("first name")
        .allow_empty(true)
        .interact_text()?;
    let last_name: String = Input::new()
        .with_prompt("last name")
        .allow_empty(true)
        .interact_text()?;
    let password = Password::new()
        .with_prompt("password")
        .with_confirmation("confirm password", "passwords do not match")
        .interact()?;

    let session = client
        .register(&RegisterRequest {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;

    let email = session.email.clone();
    store.save(&StoredCredentials::from(session))?;
    notice_ok(&format!("account created; logged in as {email}"));
    Ok(())
}

pub async fn login(
    config: &RaglineConfig,
    store: &CredentialStore,
    email: Option<String>,
) -> Result<()> {
    let client = unauthed_client(config)?;

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("email").interact_text()?,
    };
    let password = Password::new().with_prompt("password").interact()?;

    let session = client.login(&LoginRequest { email, password }).await?;

    let email = session.email.clone();
    store.save(&StoredCredentials::from(session))?;
    notice_ok(&format!("logged in as {email}"));
    Ok(())
}

pub fn logout(store: &CredentialStore) -> Result<()> {
    store.clear()?;
    notice_ok("logged out");
    Ok(())
}

pub async fn whoami(client: &ApiClient, json: bool) -> Result<()> {
    let profile = client.current_user().await?;
    if json {
        return print_json(&profile);
    }

    let name = format!("{} {}", profile.first_name, profile.last_name);
    let name = name.trim();
    if name.is_empty() {
        println!("{} (user #{})", style(&profile.email).bold(), profile.id);
    } else {
        println!(
            "{} <{}> (user #{})",
            style(name).bold(),
            profile.email,
            profile.id
        );
    }
    Ok(())
}
