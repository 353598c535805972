use std::env;

use anyhow::Result;
use iamsign_core::{Context, OsEnv};
use iamsign_http_send_reqwest::ReqwestHttpSend;
use iamsign_vault_aws::{Config, Credential, IamLogin};
use log::debug;
use log::warn;

/// Initialize the live login test against a real Vault server.
///
/// Requires `IAMSIGN_VAULT_TEST=on` plus the vault and aws settings read by
/// `Config::from_env`, and `IAMSIGN_AWS_ACCESS_KEY` / `IAMSIGN_AWS_SECRET_KEY`.
fn init_login_test() -> Option<(Context, IamLogin, Credential)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("IAMSIGN_VAULT_TEST").is_err() || env::var("IAMSIGN_VAULT_TEST").unwrap() != "on"
    {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);

    let mut cred = Credential::new(
        &env::var("IAMSIGN_AWS_ACCESS_KEY").expect("IAMSIGN_AWS_ACCESS_KEY must be set"),
        &env::var("IAMSIGN_AWS_SECRET_KEY").expect("IAMSIGN_AWS_SECRET_KEY must be set"),
    );
    cred.session_token = env::var("IAMSIGN_AWS_SESSION_TOKEN").ok();

    Some((ctx, IamLogin::new(config), cred))
}

#[tokio::test]
async fn test_live_login() -> Result<()> {
    let Some((ctx, login, cred)) = init_login_test() else {
        warn!("IAMSIGN_VAULT_TEST is not set, skipped");
        return Ok(());
    };

    let auth = login.login(&ctx, &cred).await?;
    debug!("got auth: {auth:?}");
    assert!(!auth.client_token.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_live_login_with_wrong_secret_is_denied() -> Result<()> {
    let Some((ctx, login, mut cred)) = init_login_test() else {
        warn!("IAMSIGN_VAULT_TEST is not set, skipped");
        return Ok(());
    };

    cred.secret_access_key = "not-the-right-secret".to_string();
    let err = login
        .login(&ctx, &cred)
        .await
        .expect_err("login must be rejected");
    assert!(err.is_credential_error());
    Ok(())
}
