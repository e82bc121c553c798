use std::error::Error;
use std::process;

use classic_api_client::cli::{Cli, Command};
use classic_api_client::client::ClassicApiHttpClient;
use classic_api_client::config::ClientConfig;
use classic_api_client::jwt::assertion::AssertionSigner;
use classic_api_client::jwt::verifier::AssertionVerifier;
use classic_api_client::logging::Logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // init logging singleton
    Logging::try_init()?;

    let cli = Cli::init();

    let config = ClientConfig::load(&cli.config_path()).map_err(|err| {
        error!("could not load the configuration: {err}");
        err
    })?;
    let client = ClassicApiHttpClient::from_config(&config);

    let output = match cli.command().clone() {
        Command::Token { member, verify } => {
            if verify {
                verify_assertion(&config, &member)?;
            }
            let client = client.clone();
            tokio::task::spawn_blocking(move || client.get_access_token_only(&member)).await?
        }
        Command::Get {
            member,
            path,
            params,
        } => client.classic_api_get(&member, &path, &params).await,
        Command::Post { member, path, body } => {
            client.classic_api_post(&member, &path, &body).await
        }
    };

    match output {
        Some(output) => {
            println!("{output}");
            Ok(())
        }
        None => {
            error!("the request did not succeed, check the logs above for details");
            process::exit(1);
        }
    }
}

/// Signs an assertion for the member and checks it with the configured public key.
fn verify_assertion(config: &ClientConfig, member: &str) -> Result<(), Box<dyn Error>> {
    let public_key = config
        .public_key
        .as_ref()
        .ok_or("no public key configured to verify the assertion")?;
    let verifier = AssertionVerifier::try_new(
        public_key.as_bytes(),
        config.algorithm,
        &config.issuer,
        &config.token_url(),
    )?;

    let assertion = AssertionSigner::from_config(config).sign_assertion(member);
    let claims = verifier.verify(&assertion)?;
    info!(?claims, "assertion verified");
    Ok(())
}
