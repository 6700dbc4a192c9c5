//! Operator CLI for the passport token core.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use passport::config::CacheDriver;
use passport::{
    AuthConfig, Passport, PrincipalClaims, SharedConfig, TokenIssuer, TokenKind, TokenVerifier,
    VerifyOptions,
};
use passport_common::{init_tracing, TracingConfig};
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(name = "passport")]
#[command(about = "Issue, inspect and revoke passport tokens")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "PASSPORT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "PASSPORT_LOG_JSON")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue an access/refresh token pair
    Issue(IssueArgs),
    /// Verify a token and print its claims
    Inspect(InspectArgs),
    /// Revoke a refresh token until it expires
    Logout(LogoutArgs),
}

#[derive(Args)]
struct IssueArgs {
    /// Principal claim as key=value, repeatable
    #[arg(short, long = "claim", value_parser = parse_claim)]
    claims: Vec<(String, String)>,
}

#[derive(Args)]
struct InspectArgs {
    /// Token to inspect
    token: String,
    /// Treat the token as a refresh token
    #[arg(long)]
    refresh: bool,
    /// Skip signature verification
    #[arg(long)]
    no_verify: bool,
}

#[derive(Args)]
struct LogoutArgs {
    /// Refresh token to revoke
    #[arg(long, env = "PASSPORT_REFRESH_TOKEN")]
    refresh_token: String,
}

fn parse_claim(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::default().with_log_level(cli.log_level.clone());
    if cli.json_logs {
        tracing_config = tracing_config.with_json_output();
    }
    init_tracing(&tracing_config);

    let config = AuthConfig::from_env().context("loading configuration")?;

    match cli.command {
        Commands::Issue(args) => issue(config, args)?,
        Commands::Inspect(args) => inspect(config, &args)?,
        Commands::Logout(args) => logout(config, &args).await?,
    }

    Ok(())
}

fn issue(config: AuthConfig, args: IssueArgs) -> Result<()> {
    if args.claims.is_empty() {
        bail!("at least one --claim is required");
    }

    let issuer = TokenIssuer::with_system_clock(SharedConfig::new(config)?);
    let principal: PrincipalClaims = args.claims.into_iter().collect();
    let pair = issuer.issue_pair(&principal)?;

    println!("{}", serde_json::to_string_pretty(&pair)?);
    Ok(())
}

fn inspect(config: AuthConfig, args: &InspectArgs) -> Result<()> {
    let verifier = TokenVerifier::with_system_clock(SharedConfig::new(config)?);
    let kind = if args.refresh {
        TokenKind::Refresh
    } else {
        TokenKind::Access
    };
    let options = VerifyOptions {
        verify_signature: !args.no_verify,
    };

    let verified = verifier
        .verify_with(&args.token, kind, options)
        .with_context(|| format!("{kind} token rejected"))?;

    let output = json!({
        "kind": kind.as_str(),
        "signature_verified": verified.signature_verified(),
        "jti": verified.claims().jti,
        "issued_at": verified.issued_at(),
        "expires_at": verified.expires_at_utc().map(|t| t.to_rfc3339()),
        "claims": verified.custom_claims(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// A revocation written to the in-process store vanishes when the CLI exits.
fn require_shared_store(config: &AuthConfig) -> Result<()> {
    if config.cache.driver == CacheDriver::Memory {
        bail!("logout needs a shared revocation store, set PASSPORT_CACHE_DRIVER=redis");
    }
    Ok(())
}

async fn logout(config: AuthConfig, args: &LogoutArgs) -> Result<()> {
    require_shared_store(&config)?;
    let passport = Passport::from_config(config).await?;
    passport
        .logout(&args.refresh_token)
        .await
        .context("revoking refresh token")?;

    info!("Refresh token revoked");
    println!("revoked");
    Ok(())
}
