//! the `tokens` subcommand - mint bearer tokens for principals.

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail};

use crate::auth::{self, PrincipalKind};

/// mint bearer tokens
#[derive(Subcommand, Debug)]
pub enum TokensCommand {
    /// issue a signed bearer token
    Issue(IssueTokenArgs),
}

/// issue a signed bearer token
#[derive(Args, Debug)]
pub struct IssueTokenArgs {
    /// principal name (username, or drone serial)
    name: String,

    /// principal kind: admin, enduser or drone
    kind: String,

    /// hs256 signing secret; must match the server's
    #[arg(long, env = "SKYCOURIER_JWT_SECRET")]
    jwt_secret: String,

    /// token lifetime in seconds
    #[arg(long, default_value_t = 86400)]
    ttl_secs: u64,
}

impl TokensCommand {
    /// run the tokens command
    pub async fn run(self) -> Result<()> {
        match self {
            TokensCommand::Issue(args) => issue_token(args),
        }
    }
}

fn issue_token(args: IssueTokenArgs) -> Result<()> {
    let Some(kind) = PrincipalKind::parse(&args.kind) else {
        bail!("kind must be one of: admin, enduser, drone");
    };

    let token = auth::sign_token(&args.jwt_secret, &args.name, kind.as_str(), args.ttl_secs)
        .context("failed to sign token")?;
    println!("{token}");
    Ok(())
}
