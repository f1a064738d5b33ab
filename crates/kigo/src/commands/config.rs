//! Config command - prints the resolved configuration.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also list the registered session providers
    #[arg(long)]
    pub providers: bool,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let config = kigo_config::load_config(ctx.config_path.as_deref())?;
    print!("{}", config.to_toml()?);

    if args.providers {
        let registry = kigo_session::ProviderRegistry::with_defaults();
        println!();
        println!("# registered providers: {}", registry.names().join(", "));
    }

    Ok(())
}
