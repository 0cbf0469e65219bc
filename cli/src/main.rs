// Copyright (c) 2026 txcraft contributors. MIT License.
// See LICENSE for details.

//! # txcraft
//!
//! Entry point for the `txcraft` binary. Parses CLI arguments, initializes
//! logging and dispatches to the transaction commands:
//!
//! - `transaction create` — build and optionally sign a transaction
//! - `transaction decode` — hex → structured JSON
//! - `transaction sign`   — append a signature to an encoded transaction
//!
//! Output goes to stdout only once a complete record exists; logs and
//! prompts go to stderr.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value as Json;

use txcraft_protocol::assembler::{
    CreateError, CreateOptions, Mode, OutputFormat, Sources, TransactionAssembler,
};
use txcraft_protocol::prompt::TerminalPrompter;

use cli::{Commands, NodeArgs, OutputArgs, TransactionCommand, TxcraftCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TxcraftCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Transaction(TransactionCommand::Create(args)) => create(args).await,
        Commands::Transaction(TransactionCommand::Decode(args)) => decode(args).await,
        Commands::Transaction(TransactionCommand::Sign(args)) => sign(args).await,
    }
}

async fn create(args: cli::CreateArgs) -> Result<()> {
    let opts = CreateOptions {
        module_id: args.module_id,
        asset_id: args.asset_id,
        fee: args.fee,
        offline: args.node.offline,
        data_path: args.node.data_path,
        network_identifier: args.network_identifier,
        nonce: args.nonce,
        asset: args.asset,
        sender_public_key: args.sender_public_key,
        no_signature: args.no_signature,
        passphrase: args.passphrase,
        format: output_format(&args.output),
    };
    tracing::debug!(?opts, "create");

    let assembled = TransactionAssembler::create(&opts, &mut TerminalPrompter)
        .await
        .context("failed to create transaction")?;
    print_json(&assembled.render(opts.format)?, args.output.pretty)
}

async fn decode(args: cli::DecodeArgs) -> Result<()> {
    let assembler = TransactionAssembler::new(sources_for(&args.node)?);
    let json = assembler
        .decode(&args.transaction)
        .await
        .context("failed to decode transaction")?;
    print_json(&json, args.pretty)
}

async fn sign(args: cli::SignArgs) -> Result<()> {
    let assembler = TransactionAssembler::new(sources_for(&args.node)?);
    let signed = assembler
        .sign(
            &args.transaction,
            args.network_identifier.as_deref(),
            args.passphrase,
            &mut TerminalPrompter,
        )
        .await
        .context("failed to sign transaction")?;
    print_json(&signed.render(output_format(&args.output))?, args.output.pretty)
}

/// Chooses offline or node-backed sources for `decode` and `sign`.
fn sources_for(node: &NodeArgs) -> Result<Sources> {
    if node.offline {
        if node.data_path.is_some() {
            return Err(CreateError::DataPathNotAllowedOffline.into());
        }
        return Ok(Sources::offline());
    }
    let mode = Mode::Online {
        data_path: node.data_path.clone(),
    };
    Ok(mode.sources()?)
}

fn output_format(output: &OutputArgs) -> OutputFormat {
    if output.json {
        OutputFormat::Json
    } else {
        OutputFormat::Hex
    }
}

fn print_json(value: &Json, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
