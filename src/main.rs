//! SHREWTRACE CLI - query a Metashrew/Sandshrew indexer for alkanes traces
//!
//! Every library operation is reachable from here: plain RPC calls, the
//! outpoint encoders, single-strategy traces, the fallback probe and
//! multicall batches.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;

use shrewtrace::codec::{OutpointEncoder, OutpointEncoding};
use shrewtrace::config::{self, ClientConfig, ENDPOINT_ALIASES};
use shrewtrace::dump::write_dump;
use shrewtrace::probe::{TraceProbe, DEFAULT_STRATEGIES};
use shrewtrace::rpc::methods::{TraceStrategy, LATEST};
use shrewtrace::rpc::{IndexerMethods, JsonRpcCaller, Multicall, RpcClient};
use shrewtrace::{reverse_hex, Outpoint};

/// Main CLI arguments
#[derive(Parser)]
#[command(name = "shrewtrace")]
#[command(about = "SHREWTRACE - alkanes trace client for Metashrew/Sandshrew indexers")]
#[command(version)]
struct Args {
    /// Endpoint alias (local, production) or URL; overrides METASHREW_API_URL
    #[arg(short = 'e', long)]
    endpoint: Option<String>,

    /// Config file (defaults to <config dir>/shrewtrace/config.json when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write each result as JSON into this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    raw: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// List the endpoint aliases and the resolved configuration
    Endpoints,
    /// Indexer height (metashrew_height)
    Height,
    /// Bitcoin block count (btc_getblockcount)
    BlockCount,
    /// Block hash at a height
    BlockHash {
        height: u64,
    },
    /// Block by hash or height
    Block {
        /// Block hash, or a height to look up first
        block: String,
        /// 0 raw hex, 1 json, 2 json with transactions
        #[arg(long, default_value = "1")]
        verbosity: u8,
    },
    /// Transaction by txid
    Tx {
        txid: String,
        /// Decode the transaction instead of returning hex
        #[arg(short = 'v', long)]
        verbose: bool,
    },
    /// Arbitrary JSON-RPC call
    Call {
        method: String,
        /// JSON array of params
        #[arg(default_value = "[]")]
        params: String,
    },
    /// Evaluate a metashrew view function
    View {
        view: String,
        /// 0x-prefixed hex input
        input: String,
        #[arg(long, default_value = LATEST)]
        block_tag: String,
    },
    /// Show an outpoint in one or all encodings
    Encode {
        /// Outpoint as <txid>:<vout>
        outpoint: String,
        /// json, binary, protobuf or display; all when omitted
        #[arg(long)]
        encoding: Option<String>,
    },
    /// Reverse the byte order of a hex string
    Reverse {
        hex: String,
    },
    /// Trace an outpoint with one request shape
    Trace {
        /// Outpoint as <txid>:<vout>
        outpoint: String,
        /// object, param:<encoding> or view:<encoding>
        #[arg(short = 's', long, default_value = "object")]
        strategy: String,
    },
    /// Trace a block
    TraceBlock {
        height: u64,
        /// Use the traceblock view instead of alkanes_traceblock
        #[arg(long)]
        view: bool,
    },
    /// Try trace request shapes in order until one returns data
    Probe {
        /// Outpoint as <txid>:<vout>
        outpoint: String,
        /// Strategies in priority order (repeatable); the default list when omitted
        #[arg(short = 's', long = "strategy")]
        strategies: Vec<String>,
    },
    /// Send several calls as one sandshrew_multicall request
    Multicall {
        /// JSON array of [method, params] pairs
        calls: String,
    },
}

/// Print a value and optionally dump it
struct Output {
    raw: bool,
    dump_dir: Option<PathBuf>,
}

impl Output {
    fn emit<T: Serialize>(&self, label: &str, value: &T) -> Result<()> {
        let text = if self.raw {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        println!("{}", text);

        if let Some(dir) = &self.dump_dir {
            write_dump(dir, label, value).context("Failed to write dump")?;
        }
        Ok(())
    }
}

fn parse_json_array(input: &str, what: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(input).with_context(|| format!("{} must be JSON", what))? {
        Value::Array(items) => Ok(items),
        other => Err(anyhow!("{} must be a JSON array, got {}", what, other)),
    }
}

fn parse_multicall(input: &str) -> Result<Multicall> {
    let mut batch = Multicall::new();
    for (i, entry) in parse_json_array(input, "calls")?.into_iter().enumerate() {
        let pair: (String, Vec<Value>) = serde_json::from_value(entry)
            .with_context(|| format!("call {} must be [method, [params...]]", i))?;
        batch.push(&pair.0, pair.1);
    }
    Ok(batch)
}

/// Config file, flags and environment, in that order of precedence
fn resolve_client_config(args: &Args) -> Result<ClientConfig> {
    let file_config = config::load_optional_file_config(args.config.as_deref())?;
    let client_config = ClientConfig::resolve(args.endpoint.as_deref(), args.timeout, file_config.as_ref())?;
    info!("Using endpoint {}", client_config.endpoint);
    Ok(client_config)
}

/// Run a command that never touches the network. Returns `false` for the
/// commands that need an RPC client.
fn run_offline(args: &Args, out: &mut impl Write) -> Result<bool> {
    match &args.command {
        Commands::Endpoints => {
            let client_config = resolve_client_config(args)?;
            for (alias, url) in ENDPOINT_ALIASES {
                writeln!(out, "{:<12} {}", alias, url)?;
            }
            writeln!(out, "{:<12} {}", "active", client_config.endpoint)?;
            if client_config.project_id.is_some() {
                writeln!(out, "{:<12} set (not sent)", "project id")?;
            }
        }
        Commands::Encode { outpoint, encoding } => {
            let outpoint: Outpoint = outpoint.parse()?;
            let encodings = match encoding {
                Some(name) => vec![name.parse::<OutpointEncoding>()?],
                None => OutpointEncoding::ALL.to_vec(),
            };
            for encoding in encodings {
                writeln!(out, "{:<9} {}", encoding.name(), encoding.wire_form(&outpoint))?;
            }
        }
        Commands::Reverse { hex } => {
            writeln!(out, "{}", reverse_hex(hex)?)?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let output = Output {
        raw: args.raw,
        dump_dir: args.dump_dir.clone(),
    };

    if run_offline(&args, &mut io::stdout().lock())? {
        return Ok(());
    }

    let client_config = resolve_client_config(&args)?;
    let rpc_client = RpcClient::new(client_config).context("Failed to create RPC client")?;

    match args.command {
        Commands::Endpoints | Commands::Encode { .. } | Commands::Reverse { .. } => {}
        Commands::Height => {
            let height = rpc_client.metashrew_height().await?;
            println!("{}", height);
        }
        Commands::BlockCount => {
            let count = rpc_client.btc_getblockcount().await?;
            println!("{}", count);
        }
        Commands::BlockHash { height } => {
            let hash = rpc_client.getblockhash(height).await?;
            println!("{}", hash);
        }
        Commands::Block { block, verbosity } => {
            let hash = match block.parse::<u64>() {
                Ok(height) => rpc_client.getblockhash(height).await?,
                Err(_) => block,
            };
            let result = rpc_client.getblock(&hash, verbosity).await?;
            output.emit(&format!("block-{}", hash), &result)?;
        }
        Commands::Tx { txid, verbose } => {
            let result = rpc_client.getrawtransaction(&txid, verbose).await?;
            output.emit(&format!("tx-{}", txid), &result)?;
        }
        Commands::Call { method, params } => {
            let params = parse_json_array(&params, "params")?;
            let result = rpc_client.call(&method, params).await?;
            output.emit(&method, &result)?;
        }
        Commands::View { view, input, block_tag } => {
            let result = rpc_client.metashrew_view(&view, &input, &block_tag).await?;
            output.emit(&format!("view-{}", view), &result)?;
        }
        Commands::Trace { outpoint, strategy } => {
            let outpoint: Outpoint = outpoint.parse()?;
            let strategy: TraceStrategy = strategy.parse()?;
            let outcome = rpc_client.trace_outpoint(&outpoint, strategy).await?;
            info!("{} via {}: {}", outpoint, strategy, outcome);
            output.emit(&format!("trace-{}", outpoint), &outcome)?;
        }
        Commands::TraceBlock { height, view } => {
            let outcome = if view {
                rpc_client.trace_block_view(height).await?
            } else {
                rpc_client.alkanes_traceblock(height).await?
            };
            info!("Block {}: {}", height, outcome);
            output.emit(&format!("traceblock-{}", height), &outcome)?;
        }
        Commands::Probe { outpoint, strategies } => {
            let outpoint: Outpoint = outpoint.parse()?;
            let strategies = if strategies.is_empty() {
                DEFAULT_STRATEGIES.to_vec()
            } else {
                strategies
                    .iter()
                    .map(|s| s.parse::<TraceStrategy>())
                    .collect::<shrewtrace::Result<Vec<_>>>()?
            };
            let report = TraceProbe::new(strategies).run(&rpc_client, &outpoint).await;
            output.emit(&format!("probe-{}", outpoint), &report)?;
            if report.all_failed() {
                return Err(anyhow!("every trace strategy failed for {}", outpoint));
            }
        }
        Commands::Multicall { calls } => {
            let batch = parse_multicall(&calls)?;
            let outcomes = rpc_client.multicall(&batch).await?;
            let rendered: Vec<Value> = batch
                .methods()
                .zip(outcomes)
                .map(|(method, outcome)| match outcome {
                    Ok(result) => serde_json::json!({ "method": method, "result": result }),
                    Err(e) => serde_json::json!({ "method": method, "error": e.to_string() }),
                })
                .collect();
            output.emit("multicall", &rendered)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multicall() {
        let batch = parse_multicall(r#"[["metashrew_height", []], ["getblockhash", [1]]]"#).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.methods().collect::<Vec<_>>(), vec!["metashrew_height", "getblockhash"]);
        assert!(parse_multicall(r#"[["metashrew_height"]]"#).is_err());
        assert!(parse_multicall(r#"{"method": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_json_array() {
        assert_eq!(parse_json_array("[1, \"a\"]", "params").unwrap().len(), 2);
        assert!(parse_json_array("1", "params").is_err());
        assert!(parse_json_array("[", "params").is_err());
    }

    const MISSING_CONFIG: &str = "/nonexistent/shrewtrace/config.json";

    #[test]
    fn test_offline_commands_skip_config() {
        let args = Args::try_parse_from(["shrewtrace", "--config", MISSING_CONFIG, "reverse", "abcd"]).unwrap();
        let mut out = Vec::new();
        assert!(run_offline(&args, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "cdab\n");

        let args = Args::try_parse_from([
            "shrewtrace",
            "--config",
            MISSING_CONFIG,
            "encode",
            "9a222f0e9e176e5a70c95dbbe59afce6607bb5a50c7ef96ea91fa49f8f14525e:1",
            "--encoding",
            "display",
        ])
        .unwrap();
        let mut out = Vec::new();
        assert!(run_offline(&args, &mut out).unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "display   9a222f0e9e176e5a70c95dbbe59afce6607bb5a50c7ef96ea91fa49f8f14525e:1\n"
        );
    }

    #[test]
    fn test_endpoints_reads_config() {
        let args = Args::try_parse_from(["shrewtrace", "--config", MISSING_CONFIG, "endpoints"]).unwrap();
        assert!(run_offline(&args, &mut Vec::new()).is_err());

        let args = Args::try_parse_from(["shrewtrace", "--config", MISSING_CONFIG, "height"]).unwrap();
        let mut out = Vec::new();
        assert!(!run_offline(&args, &mut out).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn test_cli_parses() {
        let args = Args::try_parse_from([
            "shrewtrace",
            "--endpoint",
            "local",
            "probe",
            "9a222f0e9e176e5a70c95dbbe59afce6607bb5a50c7ef96ea91fa49f8f14525e:1",
            "-s",
            "object",
            "-s",
            "view:binary",
        ])
        .unwrap();
        assert_eq!(args.endpoint.as_deref(), Some("local"));
        match args.command {
            Commands::Probe { strategies, .. } => assert_eq!(strategies, vec!["object", "view:binary"]),
            _ => panic!("expected probe command"),
        }
    }
}
