/*!
 * sysprops - print the host properties reported to managed code
 */

use clap::Parser;
use serde_json::{json, Value};
use std::error::Error;
use tracing::info;

use system_natives::natives::property_list;
use system_natives::{init_tracing, BridgeConfig, EnvironmentTable, HostInfo};

/// Print the host properties reported to managed code
#[derive(Debug, Parser)]
#[command(name = "sysprops", version, about)]
struct Args {
    /// Also list the environment table with entry indices
    #[arg(long)]
    env: bool,

    /// Emit a JSON document instead of key=value lines
    #[arg(long)]
    json: bool,
}

/// JSON document with properties as an ordered array of key/value objects
fn json_document(properties: &[(String, String)], environment: Option<&EnvironmentTable>) -> Value {
    let properties: Vec<Value> = properties
        .iter()
        .map(|(key, value)| json!({ "key": key, "value": value }))
        .collect();

    let mut doc = json!({ "properties": properties });
    if let Some(table) = environment {
        let entries: Vec<Value> = table
            .iter()
            .map(|entry| Value::String(entry.to_string_lossy().into_owned()))
            .collect();
        doc["environment"] = Value::Array(entries);
    }
    doc
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let config = BridgeConfig::from_env();
    let host = HostInfo::query()?;
    let properties = property_list(&host, &config);
    info!(count = properties.len(), "host properties collected");

    let environment = args.env.then(EnvironmentTable::capture);

    if args.json {
        let doc = json_document(&properties, environment.as_ref());
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    for (key, value) in &properties {
        println!("{}={}", key, value);
    }
    if let Some(table) = &environment {
        println!();
        for (index, entry) in table.iter().enumerate() {
            println!("[{}] {}", index, entry.to_string_lossy());
        }
    }
    Ok(())
}
