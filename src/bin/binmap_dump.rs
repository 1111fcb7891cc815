//! Field dump utility
//! Maps the fields of a JSON spec file onto a binary dump and prints them

use binmap::fields::{load_spec, FieldRegistry, RegistryOptions};
use binmap::formats::{export_csv, to_json};
use binmap::AsciiMode;
use std::env;
use std::fs;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[derive(Debug, Default)]
struct Args {
    dump_file: String,
    spec_file: String,
    json: bool,
    csv_file: Option<String>,
    hexdump: bool,
    fill_unmapped: Option<Option<usize>>,
    options: RegistryOptions,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <dump.bin> <fields.json> [options]", program);
    eprintln!("\nOptions:");
    eprintln!("  --json                 Print values as a JSON object");
    eprintln!("  --csv <file>           Also write all fields to a CSV file");
    eprintln!("  --fill-unmapped [END]  Add raw fields for unmapped bits, up to bit END");
    eprintln!("  --hexdump              Print a hex dump of the whole buffer first");
    eprintln!("  --strict-ascii         Fail on non-ASCII bytes in ascii fields");
    eprintln!("  --reject-overlaps      Fail when two fields share bits");
    eprintln!("\nExample fields.json:");
    eprintln!(r#"  [{{"dt": "bool", "name": "enabled", "start": 1, "length": 1}},"#);
    eprintln!(r#"   {{"dt": "uint16", "name": "count", "start": 8, "endian": "big"}}]"#);
    std::process::exit(1);
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let program = raw.first().map(String::as_str).unwrap_or("binmap-dump");

    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = raw.iter().skip(1).peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--hexdump" => args.hexdump = true,
            "--strict-ascii" => args.options.ascii_mode = AsciiMode::Strict,
            "--reject-overlaps" => args.options.reject_overlaps = true,
            "--csv" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--csv needs a file name"))?;
                args.csv_file = Some(path.clone());
            }
            "--fill-unmapped" => {
                // Optional end bit; anything that is not a number is left
                // for the positional arguments
                let end = iter.peek().and_then(|next| next.parse::<usize>().ok());
                if end.is_some() {
                    iter.next();
                }
                args.fill_unmapped = Some(end);
            }
            "-h" | "--help" => usage(program),
            other if other.starts_with("--") => anyhow::bail!("Unknown option: {}", other),
            other => positional.push(other.to_string()),
        }
    }

    if positional.len() != 2 {
        usage(program);
    }
    args.spec_file = positional.pop().unwrap_or_default();
    args.dump_file = positional.pop().unwrap_or_default();

    Ok(args)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let raw: Vec<String> = env::args().collect();
    let args = parse_args(&raw)?;

    let data = fs::read(&args.dump_file)?;
    tracing::info!("Loaded {} bytes from {}", data.len(), args.dump_file);

    let specs = load_spec(&args.spec_file)?;
    tracing::info!("Loaded {} field specs from {}", specs.len(), args.spec_file);

    let mut registry = FieldRegistry::with_options(data, args.options);
    registry.add_from_spec(&specs)?;

    if let Some(end) = args.fill_unmapped {
        let added = registry.fill_unmapped(end)?;
        tracing::info!("Added {} unmapped regions", added);
    }

    for (a, b) in registry.overlaps() {
        tracing::warn!("Fields '{}' and '{}' overlap", a, b);
    }

    if args.hexdump {
        println!("{}", registry.buffer().printable(None, None));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&registry)?)?);
    } else {
        println!("{}", registry.render()?);
    }

    if let Some(csv_file) = &args.csv_file {
        export_csv(csv_file, &registry)?;
        tracing::info!("Wrote {} fields to {}", registry.len(), csv_file);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("binmap-dump")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_fill_unmapped_with_end() {
        let parsed = parse_args(&args(&["dump.bin", "fields.json", "--fill-unmapped", "800"])).unwrap();
        assert_eq!(parsed.fill_unmapped, Some(Some(800)));
        assert_eq!(parsed.dump_file, "dump.bin");
        assert_eq!(parsed.spec_file, "fields.json");
    }

    #[test]
    fn test_fill_unmapped_before_positionals() {
        let parsed = parse_args(&args(&["--fill-unmapped", "dump.bin", "fields.json"])).unwrap();
        assert_eq!(parsed.fill_unmapped, Some(None));
        assert_eq!(parsed.dump_file, "dump.bin");
        assert_eq!(parsed.spec_file, "fields.json");
    }

    #[test]
    fn test_options() {
        let parsed = parse_args(&args(&[
            "--json",
            "--strict-ascii",
            "dump.bin",
            "--csv",
            "out.csv",
            "fields.json",
            "--fill-unmapped",
        ]))
        .unwrap();
        assert!(parsed.json);
        assert_eq!(parsed.options.ascii_mode, AsciiMode::Strict);
        assert_eq!(parsed.csv_file.as_deref(), Some("out.csv"));
        assert_eq!(parsed.fill_unmapped, Some(None));
        assert!(parse_args(&args(&["--bogus", "a", "b"])).is_err());
    }
}
