//! Decode command - Turn a captured payload into JSON
//!
//! # Usage
//!
//! ```bash
//! cslens decode body.bin                        # combined JSON array
//! cslens decode body.bin --records              # one line per record
//! cslens decode body.gz --content-encoding gzip
//! cat body.bin | cslens decode - --compact
//! ```
//!
//! A payload that decodes only partway still prints the records before the
//! fault and exits zero; unsupported encodings and broken compressed streams
//! exit non-zero.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use cslens_config::Config;
use cslens_protocol::{DecodeOutput, PayloadDecoder, RawInput};
use tracing::warn;

/// Decode command arguments
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Payload file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Content-Encoding of the payload (gzip, deflate)
    #[arg(short = 'e', long)]
    pub content_encoding: Option<String>,

    /// Content-Type of the payload
    #[arg(short = 't', long)]
    pub content_type: Option<String>,

    /// Client identifier recorded in logs
    #[arg(long)]
    pub client_id: Option<String>,

    /// Print the combined array without whitespace
    #[arg(long)]
    pub compact: bool,

    /// Pretty-print indent width. Overrides config file.
    #[arg(long)]
    pub indent: Option<usize>,

    /// Print one compact line per record instead of the combined array
    #[arg(long)]
    pub records: bool,
}

/// Run the decode command
pub fn run(args: DecodeArgs, mut config: Config) -> Result<()> {
    apply_overrides(&args, &mut config)?;

    let body = read_input(&args.input)?;
    let input = build_input(&args, body);

    let decoder = PayloadDecoder::new(config.decoder.to_options());
    let output = decoder
        .decode(&input)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    for warning in &output.warnings {
        warn!(%warning, "decode warning");
    }
    if let Some(e) = output.stop.error() {
        warn!(
            records = output.records.len(),
            error = %e,
            "payload decoded partially"
        );
    }

    let mut stdout = io::stdout().lock();
    render(&output, args.records, &mut stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Fold command-line flags into the loaded config
fn apply_overrides(args: &DecodeArgs, config: &mut Config) -> Result<()> {
    if args.compact {
        config.decoder.compact = true;
    }
    if let Some(indent) = args.indent {
        config.decoder.indent = indent;
    }
    config.validate().context("invalid decoder options")?;
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut body = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut body)
            .context("failed to read payload from stdin")?;
        return Ok(body);
    }

    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn build_input(args: &DecodeArgs, body: Vec<u8>) -> RawInput {
    let mut input = RawInput::new(body);
    if let Some(encoding) = &args.content_encoding {
        input = input.with_content_encoding(encoding.as_str());
    }
    if let Some(content_type) = &args.content_type {
        input = input.with_content_type(content_type.as_str());
    }
    if let Some(client_id) = &args.client_id {
        input = input.with_client_id(client_id.as_str());
    }
    input
}

/// Write either the combined array or the inspector line view
fn render(output: &DecodeOutput, records: bool, writer: &mut impl Write) -> io::Result<()> {
    if records {
        for line in output.display_lines() {
            writeln!(writer, "{line}")?;
        }
        return Ok(());
    }

    writer.write_all(output.combined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two records named `first` and `second`, then a byte with an invalid type
    fn payload_with_bad_tail() -> Vec<u8> {
        let mut body = Vec::new();
        for name in ["first", "second"] {
            body.push((2 << 5) | 9);
            body.push(name.len() as u8);
            body.extend_from_slice(name.as_bytes());
            body.push(0);
        }
        body.push(0xFF);
        body
    }

    fn args(extra: &[&str]) -> DecodeArgs {
        #[derive(clap::Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: DecodeArgs,
        }
        let argv = ["decode", "body.bin"].into_iter().chain(extra.iter().copied());
        <Wrapper as clap::Parser>::try_parse_from(argv).unwrap().args
    }

    fn decode(args: &DecodeArgs, body: Vec<u8>) -> DecodeOutput {
        let mut config = Config::default();
        apply_overrides(args, &mut config).unwrap();
        PayloadDecoder::new(config.decoder.to_options())
            .decode(&build_input(args, body))
            .unwrap()
    }

    fn rendered(output: &DecodeOutput, records: bool) -> String {
        let mut buf = Vec::new();
        render(output, records, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_combined() {
        let args = args(&["--compact"]);
        let output = decode(&args, payload_with_bad_tail());

        let text = rendered(&output, false);
        assert!(text.ends_with('\n'));
        assert!(!text.contains("\n "));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json[0]["name"], "first");
        assert_eq!(json[1]["name"], "second");
    }

    #[test]
    fn test_render_records_appends_error_line() {
        let args = args(&["--records"]);
        let output = decode(&args, payload_with_bad_tail());

        let text = rendered(&output, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"first\""));
        assert!(lines[1].contains("\"second\""));
        assert!(lines[2].starts_with("decode error: record 2"));
    }

    #[test]
    fn test_indent_override() {
        let args = args(&["--indent", "4"]);
        let output = decode(&args, payload_with_bad_tail());

        assert!(rendered(&output, false).contains("\n    {"));
    }

    #[test]
    fn test_indent_override_is_validated() {
        let args = args(&["--indent", "40"]);
        let mut config = Config::default();
        assert!(apply_overrides(&args, &mut config).is_err());
    }

    #[test]
    fn test_unsupported_encoding_is_error() {
        let args = args(&["--content-encoding", "br"]);
        let decoder = PayloadDecoder::default();
        assert!(decoder.decode(&build_input(&args, vec![0])).is_err());
    }

    #[test]
    fn test_build_input_headers() {
        let args = args(&["-e", "gzip", "-t", "application/bond-compact-binary", "--client-id", "NO_AUTH"]);
        let input = build_input(&args, vec![1]);

        assert_eq!(input.content_encoding, "gzip");
        assert_eq!(input.content_type, "application/bond-compact-binary");
        assert_eq!(input.client_id.as_deref(), Some("NO_AUTH"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_input(Path::new("/nonexistent/body.bin")).unwrap_err();
        assert!(err.to_string().contains("body.bin"));
    }
}
