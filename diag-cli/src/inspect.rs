use anyhow::{Context, Result, bail};
use diag_eval::{NullSink, RawValue, ResponseSpec, Verdict, classify, decode_status, parse_bytes};

pub fn run_check_response(
    request: &str,
    actual: &str,
    expected: &str,
    name: Option<&str>,
) -> Result<()> {
    let request = parse_bytes(request).context("request bytes")?;
    if request.is_empty() {
        bail!("request must contain at least one byte");
    }
    let actual = parse_bytes(actual).context("actual bytes")?;
    let spec = ResponseSpec::parse(expected);

    let verdict = classify(name, &request, &actual, &spec, &mut NullSink)?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if verdict.result == Verdict::Fail {
        bail!(
            "response check failed: {}",
            verdict.reason.as_deref().unwrap_or("no reason given")
        );
    }
    Ok(())
}

pub fn run_decode_status(value: &str) -> Result<()> {
    let status = decode_status(&RawValue::from(value))
        .with_context(|| format!("decoding status '{value}'"))?;

    println!("Status:      {status}");
    for (name, flag) in status.flags() {
        let shown = match flag {
            Some(true) => "1",
            Some(false) => "0",
            None => "*",
        };
        println!("  {name:<36} {shown}");
    }
    Ok(())
}
