//! JSON line I/O for the CLI
//!
//! - Input: one JSON request object per line
//! - Output: one JSON response object per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Read request lines, skipping blank ones
pub fn read_lines<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|line| line.map_err(Into::into))
}

/// Write a success response
pub fn write_response<W: Write>(output: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *output, &response)?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error<W: Write>(output: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *output, &response)?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_read_lines_skips_blank() {
        let input = Cursor::new("{\"op\":\"metrics\"}\n\n   \n{\"op\":\"metrics\"}\n");
        let lines: Vec<String> = read_lines(input).map(Result::unwrap).collect();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_write_response_shape() {
        let mut buffer = Vec::new();
        write_response(&mut buffer, json!({"id": "a"})).unwrap();
        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"]["id"], "a");
        assert!(buffer.ends_with(b"\n"));
    }

    #[test]
    fn test_write_error_shape() {
        let mut buffer = Vec::new();
        write_error(&mut buffer, "CORM_MISSING_ID", "doc.Id is required").unwrap();
        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "CORM_MISSING_ID");
    }
}
