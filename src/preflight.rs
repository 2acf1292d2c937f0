//! Preflight checks - ensure required external tools are installed.

use anyhow::Result;

/// Verify every named tool resolves on PATH before any of them run
pub fn ensure_tools(tools: &[&str]) -> Result<()> {
    for tool in tools {
        if which::which(tool).is_err() {
            anyhow::bail!("'{tool}' was not found on PATH. Install it and try again.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tools_is_ok() {
        assert!(ensure_tools(&[]).is_ok());
    }

    #[test]
    fn test_unknown_tool_is_an_error() {
        let err = ensure_tools(&["definitely-not-a-real-tool-4b1d"]).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-tool-4b1d"));
    }
}
