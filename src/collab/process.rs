use std::process::{Command, Stdio};

use crate::error::{SlidecastError, SlidecastResult};

/// Expand `{placeholder}` occurrences in one argv template element.
pub fn expand_template(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = arg.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Run an argv template to completion, capturing stderr for diagnostics.
///
/// The first element is the program; the rest are arguments. Placeholders are
/// expanded in every element.
pub fn run_template(argv: &[String], vars: &[(&str, &str)]) -> SlidecastResult<()> {
    let mut expanded = argv
        .iter()
        .map(|a| expand_template(a, vars))
        .collect::<Vec<_>>();
    if expanded.is_empty() {
        return Err(SlidecastError::input("collaborator command is empty"));
    }
    let program = expanded.remove(0);

    let output = Command::new(&program)
        .args(&expanded)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            SlidecastError::asset(format!(
                "failed to spawn '{program}' (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SlidecastError::asset(format!(
            "'{program}' exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_expansion_substitutes_all_placeholders() {
        let out = expand_template("{a}-{b}-{a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x-y-x");
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(run_template(&[], &[]).is_err());
    }

    #[test]
    fn missing_program_reports_spawn_failure() {
        let err = run_template(&["slidecast-definitely-not-a-binary".to_string()], &[])
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to spawn"));
    }

    #[test]
    fn true_command_succeeds() {
        assert!(run_template(&["true".to_string()], &[]).is_ok());
    }
}
