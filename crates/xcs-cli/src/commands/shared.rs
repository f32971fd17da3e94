use std::collections::HashSet;
use std::io::Read;

use anyhow::Context;
use xcs_db::tracker::ReconcileReport;
use xcs_db::transfer::TransferResult;

use crate::cli::root_commands::PathsArgs;
use crate::context::AppContext;

/// Non-blank, trimmed lines of a path list, first occurrence kept.
pub fn parse_path_list<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Paths named on the command line, in a list file, or on stdin (`-`).
pub fn read_paths(args: &PathsArgs) -> anyhow::Result<Vec<String>> {
    let mut text = String::new();
    for path in &args.paths {
        if path == "-" {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read paths from stdin")?;
        } else {
            text.push_str(path);
        }
        text.push('\n');
    }
    if let Some(file) = &args.paths_file {
        let listed = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read path list {file}"))?;
        text.push_str(&listed);
    }
    Ok(parse_path_list(text.lines()))
}

/// Requested paths, or every tracked file when none were given.
pub async fn paths_or_tracked(args: &PathsArgs, ctx: &AppContext) -> anyhow::Result<Vec<String>> {
    if !args.is_empty() {
        return read_paths(args);
    }
    let files = ctx
        .service
        .list_tracked_files(None)
        .await
        .context("failed to list tracked files")?;
    Ok(files.into_iter().map(|file| file.path).collect())
}

/// Fail the command when any transfer failed. Results are printed first.
pub fn ensure_transfers_succeeded(results: &[TransferResult]) -> anyhow::Result<()> {
    let failed = results.iter().filter(|result| result.is_failed()).count();
    if failed > 0 {
        anyhow::bail!(
            "{failed} of {} transfers failed; those files stay pending",
            results.len()
        );
    }
    Ok(())
}

/// Fail the command when any path could not be reconciled. The report is
/// printed first.
pub fn ensure_reconcile_succeeded(report: &ReconcileReport) -> anyhow::Result<()> {
    if let Some(first) = report.failures.first() {
        anyhow::bail!(
            "{} paths could not be checked (first: {}: {})",
            report.failures.len(),
            first.path,
            first.error
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use xcs_db::tracker::PathFailure;

    #[test]
    fn path_list_skips_blanks_and_repeats() {
        let text = "/a/soakDBDataFile.sqlite\n\n  /b/soakDBDataFile.sqlite  \n/a/soakDBDataFile.sqlite\n";
        assert_eq!(
            parse_path_list(text.lines()),
            vec![
                "/a/soakDBDataFile.sqlite".to_string(),
                "/b/soakDBDataFile.sqlite".to_string(),
            ]
        );
    }

    #[test]
    fn reads_arguments_and_list_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let list = dir.path().join("paths.txt");
        std::fs::write(&list, "/b.sqlite\n/c.sqlite\n").unwrap();
        let args = PathsArgs {
            paths: vec!["/a.sqlite".into(), "/b.sqlite".into()],
            paths_file: Some(list.to_string_lossy().into_owned()),
        };
        assert_eq!(
            read_paths(&args).unwrap(),
            vec!["/a.sqlite", "/b.sqlite", "/c.sqlite"]
        );
    }

    #[test]
    fn missing_list_file_is_an_error() {
        let args = PathsArgs {
            paths: Vec::new(),
            paths_file: Some("/definitely/not/here.txt".into()),
        };
        assert!(read_paths(&args).is_err());
    }

    #[test]
    fn any_failed_transfer_fails_the_command() {
        let results = vec![TransferResult::Failed {
            path: "/a.sqlite".into(),
            error: "boom".into(),
        }];
        let err = ensure_transfers_succeeded(&results).unwrap_err();
        assert!(err.to_string().starts_with("1 of 1"));
        assert!(ensure_transfers_succeeded(&[]).is_ok());
    }

    #[test]
    fn any_reconcile_failure_fails_the_command() {
        let mut report = ReconcileReport {
            kept: 3,
            ..ReconcileReport::default()
        };
        assert!(ensure_reconcile_succeeded(&report).is_ok());

        report.failures.push(PathFailure {
            path: "/a.sqlite".into(),
            error: "cannot compare modification times".into(),
        });
        let err = ensure_reconcile_succeeded(&report).unwrap_err();
        assert_eq!(
            err.to_string(),
            "1 paths could not be checked (first: /a.sqlite: cannot compare modification times)"
        );
    }
}
