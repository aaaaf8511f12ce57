//! Interactive identity selection.
//!
//! On a terminal the entries go through a fuzzy-search picker. When stderr is
//! not a terminal (pipes, scripts, tests) a numbered list is printed instead
//! and one line is read from stdin.

use color_eyre::eyre::{bail, eyre, Result};
use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::FuzzySelect;
use gitidentity::identity::identities_as_strings;
use gitidentity::{ConfigStore, Identity, IdentityManager};
use std::io::Write;
use tokio::sync::oneshot;

/// Ask the user to pick one of `list`.
///
/// Entries equal to the current or the global identity are annotated; a
/// failed lookup just drops the annotation.
pub async fn select_identity<S: ConfigStore>(
    manager: &IdentityManager<S>,
    list: &[Identity],
) -> Result<Identity> {
    if list.is_empty() {
        bail!("no identities configured");
    }

    let current = manager
        .current_identity(false)
        .await
        .ok()
        .map(|i| i.display());
    let global = manager.global_identity().await.ok().map(|i| i.display());
    let labels = identities_as_strings(list);
    let entries = annotate(&labels, current.as_deref(), global.as_deref());

    let idx = if Term::stderr().is_term() {
        pick(entries).await?
    } else {
        read_choice(&labels, &entries).await?
    };
    list.get(idx)
        .cloned()
        .ok_or_else(|| eyre!("invalid selection"))
}

/// Suffix entries matching the current and global identities.
#[must_use]
pub fn annotate(labels: &[String], current: Option<&str>, global: Option<&str>) -> Vec<String> {
    labels
        .iter()
        .map(|label| {
            let is_current = current == Some(label.as_str());
            let is_global = global == Some(label.as_str());
            match (is_current, is_global) {
                (true, true) => format!("{label} (current, global)"),
                (true, false) => format!("{label} (current)"),
                (false, true) => format!("{label} (global)"),
                (false, false) => label.clone(),
            }
        })
        .collect()
}

/// Fuzzy picker on the terminal; Esc or `q` is "no identity selected".
async fn pick(entries: Vec<String>) -> Result<usize> {
    let picked = off_runtime(move || {
        FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Select identity")
            .items(&entries)
            .default(0)
            .interact_on_opt(&Term::stderr())
    })
    .await??;
    picked.ok_or_else(|| eyre!("no identity selected"))
}

/// Line-based selection used when there is no terminal to draw the picker on.
async fn read_choice(labels: &[String], entries: &[String]) -> Result<usize> {
    {
        let mut stderr = std::io::stderr().lock();
        for (idx, entry) in entries.iter().enumerate() {
            writeln!(stderr, "  {}: {entry}", idx + 1)?;
        }
        write!(stderr, "Select identity: ")?;
        stderr.flush()?;
    }

    let line = off_runtime(|| {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(e) => Err(e),
        }
    })
    .await??;
    choose(labels, line.as_deref())
}

/// Resolve one line of input to an index into `labels`.
///
/// A number picks by 1-based position; anything else is a substring search
/// where the first hit wins, so an empty line picks the first entry. `None`
/// is end of input.
pub fn choose(labels: &[String], input: Option<&str>) -> Result<usize> {
    let Some(input) = input else {
        bail!("no identity selected");
    };
    let input = input.trim();
    if let Ok(position) = input.parse::<usize>() {
        if position == 0 || position > labels.len() {
            bail!("invalid selection");
        }
        return Ok(position - 1);
    }
    labels
        .iter()
        .position(|label| label.contains(input))
        .ok_or_else(|| eyre!("no identity selected"))
}

/// Run a blocking terminal read on a plain thread, so a pending read never
/// keeps the runtime from shutting down on Ctrl-C.
async fn off_runtime<T, F>(read: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = tx.send(read());
    });
    Ok(rx.await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec![
            "Alice <alice@example.com>".to_string(),
            "personal".to_string(),
            "work".to_string(),
        ]
    }

    #[test]
    fn test_annotate() {
        let entries = annotate(&labels(), Some("work"), Some("personal"));
        assert_eq!(
            entries,
            vec!["Alice <alice@example.com>", "personal (global)", "work (current)"]
        );
    }

    #[test]
    fn test_annotate_current_and_global() {
        let entries = annotate(&labels(), Some("work"), Some("work"));
        assert_eq!(entries[2], "work (current, global)");
        assert_eq!(annotate(&labels(), None, None), labels());
    }

    #[test]
    fn test_choose_by_number() {
        assert_eq!(choose(&labels(), Some("2\n")).unwrap(), 1);
        assert_eq!(choose(&labels(), Some(" 3 ")).unwrap(), 2);
    }

    #[test]
    fn test_choose_number_out_of_range() {
        for input in ["0", "4", "99"] {
            let err = choose(&labels(), Some(input)).unwrap_err();
            assert_eq!(err.to_string(), "invalid selection");
        }
    }

    #[test]
    fn test_choose_by_search() {
        assert_eq!(choose(&labels(), Some("Alice\n")).unwrap(), 0);
        assert_eq!(choose(&labels(), Some("wor")).unwrap(), 2);
        assert_eq!(choose(&labels(), Some("\n")).unwrap(), 0);
    }

    #[test]
    fn test_choose_search_is_case_sensitive() {
        let err = choose(&labels(), Some("ALICE")).unwrap_err();
        assert_eq!(err.to_string(), "no identity selected");
    }

    #[test]
    fn test_choose_end_of_input() {
        let err = choose(&labels(), None).unwrap_err();
        assert_eq!(err.to_string(), "no identity selected");
    }

    #[tokio::test]
    async fn test_off_runtime_returns_value() {
        let value = off_runtime(|| 41 + 1).await.unwrap();
        assert_eq!(value, 42);
    }
}
