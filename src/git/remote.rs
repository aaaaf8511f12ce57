/// Live repository facts the match engine consults. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    pub remotes: Vec<Remote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Parse `git remote -v` output.
///
/// Each valid line is `<name> <url> (<direction>)`; anything else is skipped.
#[must_use]
pub fn parse_remote_lines(text: &str) -> Vec<Remote> {
    text.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, url, _] => Some(Remote::new(*name, *url)),
                _ => None,
            }
        })
        .collect()
}
