use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("command {command:?} unexpected error: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command {command:?} returned non zero exit code {code}{}", with_output(.output))]
    NonZeroExit {
        command: String,
        code: i32,
        output: String,
    },

    #[error("command {command:?} was terminated by a signal{}", with_output(.output))]
    Terminated { command: String, output: String },

    #[error("command {command:?} timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("command {command:?} output was not valid UTF-8")]
    InvalidUtf8 { command: String },
}

fn with_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(", command output:\n{output}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_includes_output() {
        let err = GitError::NonZeroExit {
            command: "git config --local --unset user.name".to_string(),
            code: 3,
            output: "error: could not lock config file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command \"git config --local --unset user.name\" returned non zero exit code 3, \
             command output:\nerror: could not lock config file"
        );
    }

    #[test]
    fn test_non_zero_exit_without_output() {
        let err = GitError::NonZeroExit {
            command: "false".to_string(),
            code: 1,
            output: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "command \"false\" returned non zero exit code 1"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = GitError::Timeout {
            command: "sh -c sleep 10".to_string(),
            timeout_secs: 2,
        };
        assert!(err.to_string().ends_with("timed out after 2s"));
    }
}
