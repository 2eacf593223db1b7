use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

/// Collect the job environment: the optional dotenv file first, then the
/// process environment on top. Empty process values do not mask file values.
///
/// Variables whose name or value is not valid UTF-8 cannot be job settings
/// and are skipped.
pub(crate) fn load(env_file: Option<&Path>) -> anyhow::Result<HashMap<String, String>> {
    let mut env = HashMap::new();

    if let Some(path) = env_file {
        let entries = dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to open env file {}", path.display()))?;
        for entry in entries {
            let (key, value) =
                entry.with_context(|| format!("failed to parse env file {}", path.display()))?;
            env.insert(key, value);
        }
        tracing::debug!(path = %path.display(), count = env.len(), "loaded env file");
    }

    for (key, value) in std::env::vars_os() {
        let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) else {
            tracing::debug!("skipping environment variable that is not valid UTF-8");
            continue;
        };
        if !value.is_empty() {
            env.insert(key, value);
        }
    }
    Ok(env)
}
