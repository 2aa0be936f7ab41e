use std::sync::OnceLock;

use regex::Regex;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Group 1: variable name. Group 2: optional default("...") fallback.
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("placeholder pattern is valid")
    })
}

fn leftover() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[^}]*\}\}").expect("leftover pattern is valid"))
}

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// `{{ env.VAR | default("fallback") }}` substitutes the fallback when the
/// variable is unset; without a default an unset variable is an error.
/// Comment lines pass through untouched, and any placeholder that is not
/// `env.`-scoped is rejected so typos fail loudly at startup.
pub fn expand_env(input: &str) -> anyhow::Result<String> {
    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;
        for caps in placeholder().captures_iter(line) {
            let full = caps.get(0).map_or(0..0, |m| m.range());
            let var = &caps[1];

            output.push_str(&line[last_end..full.start]);
            match std::env::var(var) {
                Ok(value) => output.push_str(&value),
                Err(_) => match caps.get(2) {
                    Some(default) => output.push_str(default.as_str()),
                    None => anyhow::bail!("environment variable not found: `{var}`"),
                },
            }
            last_end = full.end;
        }
        let rest = &line[last_end..];

        if let Some(m) = leftover().find(rest) {
            anyhow::bail!(
                "unsupported placeholder {}: only `env.`-scoped variables are expanded",
                m.as_str()
            );
        }
        output.push_str(rest);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}
