//! Regenerate `src/scripts.rs` from the `--help` output of every plugin
//!
//! Run `cargo build` in the crate root first, then
//! `cargo run --manifest-path make-docs/Cargo.toml > src/scripts.rs`.
//! Nothing is written unless every plugin printed its help.

use std::process::{self, Command};

/// A plugin binary and the line that introduces it
struct Plugin {
    name: &'static str,
    reaches: &'static str,
}

const PLUGINS: [Plugin; 2] = [
    Plugin {
        name: "check-snmp-disk",
        reaches: "Cross platform, only requires UDP access to an SNMP agent that \
                  serves HOST-RESOURCES-MIB.",
    },
    Plugin {
        name: "metrics-couchbase",
        reaches: "Cross platform, only requires HTTP access to the Couchbase \
                  REST API. Prints Graphite plaintext.",
    },
];

fn main() {
    match render(&PLUGINS) {
        Ok(doc) => print!("{}", doc),
        Err(e) => {
            eprintln!("make-docs: {}", e);
            process::exit(1);
        }
    }
}

fn render(plugins: &[Plugin]) -> Result<String, String> {
    let mut lines = vec![
        "Documentation about the various scripts contained herein".to_owned(),
        String::new(),
    ];
    lines.extend(plugins.iter().map(|p| format!("- [{0}](#{0})", p.name)));

    for plugin in plugins {
        let help = help_text(plugin.name)?;
        lines.push(String::new());
        lines.push(format!("# {}", plugin.name));
        lines.push(String::new());
        lines.push(plugin.reaches.to_owned());
        lines.push(String::new());
        lines.push("```plain".to_owned());
        lines.push(format!("$ {} --help", plugin.name));
        lines.extend(help.trim_end().lines().map(str::to_owned));
        lines.push("```".to_owned());
    }

    let mut doc = as_module_doc(&lines);
    doc.push('\n');
    Ok(doc)
}

/// The `--help` text of a freshly built plugin
fn help_text(name: &str) -> Result<String, String> {
    let binary = format!("target/debug/{}", name);
    let output = Command::new(&binary)
        .arg("--help")
        .output()
        .map_err(|e| format!("couldn't run {}: {}", binary, e))?;
    if !output.status.success() {
        return Err(format!(
            "{} --help exited with {}: {}",
            binary,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    String::from_utf8(output.stdout).map_err(|_| format!("{} --help printed invalid utf8", binary))
}

/// Prefix every line with `//!`, leaving no trailing spaces on blank lines
fn as_module_doc(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("//! {}", line).trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod test {
    use super::{as_module_doc, help_text};

    #[test]
    fn blank_lines_have_no_trailing_space() {
        let lines = vec!["# check".to_owned(), String::new(), "    indented".to_owned()];
        assert_eq!(as_module_doc(&lines), "//! # check\n//!\n//!     indented");
    }

    #[test]
    fn missing_binary_is_an_error() {
        let err = help_text("no-such-plugin").unwrap_err();
        assert!(err.contains("target/debug/no-such-plugin"), "{}", err);
    }
}
