//! Shell completion generation for cmdtree
//!
//! Produces clap_complete scripts for cmdtree itself. With `--bridge NAME`
//! the script also completes program NAME from a grammar file by calling
//! `cmdtree complete --words` on every Tab press.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::path::Path;

use crate::cli::CliArgs;
use crate::error::{CmdtreeError, ConfigError, Result};

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
/// * `bridge` - Program name and grammar file to complete through cmdtree
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str, bridge: Option<(&str, &Path)>) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    print!("{}", completion_script(shell, bridge)?);
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(CmdtreeError::Config(ConfigError::Generic(format!(
            "Unsupported shell: {shell_name}. Supported shells: bash, zsh, fish"
        )))),
    }
}

/// Full script: cmdtree's own completions plus optional bridge glue
fn completion_script(shell: Shell, bridge: Option<(&str, &Path)>) -> Result<String> {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, "cmdtree", &mut buffer);
    let mut script = String::from_utf8_lossy(&buffer).into_owned();

    if let Some((program, grammar)) = bridge {
        script.push_str(&bridge_script(shell, program, grammar)?);
    }
    Ok(script)
}

/// Shell glue that completes `program` by asking cmdtree
fn bridge_script(shell: Shell, program: &str, grammar: &Path) -> Result<String> {
    if program.is_empty() || program.starts_with('-') || program.chars().any(char::is_whitespace)
    {
        return Err(ConfigError::InvalidValue {
            field: "bridge".to_string(),
            value: program.to_string(),
        }
        .into());
    }

    let grammar = grammar.to_string_lossy();
    let quoted_program = quote(program)?;
    let quoted_grammar = quote(&grammar)?;
    let func = function_suffix(program);
    let query = format!("cmdtree --prog-name {quoted_program} {quoted_grammar} complete --words --");

    let glue = match shell {
        Shell::Bash => format!(
            r#"
# Grammar completion for {program}
_cmdtree_bridge_{func}() {{
    local line="${{COMP_LINE:0:COMP_POINT}}"
    local IFS=$'\n'
    COMPREPLY=($({query} "$line" 2>/dev/null))
}}
complete -o nospace -F _cmdtree_bridge_{func} {quoted_program}
"#
        ),
        Shell::Zsh => format!(
            r#"
# Grammar completion for {program}
_cmdtree_bridge_{func}() {{
    local -a candidates
    candidates=("${{(@f)$({query} "$LBUFFER" 2>/dev/null)}}")
    compadd -Q -S '' -a candidates
}}
compdef _cmdtree_bridge_{func} {quoted_program}
"#
        ),
        Shell::Fish => format!(
            r#"
# Grammar completion for {program}
function __cmdtree_bridge_{func}
    {query} (commandline -cp) 2>/dev/null
end
complete -c {quoted_program} -f -a '(__cmdtree_bridge_{func})'
"#
        ),
        _ => {
            return Err(ConfigError::Generic(
                "Unsupported shell. Supported shells: bash, zsh, fish".to_string(),
            )
            .into());
        }
    };
    Ok(glue)
}

fn quote(word: &str) -> Result<String> {
    shlex::try_quote(word)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| ConfigError::InvalidValue {
            field: "bridge".to_string(),
            value: format!("{word}: {e}"),
        }
        .into())
}

/// Shell function names only allow a conservative character set
fn function_suffix(program: &str) -> String {
    program
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
