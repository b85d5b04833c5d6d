//! End-to-end completion scenarios

use std::sync::Arc;

use super::*;
use crate::grammar::{CommandBuilder, GrammarBuilder, OptionBuilder};

fn grammar() -> Arc<crate::grammar::Grammar> {
    let grammar = GrammarBuilder::new(
        CommandBuilder::group("myapp")
            .option(OptionBuilder::count(["--verbose", "-v"]))
            .option(OptionBuilder::value(["--config", "-c"]).help("Config file"))
            .subcommand_with_aliases(
                CommandBuilder::leaf("serve")
                    .help("Run the server")
                    .option(OptionBuilder::value(["--port", "-p"]).help("Port to bind"))
                    .option(OptionBuilder::value(["--tag", "-t"]).multiple())
                    .option(OptionBuilder::flag(["--debug", "-d"]).secondary("--no-debug"))
                    .option(OptionBuilder::value(["--point"]).nargs(2)),
                ["s"],
            )
            .subcommand(
                CommandBuilder::group("remote")
                    .subcommand(CommandBuilder::leaf("add"))
                    .subcommand_with_aliases(CommandBuilder::leaf("remove"), ["rm"]),
            ),
    )
    .build()
    .unwrap();
    Arc::new(grammar)
}

fn engine() -> CompletionEngine {
    CompletionEngine::from_grammar(grammar(), true).with_program_name("myapp")
}

fn suffixes(engine: &CompletionEngine, text: &str) -> Vec<String> {
    engine
        .complete(text, true)
        .into_iter()
        .map(|c| c.suffix)
        .collect()
}

fn names(engine: &CompletionEngine, text: &str) -> Vec<String> {
    engine
        .complete(text, true)
        .into_iter()
        .map(|c| c.name)
        .collect()
}

const LINES: &[&str] = &[
    "",
    "my",
    "myapp",
    "myapp ",
    "myapp -",
    "myapp --",
    "myapp -v",
    "myapp -vv -",
    "myapp -c",
    "myapp -cfile ",
    "myapp --config=x s",
    "myapp se",
    "myapp serve ",
    "myapp serve --po",
    "myapp serve --port 80 -",
    "myapp serve --port=80 --",
    "myapp serve -p",
    "myapp serve -dp",
    "myapp serve -d",
    "myapp serve --point 1 ",
    "myapp serve --point 1 2 --",
    "myapp s --tag a --ta",
    "myapp remote r",
    "myapp remote rm ",
    "myapp serve \"unterminated",
    "myapp serve file --p",
    "myapp --nope serve ",
    "other ",
    "myapp serve -dx",
    "myapp se #x",
    "myapp serve --tag #1 --po",
];

// ===== Laws =====

#[test]
fn test_completion_is_total_and_idempotent() {
    let engine = engine();
    for line in LINES {
        for at_end in [true, false] {
            let first = engine.complete(line, at_end);
            let second = engine.complete(line, at_end);
            assert_eq!(first, second, "{line:?}");
        }
    }
}

#[test]
fn test_prefix_law() {
    let engine = engine();
    let grammar = grammar();
    let declared: Vec<String> = grammar
        .iter()
        .flat_map(|node| {
            let mut words: Vec<String> = node
                .options()
                .iter()
                .flat_map(|option| option.all_names())
                .map(str::to_string)
                .collect();
            words.extend(node.child_names().map(str::to_string));
            words.extend(node.alias_names().map(str::to_string));
            words
        })
        .chain(std::iter::once("myapp".to_string()))
        .collect();

    for line in LINES {
        let tokenized = tokenize(line, true).unwrap_or_default();
        let live = tokenized.live_token();
        for candidate in engine.complete(line, true) {
            let completed = match candidate.kind {
                CandidateKind::ShortFlag => format!("-{}", candidate.suffix),
                _ => format!("{live}{}", candidate.suffix),
            };
            assert_eq!(completed, candidate.name, "{line:?}");
            assert!(declared.contains(&candidate.name), "{line:?} -> {}", candidate.name);
            assert!(!candidate.suffix.is_empty());
        }
    }
}

#[test]
fn test_clustering_law() {
    let engine = engine();
    // `-d` is a flag: more short flags may follow
    assert_eq!(suffixes(&engine, "myapp serve -d"), vec!["p", "t"]);
    // `-p` takes a value: nothing more to cluster
    assert!(suffixes(&engine, "myapp serve -dp").is_empty());
    // and the cluster is accepted once its value is given
    assert_eq!(
        names(&engine, "myapp serve -dp 80 --"),
        vec!["--tag", "--point"]
    );
}

#[test]
fn test_non_repeatable_exhaustion() {
    let engine = engine();
    let offered = names(&engine, "myapp serve --port 8080 --");
    assert!(!offered.contains(&"--port".to_string()));
    assert_eq!(suffixes(&engine, "myapp serve --port 8080 --po"), vec!["int"]);

    assert_eq!(suffixes(&engine, "myapp serve --tag a --ta"), vec!["g"]);
    assert_eq!(suffixes(&engine, "myapp s -t a -t b --ta"), vec!["g"]);
}

#[test]
fn test_counting_option_never_used_up() {
    let engine = engine();
    assert_eq!(suffixes(&engine, "myapp -vv -"), vec!["v", "c"]);
    assert_eq!(suffixes(&engine, "myapp --verbose --verb"), vec!["ose"]);
}

// ===== Scenarios =====

#[test]
fn test_subcommand_prefix() {
    let engine = engine();
    assert_eq!(suffixes(&engine, "myapp se"), vec!["rve"]);
}

#[test]
fn test_long_option_prefix() {
    let engine = engine();
    let candidates = engine.complete("myapp serve --po", true);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].suffix, "rt");
    assert_eq!(candidates[0].description.as_deref(), Some("Port to bind"));
    assert_eq!(candidates[1].suffix, "int");
}

#[test]
fn test_long_and_short_names_share_usage() {
    let engine = engine();
    assert_eq!(suffixes(&engine, "myapp serve --port 80 -"), vec!["t", "d"]);
    assert_eq!(suffixes(&engine, "myapp serve -p 80 --p"), vec!["oint"]);
}

#[test]
fn test_secondary_name_uses_option() {
    let engine = engine();
    let offered = names(&engine, "myapp serve --no-debug --");
    assert!(!offered.contains(&"--debug".to_string()));
    assert_eq!(suffixes(&engine, "myapp serve --no-debug -"), vec!["p", "t"]);
}

#[test]
fn test_pending_short_value_yields_nothing() {
    let engine = engine();
    assert!(engine.complete("myapp serve -p", true).is_empty());
}

#[test]
fn test_malformed_quoting_yields_nothing() {
    let engine = engine();
    assert!(engine.complete("myapp serve \"unterminated", true).is_empty());
    assert!(engine.complete("myapp serve 'x", true).is_empty());
}

#[test]
fn test_embedded_long_value() {
    let engine = engine();
    assert_eq!(
        names(&engine, "myapp serve --port=80 --"),
        vec!["--tag", "--debug", "--no-debug", "--point"]
    );
    assert!(engine.complete("myapp serve --debug=1 --", true).is_empty());
}

#[test]
fn test_attached_short_value() {
    let engine = engine();
    assert_eq!(
        names(&engine, "myapp -cfile "),
        vec!["--verbose", "-v", "remote", "serve", "s"]
    );
}

#[test]
fn test_multi_value_option() {
    let engine = engine();
    assert!(engine.complete("myapp serve --point 1 ", true).is_empty());
    assert_eq!(suffixes(&engine, "myapp serve --point 1 2 --po"), vec!["rt"]);
    assert_eq!(suffixes(&engine, "myapp serve --point=1 2 --po"), vec!["rt"]);
}

#[test]
fn test_values_may_look_like_anything() {
    let engine = engine();
    assert_eq!(suffixes(&engine, "myapp -c serve se"), vec!["rve"]);
    assert_eq!(suffixes(&engine, "myapp -c --nope se"), vec!["rve"]);
}

#[test]
fn test_hash_words_are_not_comments() {
    let engine = engine();
    // `se` is no longer the word under the cursor
    assert!(engine.complete("myapp se #x", true).is_empty());
    assert_eq!(
        suffixes(&engine, "myapp serve --tag #1 --po"),
        vec!["rt", "int"]
    );
    assert_eq!(
        suffixes(&engine, "myapp serve --tag v1 --po"),
        suffixes(&engine, "myapp serve --tag #1 --po")
    );
}

#[test]
fn test_root_listing() {
    let engine = engine();
    assert_eq!(
        names(&engine, "myapp "),
        vec!["--verbose", "-v", "--config", "-c", "remote", "serve", "s"]
    );
}

#[test]
fn test_options_are_scoped_to_the_command() {
    let engine = engine();
    let offered = names(&engine, "myapp -c x serve --");
    assert_eq!(offered, vec!["--port", "--tag", "--debug", "--no-debug", "--point"]);
}

#[test]
fn test_nested_groups() {
    let engine = engine();
    assert!(engine.complete("myapp remote rm --", true).is_empty());
    assert_eq!(suffixes(&engine, "myapp remote r"), vec!["emove", "m"]);
}

#[test]
fn test_alias_descends() {
    let engine = engine();
    assert_eq!(suffixes(&engine, "myapp s --po"), vec!["rt", "int"]);
}

#[test]
fn test_aliases_disabled() {
    let engine = CompletionEngine::from_grammar(grammar(), false).with_program_name("myapp");
    assert_eq!(
        names(&engine, "myapp "),
        vec!["--verbose", "-v", "--config", "-c", "remote", "serve"]
    );
    assert!(engine.complete("myapp s --po", true).is_empty());
}

#[test]
fn test_unknown_options() {
    let engine = engine();
    // still being typed
    assert_eq!(suffixes(&engine, "myapp --co"), vec!["nfig"]);
    assert!(engine.complete("myapp --nope", true).is_empty());
    // already typed
    assert!(engine.complete("myapp --nope serve ", true).is_empty());
    assert!(engine.complete("myapp serve -dx", true).is_empty());
}

#[test]
fn test_positional_aborts() {
    let engine = engine();
    assert!(engine.complete("myapp serve file --p", true).is_empty());
}

#[test]
fn test_value_after_cluster_resets_continuation() {
    let engine = engine();
    // `-` here is the port value, not a new cluster
    assert!(engine.complete("myapp serve -d --port -", true).is_empty());
}

#[test]
fn test_trailing_space_completes_next_word() {
    let engine = engine();
    assert_eq!(names(&engine, "myapp remote "), vec!["add", "remove", "rm"]);
    assert!(engine.complete("myapp se ", true).is_empty());
}

#[test]
fn test_program_name() {
    let engine = engine();
    assert_eq!(suffixes(&engine, "my"), vec!["app"]);
    assert!(engine.complete("other ", true).is_empty());

    let bare = CompletionEngine::from_grammar(grammar(), true);
    assert_eq!(suffixes(&bare, "se"), vec!["rve"]);
}
