//! Completion candidates: literals, argument completers, visibility, and
//! completion across redirects.

mod common;

use cmdtree_core::{
    BoolParser, ChoiceParser, CommandContextBuilder, Dispatcher, DispatcherConfig, NodeBuilder,
    NodeId, Principal, SimplePrincipal, StringParser,
};
use common::{give_dispatcher, guest, operator, returns};

fn chat_dispatcher() -> Dispatcher<SimplePrincipal> {
    let mut dispatcher = Dispatcher::new();
    for name in ["teleport", "tell", "time"] {
        dispatcher.register(returns(name, 1)).unwrap();
    }
    dispatcher
        .register(returns("stop", 1).requires(|p: &SimplePrincipal| p.has_capability("server.stop")))
        .unwrap();
    dispatcher
}

fn items(_: &CommandContextBuilder<'_, SimplePrincipal>, _: &str) -> Vec<String> {
    ["diamond", "dirt", "stone"].map(String::from).to_vec()
}

fn greeting(ctx: &CommandContextBuilder<'_, SimplePrincipal>, _: &str) -> Vec<String> {
    let to = ctx
        .argument("to")
        .map(|a| a.value.to_string())
        .unwrap_or_default();
    vec![format!("hello {to}")]
}

#[test]
fn literals_complete_in_insertion_order() {
    let dispatcher = chat_dispatcher();
    let suggestions = dispatcher.suggest("t", guest());
    assert_eq!(suggestions.list, ["teleport", "tell", "time"]);
    assert_eq!((suggestions.range.start, suggestions.range.end), (0, 1));

    assert_eq!(dispatcher.suggest("te", guest()).list, ["teleport", "tell"]);
    assert!(dispatcher.suggest("x", guest()).is_empty());
}

#[test]
fn prefix_match_ignores_case() {
    let dispatcher = chat_dispatcher();
    assert_eq!(dispatcher.suggest("TE", guest()).list, ["teleport", "tell"]);
}

#[test]
fn empty_input_lists_every_visible_command() {
    let dispatcher = chat_dispatcher();
    assert_eq!(
        dispatcher.suggest("", guest()).list,
        ["teleport", "tell", "time"]
    );
    assert_eq!(
        dispatcher.suggest("", operator()).list,
        ["teleport", "tell", "time", "stop"]
    );
}

#[test]
fn hidden_nodes_are_not_suggested() {
    let dispatcher = chat_dispatcher();
    assert!(dispatcher.suggest("st", guest()).is_empty());
    assert_eq!(dispatcher.suggest("st", operator()).list, ["stop"]);
}

#[test]
fn argument_completer_replaces_the_typed_word() {
    let mut dispatcher = Dispatcher::<SimplePrincipal>::new();
    dispatcher
        .register(
            NodeBuilder::literal("give").then(
                NodeBuilder::argument("item", StringParser::word())
                    .suggests(items)
                    .executes(|_| Ok(1)),
            ),
        )
        .unwrap();

    let after_space = dispatcher.suggest("give ", guest());
    assert_eq!(after_space.list, ["diamond", "dirt", "stone"]);
    assert_eq!(after_space.range.start, 5);

    let partial = dispatcher.suggest("give di", guest());
    assert_eq!(partial.list, ["diamond", "dirt"]);
    assert_eq!((partial.range.start, partial.range.end), (5, 7));
    assert_eq!(partial.apply("give di", 0).as_deref(), Some("give diamond"));
}

#[test]
fn completer_sees_earlier_arguments() {
    let mut dispatcher = Dispatcher::<SimplePrincipal>::new();
    dispatcher
        .register(
            NodeBuilder::literal("msg").then(
                NodeBuilder::argument("to", StringParser::word()).then(
                    NodeBuilder::argument("text", StringParser::greedy())
                        .suggests(greeting)
                        .executes(|_| Ok(1)),
                ),
            ),
        )
        .unwrap();
    assert_eq!(dispatcher.suggest("msg alex ", guest()).list, ["hello alex"]);
}

#[test]
fn parser_default_suggestions_are_used_without_a_completer() {
    let mut dispatcher = Dispatcher::<SimplePrincipal>::new();
    dispatcher
        .register(
            NodeBuilder::literal("flag")
                .then(NodeBuilder::argument("on", BoolParser).executes(|_| Ok(1))),
        )
        .unwrap();
    dispatcher
        .register(
            NodeBuilder::literal("mode").then(
                NodeBuilder::argument("mode", ChoiceParser::new(["survival", "creative", "spectator"]))
                    .executes(|_| Ok(1)),
            ),
        )
        .unwrap();

    assert_eq!(dispatcher.suggest("flag ", guest()).list, ["true", "false"]);
    assert_eq!(dispatcher.suggest("flag t", guest()).list, ["true"]);
    assert_eq!(
        dispatcher.suggest("mode s", guest()).list,
        ["survival", "spectator"]
    );
}

#[test]
fn literal_and_argument_siblings_both_contribute() {
    let mut dispatcher = Dispatcher::<SimplePrincipal>::new();
    dispatcher
        .register(
            NodeBuilder::literal("time")
                .then(returns("query", 1))
                .then(
                    NodeBuilder::argument("preset", ChoiceParser::new(["day", "night", "noon"]))
                        .executes(|_| Ok(2)),
                ),
        )
        .unwrap();
    assert_eq!(
        dispatcher.suggest("time ", guest()).list,
        ["query", "day", "night", "noon"]
    );
    assert_eq!(dispatcher.suggest("time n", guest()).list, ["night", "noon"]);
}

#[test]
fn suggestions_continue_through_redirects() {
    let mut dispatcher = give_dispatcher();
    dispatcher.register(returns("gamemode", 1)).unwrap();
    dispatcher
        .register(NodeBuilder::literal("run").redirect(NodeId::ROOT))
        .unwrap();

    let suggestions = dispatcher.suggest("run ga", guest());
    assert_eq!(suggestions.list, ["gamemode"]);
    assert_eq!((suggestions.range.start, suggestions.range.end), (4, 6));
}

#[test]
fn duplicates_are_removed() {
    let mut dispatcher = Dispatcher::<SimplePrincipal>::new();
    dispatcher
        .register(
            NodeBuilder::literal("pick")
                .then(
                    NodeBuilder::argument("a", ChoiceParser::new(["red", "green"]))
                        .executes(|_| Ok(1)),
                )
                .then(
                    NodeBuilder::argument("b", ChoiceParser::new(["green", "blue"]))
                        .executes(|_| Ok(2)),
                ),
        )
        .unwrap();
    assert_eq!(
        dispatcher.suggest("pick ", guest()).list,
        ["red", "green", "blue"]
    );
}

#[test]
fn suggestion_limit_truncates() {
    let config = DispatcherConfig::default().with_suggestion_limit(2);
    let mut dispatcher = Dispatcher::<SimplePrincipal>::with_config(config);
    for name in ["teleport", "tell", "time"] {
        dispatcher.register(returns(name, 1)).unwrap();
    }
    assert_eq!(dispatcher.suggest("t", guest()).list, ["teleport", "tell"]);
}

#[test]
fn completion_at_an_earlier_cursor() {
    let dispatcher = chat_dispatcher();
    let parse = dispatcher.parse("tell", guest());
    let suggestions = dispatcher.completion_suggestions(&parse, 2);
    assert_eq!(suggestions.list, ["teleport", "tell"]);
    assert_eq!((suggestions.range.start, suggestions.range.end), (0, 2));
}
