//! The demo command set the CLI runs against.
//!
//! Two owners register into one manager so alias namespacing is visible:
//! `demo` owns the everyday commands and `admin` registers a second `time`
//! that lands under `admin.time`.

use std::sync::Arc;

use anyhow::{Context, Result};
use cmdtree_core::{
    BoolParser, ChoiceParser, Command, CommandContextBuilder, CommandManager, DispatcherConfig,
    IntegerParser, NodeBuilder, NodeId, Parameter, Principal, SimplePrincipal, StringParser,
};
use tracing::info;

/// Owner id of the everyday commands.
pub(crate) const DEMO_OWNER: &str = "demo";

const ITEMS: [&str; 5] = ["diamond", "dirt", "stick", "stone", "torch"];
const PLAYERS: [&str; 3] = ["alex", "sam", "steve"];

fn items(_: &CommandContextBuilder<'_, SimplePrincipal>, _: &str) -> Vec<String> {
    ITEMS.map(String::from).to_vec()
}

fn players(_: &CommandContextBuilder<'_, SimplePrincipal>, _: &str) -> Vec<String> {
    PLAYERS.map(String::from).to_vec()
}

fn len_result(text: &str) -> i32 {
    i32::try_from(text.chars().count()).unwrap_or(i32::MAX)
}

/// Build the demo manager.
pub(crate) fn manager(config: DispatcherConfig) -> Result<CommandManager<SimplePrincipal>> {
    let manager = CommandManager::with_config(config);

    // give <item> [<amount>]
    let give = Command::<SimplePrincipal>::builder()
        .parameter(Parameter::new("item", StringParser::word()).completer(items))
        .parameter(Parameter::new("amount", IntegerParser::between(1, 64)).optional())
        .executor(|ctx| {
            let item = ctx.get::<String>("item")?;
            let amount = ctx.get_optional::<i32>("amount")?.unwrap_or(1);
            info!(principal = ctx.source().name(), %item, amount, "give");
            Ok(amount)
        })
        .short_description("Give an item")
        .extended_description("Amount defaults to 1 and may be at most 64.")
        .build()?;
    manager.register_command(DEMO_OWNER, &give, "give", &[])?;

    // teleport <target>, aliased as tp, behind demo.command.teleport
    manager.register_with_permission(
        DEMO_OWNER,
        NodeBuilder::literal("teleport").then(
            NodeBuilder::argument("target", StringParser::word())
                .suggests(players)
                .executes(|ctx| Ok(len_result(&ctx.get::<String>("target")?))),
        ),
        &["tp"],
    )?;

    // tell <target> <message...>
    manager.register(
        DEMO_OWNER,
        NodeBuilder::literal("tell").then(
            NodeBuilder::argument("target", StringParser::word())
                .suggests(players)
                .then(
                    NodeBuilder::argument("message", StringParser::greedy())
                        .executes(|ctx| Ok(len_result(&ctx.get::<String>("message")?))),
                ),
        ),
        &["msg"],
    )?;

    // time set <value> | time query | time <preset>
    manager.register(
        DEMO_OWNER,
        NodeBuilder::literal("time")
            .then(
                NodeBuilder::literal("set").then(
                    NodeBuilder::argument("value", IntegerParser::at_least(0))
                        .executes(|ctx| ctx.get::<i32>("value")),
                ),
            )
            .then(NodeBuilder::literal("query").executes(|_| Ok(6000)))
            .then(
                NodeBuilder::argument("preset", ChoiceParser::new(["day", "night", "noon"]))
                    .executes(|ctx| {
                        Ok(match ctx.get::<String>("preset")?.as_str() {
                            "night" => 13000,
                            "noon" => 6000,
                            _ => 1000,
                        })
                    }),
            ),
        &[],
    )?;

    // A second owner asking for `time` ends up as admin.time.
    manager.register(
        "admin",
        NodeBuilder::literal("time").executes(|_| Ok(24000)),
        &[],
    )?;

    // gamemode <mode>
    manager.register(
        DEMO_OWNER,
        NodeBuilder::literal("gamemode").then(
            NodeBuilder::argument(
                "mode",
                ChoiceParser::new(["survival", "creative", "adventure", "spectator"]),
            )
            .executes(|_| Ok(1)),
        ),
        &["gm"],
    )?;

    // toggle <on>
    manager.register(
        DEMO_OWNER,
        NodeBuilder::literal("toggle").then(
            NodeBuilder::argument("on", BoolParser)
                .executes(|ctx| Ok(i32::from(ctx.get::<bool>("on")?))),
        ),
        &[],
    )?;

    // stop: listed for everyone, refused without demo.server.stop
    manager.register(
        DEMO_OWNER,
        NodeBuilder::<SimplePrincipal>::literal("stop").executes(|ctx| {
            ctx.require_capability("demo.server.stop")?;
            info!(principal = ctx.source().name(), "stop");
            Ok(1)
        }),
        &[],
    )?;

    // execute run <command> | execute as <who> ...
    let execute = manager
        .register(
            DEMO_OWNER,
            NodeBuilder::literal("execute").then(NodeBuilder::literal("run").redirect(NodeId::ROOT)),
            &[],
        )?
        .node;
    manager
        .edit(|dispatcher| {
            dispatcher.add_child(
                execute,
                NodeBuilder::literal("as").then(
                    NodeBuilder::<SimplePrincipal>::argument("who", StringParser::word())
                        .suggests(players)
                        .redirect_with(execute, |ctx| {
                            let who = ctx.get::<String>("who")?;
                            let mut principal = SimplePrincipal::new(who);
                            for capability in ctx.source().capabilities() {
                                principal = principal.grant(capability);
                            }
                            Ok(Arc::new(principal))
                        }),
                ),
            )
        })
        .context("registering execute as")?;

    Ok(manager)
}
