//! Owned registration through `Registrar` and `CommandManager`: aliases,
//! namespacing, permissions, parameterized commands, help, and concurrent use.

mod common;

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use cmdtree_core::{
    Command, CommandError, CommandManager, CommandRegistry, Dispatcher, NodeBuilder, Parameter,
    Registrar, RegistrationError, SimplePrincipal, StringParser, codes,
};
use common::{counting, guest, operator, returns};

fn teleport() -> NodeBuilder<SimplePrincipal> {
    NodeBuilder::literal("teleport").then(
        NodeBuilder::argument("target", StringParser::word()).executes(|ctx| {
            let target = ctx.get::<String>("target")?;
            Ok(i32::try_from(target.len()).unwrap_or(i32::MAX))
        }),
    )
}

#[test]
fn secondary_alias_behaves_like_the_primary() {
    let manager = CommandManager::new();
    let mapping = manager.register("demo", teleport(), &["tp"]).unwrap();
    assert_eq!(mapping.primary_alias, "teleport");
    assert_eq!(mapping.all_aliases, ["teleport", "tp"]);

    assert_eq!(manager.execute(guest(), "teleport alex").unwrap(), 4);
    assert_eq!(manager.execute(guest(), "tp alex").unwrap(), 4);
    assert!(matches!(
        manager.execute(guest(), "tp").unwrap_err(),
        CommandError::Incomplete { .. }
    ));
    assert_eq!(manager.mapping("tp").unwrap().primary_alias, "teleport");
}

#[test]
fn incomplete_input_fails_the_same_through_an_alias() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager
        .register(
            "demo",
            NodeBuilder::literal("tp").then(
                NodeBuilder::argument("x", StringParser::word())
                    .then(NodeBuilder::argument("y", StringParser::word()).executes(|_| Ok(7))),
            ),
            &["teleport"],
        )
        .unwrap();

    for input in ["tp a", "teleport a"] {
        let err = manager.execute(guest(), input).unwrap_err();
        assert!(matches!(err, CommandError::Incomplete { .. }), "{input}: {err:?}");
        assert_eq!(err.id(), Some(codes::DISPATCHER_INCOMPLETE_COMMAND));
    }
    assert_eq!(manager.execute(guest(), "tp a b").unwrap(), 7);
    assert_eq!(manager.execute(guest(), "teleport a b").unwrap(), 7);
}

#[test]
fn alias_node_shares_the_primary_executor() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager.register("demo", returns("spawn", 3), &["s"]).unwrap();
    assert_eq!(manager.execute(guest(), "s").unwrap(), 3);
}

#[test]
fn primary_alias_is_lowercased() {
    let manager = CommandManager::<SimplePrincipal>::new();
    let mapping = manager.register("demo", returns("Spawn", 3), &["S"]).unwrap();
    assert_eq!(mapping.all_aliases, ["spawn", "s"]);
    assert_eq!(manager.execute(guest(), "spawn").unwrap(), 3);
}

#[test]
fn taken_alias_is_namespaced() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager.register("alpha", returns("home", 1), &[]).unwrap();
    let mapping = manager.register("beta", returns("home", 2), &[]).unwrap();
    assert_eq!(mapping.primary_alias, "beta.home");
    assert_eq!(mapping.owner, "beta");

    assert_eq!(manager.execute(guest(), "home").unwrap(), 1);
    assert_eq!(manager.execute(guest(), "beta.home").unwrap(), 2);
    assert_eq!(manager.mapping("home").unwrap().owner, "alpha");
}

#[test]
fn namespaced_alias_taken_too_fails() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager
        .register("alpha", returns("home", 1), &["beta.home"])
        .unwrap();
    let err = manager.register("beta", returns("home", 2), &[]).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::AliasClaimed {
            alias: "beta.home".into(),
            owner: "alpha".into(),
        }
    );
    assert_eq!(manager.mappings().len(), 1);
}

#[test]
fn unavailable_secondary_alias_is_skipped() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager
        .register("alpha", returns("spawn", 1), &["beta.spawn"])
        .unwrap();
    let mapping = manager
        .register("beta", returns("home", 2), &["spawn", "h"])
        .unwrap();
    assert_eq!(mapping.all_aliases, ["home", "h"]);
    assert_eq!(manager.execute(guest(), "spawn").unwrap(), 1);
}

#[test]
fn taken_secondary_alias_is_namespaced() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager.register("alpha", returns("spawn", 1), &[]).unwrap();
    let mapping = manager
        .register("beta", returns("home", 2), &["spawn"])
        .unwrap();
    assert_eq!(mapping.all_aliases, ["home", "beta.spawn"]);
    assert_eq!(manager.execute(guest(), "beta.spawn").unwrap(), 2);
}

#[test]
fn same_owner_registration_merges() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager
        .register("demo", NodeBuilder::literal("time").then(returns("set", 1)), &[])
        .unwrap();
    let mapping = manager
        .register("demo", NodeBuilder::literal("time").then(returns("query", 2)), &["t"])
        .unwrap();
    assert_eq!(mapping.all_aliases, ["time", "t"]);
    assert_eq!(manager.mappings().len(), 1);
    assert_eq!(manager.execute(guest(), "time set").unwrap(), 1);
    assert_eq!(manager.execute(guest(), "time query").unwrap(), 2);
    assert_eq!(manager.execute(guest(), "t set").unwrap(), 1);
}

#[test]
fn invalid_alias_is_rejected() {
    let manager = CommandManager::<SimplePrincipal>::new();
    let err = manager
        .register("demo", returns("two words", 1), &[])
        .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidAlias { .. }));

    let err = manager
        .register("demo", NodeBuilder::argument("x", StringParser::word()), &[])
        .unwrap_err();
    assert_eq!(err, RegistrationError::NotALiteral);
}

#[test]
fn permission_gates_command_and_aliases() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager
        .register_with_permission("demo", returns("heal", 20), &["h"])
        .unwrap();
    let medic = Arc::new(SimplePrincipal::new("medic").grant("demo.command.heal"));

    assert_eq!(manager.execute(Arc::clone(&medic), "heal").unwrap(), 20);
    assert_eq!(manager.execute(Arc::clone(&medic), "h").unwrap(), 20);
    assert_eq!(manager.execute(operator(), "heal").unwrap(), 20);

    for input in ["heal", "h"] {
        let err = manager.execute(guest(), input).unwrap_err();
        assert_eq!(err.id(), Some(codes::DISPATCHER_UNKNOWN_COMMAND));
    }
    assert!(manager.suggest(guest(), "h").is_empty());
    assert_eq!(manager.suggest(medic, "h"), ["heal", "h"]);
}

#[test]
fn permission_is_combined_with_existing_requirement() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager
        .register_with_permission(
            "demo",
            returns("fly", 1).requires(|p: &SimplePrincipal| p.capabilities().any(|c| c == "flight")),
            &[],
        )
        .unwrap();
    let only_permission = Arc::new(SimplePrincipal::new("a").grant("demo.command.fly"));
    let both = Arc::new(
        SimplePrincipal::new("b")
            .grant("demo.command.fly")
            .grant("flight"),
    );
    assert!(manager.execute(only_permission, "fly").is_err());
    assert_eq!(manager.execute(both, "fly").unwrap(), 1);
}

fn kick() -> Command<SimplePrincipal> {
    Command::builder()
        .parameter(Parameter::new("target", StringParser::word()))
        .parameter(Parameter::new("reason", StringParser::greedy()).optional())
        .executor(|ctx| Ok(i32::from(ctx.get_optional::<String>("reason")?.is_some())))
        .short_description("Remove a player")
        .extended_description("Disconnects the target, optionally telling them why.")
        .build()
        .unwrap()
}

#[test]
fn parameterized_command_with_optional_tail() {
    let manager = CommandManager::new();
    let mapping = manager.register_command("demo", &kick(), "kick", &[]).unwrap();
    assert_eq!(mapping.description.as_deref(), Some("Remove a player"));

    assert_eq!(manager.execute(guest(), "kick alex").unwrap(), 0);
    assert_eq!(manager.execute(guest(), "kick alex being rude").unwrap(), 1);
    assert!(matches!(
        manager.execute(guest(), "kick").unwrap_err(),
        CommandError::Incomplete { .. }
    ));

    let help = manager.help(&SimplePrincipal::new("alex"), "kick").unwrap();
    assert_eq!(help.usage, ["kick <target> [<reason>]"]);
    assert_eq!(
        help.mapping.extended_description.as_deref(),
        Some("Disconnects the target, optionally telling them why.")
    );
}

#[test]
fn subcommands_are_reachable_under_every_alias() {
    let calls = Arc::new(AtomicI32::new(0));
    let claim = Command::builder()
        .executor(counting(&calls))
        .build()
        .unwrap();
    let info = Command::builder().executor(|_| Ok(7)).build().unwrap();
    let region = Command::builder()
        .child(claim, ["claim", "C"])
        .child(info, ["info"])
        .build()
        .unwrap();

    let manager = CommandManager::new();
    manager.register_command("land", &region, "region", &["rg"]).unwrap();

    assert_eq!(manager.execute(guest(), "region claim").unwrap(), 1);
    assert_eq!(manager.execute(guest(), "region c").unwrap(), 1);
    assert_eq!(manager.execute(guest(), "rg info").unwrap(), 7);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let help = manager.help(&SimplePrincipal::new("alex"), "rg").unwrap();
    assert_eq!(help.mapping.primary_alias, "region");
    assert_eq!(help.usage, ["region claim", "region c", "region info"]);
}

#[test]
fn command_permission_hides_help() {
    let secret = Command::<SimplePrincipal>::builder()
        .executor(|_| Ok(1))
        .permission("staff")
        .build()
        .unwrap();
    let manager = CommandManager::new();
    manager.register_command("demo", &secret, "secret", &[]).unwrap();

    assert!(manager.help(&SimplePrincipal::new("alex"), "secret").is_none());
    let help = manager
        .help(&SimplePrincipal::new("mod").grant("staff"), "secret")
        .unwrap();
    assert_eq!(help.usage, ["secret"]);
    assert!(secret.can_execute(&SimplePrincipal::new("mod").grant("staff")));
}

#[test]
fn usage_lists_visible_commands() {
    let manager = CommandManager::<SimplePrincipal>::new();
    manager.register("demo", teleport(), &["tp"]).unwrap();
    manager
        .register_with_permission("demo", returns("stop", 1), &[])
        .unwrap();
    assert_eq!(
        manager.usage(&SimplePrincipal::new("alex")),
        ["teleport <target>", "tp -> teleport"]
    );
    assert_eq!(
        manager.usage(&SimplePrincipal::operator("op")),
        ["teleport <target>", "tp -> teleport", "stop"]
    );
}

#[test]
fn registrar_works_on_a_bare_dispatcher() {
    let mut dispatcher = Dispatcher::<SimplePrincipal>::new();
    let mut registry = CommandRegistry::new();
    let mut registrar = Registrar::new(&mut dispatcher, &mut registry);
    registrar.register("demo", teleport(), &["tp"]).unwrap();
    registrar.register("other", teleport(), &[]).unwrap();

    assert_eq!(registry.owner_of("tp"), Some("demo"));
    assert_eq!(registry.owner_of("other.teleport"), Some("other"));
    assert_eq!(registry.len(), 2);
    assert!(dispatcher.find_node(&["other.teleport", "target"]).is_some());
}

#[test]
fn executors_may_register_commands() {
    let manager = Arc::new(CommandManager::<SimplePrincipal>::new());
    let handle = Arc::downgrade(&manager);
    manager
        .register(
            "demo",
            NodeBuilder::literal("learn").executes(move |_| {
                let manager = handle
                    .upgrade()
                    .ok_or_else(|| CommandError::failed("manager dropped"))?;
                manager
                    .register("demo", returns("learned", 5), &[])
                    .map_err(|e| CommandError::failed(e.to_string()))?;
                Ok(1)
            }),
            &[],
        )
        .unwrap();

    assert!(manager.execute(guest(), "learned").is_err());
    assert_eq!(manager.execute(guest(), "learn").unwrap(), 1);
    assert_eq!(manager.execute(guest(), "learned").unwrap(), 5);
}

#[test]
fn concurrent_parse_and_suggest() {
    let manager = Arc::new(CommandManager::<SimplePrincipal>::new());
    manager.register("demo", teleport(), &["tp"]).unwrap();
    manager.register("demo", returns("tell", 1), &[]).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads + 1));
    thread::scope(|scope| {
        for i in 0..threads {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    assert_eq!(manager.execute(guest(), "tp alex").unwrap(), 4);
                    let list = manager.suggest(guest(), "te");
                    assert!(list.starts_with(&["teleport".to_string(), "tell".to_string()]));
                }
                i
            });
        }
        let manager = Arc::clone(&manager);
        let barrier = Arc::clone(&barrier);
        scope.spawn(move || {
            barrier.wait();
            for n in 0..20 {
                manager
                    .register("extra", returns(&format!("extra{n}"), n), &[])
                    .unwrap();
            }
            0
        });
    });
    assert_eq!(manager.mappings().len(), 22);
}
